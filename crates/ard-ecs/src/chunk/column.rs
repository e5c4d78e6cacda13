use bitvec::{array::BitArray, order::Lsb0};

use crate::{
    component::{ComponentType, StorageKind},
    key::ComponentKey,
};

/// One enable bit per entity slot in a chunk. The raw `[u64; 2]` is also the persisted layout.
pub type EnableMask = BitArray<[u64; 2], Lsb0>;

/// The data of one component kind for every entity in a chunk.
#[derive(Debug, Clone)]
pub struct Column {
    key: ComponentKey,
    element_size: usize,
    len: usize,
    data: ColumnData,
    enabled: Option<EnableMask>,
}

#[derive(Debug, Clone)]
enum ColumnData {
    /// `len * element_size` contiguous bytes.
    Component(Vec<u8>),
    /// One byte vector per entity, each a multiple of `element_size` long.
    Buffer(Vec<Vec<u8>>),
}

impl Column {
    pub(crate) fn new(ty: &ComponentType) -> Self {
        Self {
            key: ty.key(),
            element_size: ty.element_size(),
            len: 0,
            data: match ty.storage() {
                StorageKind::Component => ColumnData::Component(Vec::default()),
                StorageKind::Buffer => ColumnData::Buffer(Vec::default()),
            },
            enabled: if ty.is_enableable() {
                Some(EnableMask::new([0; 2]))
            } else {
                None
            },
        }
    }

    #[inline]
    pub fn key(&self) -> ComponentKey {
        self.key
    }

    #[inline]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    #[inline]
    pub fn storage(&self) -> StorageKind {
        match self.data {
            ColumnData::Component(_) => StorageKind::Component,
            ColumnData::Buffer(_) => StorageKind::Buffer,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends a zeroed (or empty) value for a new entity. New values start enabled.
    pub(crate) fn push_default(&mut self) {
        match &mut self.data {
            ColumnData::Component(data) => data.resize(data.len() + self.element_size, 0),
            ColumnData::Buffer(buffers) => buffers.push(Vec::default()),
        }

        if let Some(enabled) = &mut self.enabled {
            enabled.set(self.len, true);
        }
        self.len += 1;
    }

    /// Removes the value at `index` and moves the last value into its place.
    pub(crate) fn swap_remove(&mut self, index: usize) {
        let last = self.len - 1;
        match &mut self.data {
            ColumnData::Component(data) => {
                let size = self.element_size;
                if index != last {
                    data.copy_within(last * size..(last + 1) * size, index * size);
                }
                data.truncate(last * size);
            }
            ColumnData::Buffer(buffers) => {
                buffers.swap_remove(index);
            }
        }

        if let Some(enabled) = &mut self.enabled {
            let moved = enabled[last];
            enabled.set(index, moved);
            enabled.set(last, false);
        }
        self.len = last;
    }

    /// All values of a fixed-size column, back to back.
    ///
    /// # Panics
    /// Panics if this is a buffer column.
    #[inline]
    pub fn components(&self) -> &[u8] {
        match &self.data {
            ColumnData::Component(data) => data,
            ColumnData::Buffer(_) => panic!("column `{}` holds buffers", self.key),
        }
    }

    /// # Panics
    /// Panics if this is a buffer column or if `index` is out of bounds.
    #[inline]
    pub fn component(&self, index: usize) -> &[u8] {
        let size = self.element_size;
        &self.components()[index * size..(index + 1) * size]
    }

    /// # Panics
    /// Panics if this is a buffer column or if `index` is out of bounds.
    #[inline]
    pub fn component_mut(&mut self, index: usize) -> &mut [u8] {
        let size = self.element_size;
        match &mut self.data {
            ColumnData::Component(data) => &mut data[index * size..(index + 1) * size],
            ColumnData::Buffer(_) => panic!("column `{}` holds buffers", self.key),
        }
    }

    /// Raw bytes of the buffer of one entity.
    ///
    /// # Panics
    /// Panics if this is a fixed-size column or if `index` is out of bounds.
    #[inline]
    pub fn buffer(&self, index: usize) -> &[u8] {
        match &self.data {
            ColumnData::Buffer(buffers) => &buffers[index],
            ColumnData::Component(_) => panic!("column `{}` holds components", self.key),
        }
    }

    /// Raw bytes of the buffer of one entity. Callers must keep the length a multiple of the
    /// element size.
    ///
    /// # Panics
    /// Panics if this is a fixed-size column or if `index` is out of bounds.
    #[inline]
    pub fn buffer_mut(&mut self, index: usize) -> &mut Vec<u8> {
        match &mut self.data {
            ColumnData::Buffer(buffers) => &mut buffers[index],
            ColumnData::Component(_) => panic!("column `{}` holds components", self.key),
        }
    }

    /// Number of elements in the buffer of one entity.
    #[inline]
    pub fn buffer_len(&self, index: usize) -> usize {
        match self.element_size {
            0 => 0,
            size => self.buffer(index).len() / size,
        }
    }

    #[inline]
    pub fn is_enableable(&self) -> bool {
        self.enabled.is_some()
    }

    #[inline]
    pub fn enable_mask(&self) -> Option<&EnableMask> {
        self.enabled.as_ref()
    }

    /// Enable bits of the whole chunk in their raw form, or `None` if not enableable.
    #[inline]
    pub fn enable_bits(&self) -> Option<[u64; 2]> {
        self.enabled.as_ref().map(|mask| {
            let raw = mask.as_raw_slice();
            [raw[0], raw[1]]
        })
    }

    /// Non-enableable components are always enabled.
    #[inline]
    pub fn is_enabled(&self, index: usize) -> bool {
        match &self.enabled {
            Some(enabled) => enabled[index],
            None => true,
        }
    }

    /// Returns `false` if the component is not enableable, in which case nothing changes.
    #[inline]
    pub fn set_enabled(&mut self, index: usize, enabled: bool) -> bool {
        debug_assert!(index < self.len);
        match &mut self.enabled {
            Some(mask) => {
                mask.set(index, enabled);
                true
            }
            None => false,
        }
    }
}
