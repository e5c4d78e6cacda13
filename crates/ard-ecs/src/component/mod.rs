pub mod registry;

use std::ops::Range;

use crate::{entity::ENTITY_SIZE, error::EcsError, key::ComponentKey};

/// How the data of a component kind is laid out in a chunk.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StorageKind {
    /// One fixed-size value per entity, stored contiguously.
    Component,
    /// A variable length array of fixed-size elements per entity.
    Buffer,
}

impl StorageKind {
    pub fn name(&self) -> &'static str {
        match self {
            StorageKind::Component => "component",
            StorageKind::Buffer => "buffer",
        }
    }
}

/// Runtime description of a component kind.
///
/// Fields are only reachable through the builder methods, so every entity field of a type is
/// known to fit inside its element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentType {
    key: ComponentKey,
    name: String,
    storage: StorageKind,
    /// Size in bytes of one value (or of one buffer element).
    element_size: usize,
    /// Whether entities can individually turn the component on and off.
    enableable: bool,
    /// Byte offsets within one element where an `Entity` is stored. Always sorted.
    entity_offsets: Vec<usize>,
}

impl ComponentType {
    /// A fixed-size component whose values are `T`.
    pub fn component<T: bytemuck::Pod>(key: impl Into<ComponentKey>, name: &str) -> Self {
        Self::new(key.into(), name, StorageKind::Component, std::mem::size_of::<T>())
    }

    /// A buffer component whose elements are `T`.
    pub fn buffer<T: bytemuck::Pod>(key: impl Into<ComponentKey>, name: &str) -> Self {
        Self::new(key.into(), name, StorageKind::Buffer, std::mem::size_of::<T>())
    }

    /// A component that carries no data. Only useful when enableable.
    pub fn tag(key: impl Into<ComponentKey>, name: &str) -> Self {
        Self::new(key.into(), name, StorageKind::Component, 0).enableable()
    }

    pub fn new(key: ComponentKey, name: &str, storage: StorageKind, element_size: usize) -> Self {
        Self {
            key,
            name: name.to_owned(),
            storage,
            element_size,
            enableable: false,
            entity_offsets: Vec::default(),
        }
    }

    pub fn enableable(mut self) -> Self {
        self.enableable = true;
        self
    }

    /// Marks the `Entity` at `offset` within one element as an entity reference. Use
    /// `std::mem::offset_of!` to find the offset.
    ///
    /// Fails if the field does not fit inside the element or overlaps another entity field.
    pub fn with_entity_field(mut self, offset: usize) -> Result<Self, EcsError> {
        let field = offset..offset.saturating_add(ENTITY_SIZE);
        if field.end > self.element_size {
            return Err(EcsError::EntityFieldOutOfBounds {
                key: self.key,
                offset,
                element_size: self.element_size,
            });
        }
        if self.entity_fields().any(|other| overlaps(&other, &field)) {
            return Err(EcsError::EntityFieldOverlap {
                key: self.key,
                offset,
            });
        }

        let pos = self.entity_offsets.partition_point(|o| *o < offset);
        self.entity_offsets.insert(pos, offset);
        Ok(self)
    }

    #[inline]
    pub fn key(&self) -> ComponentKey {
        self.key
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn storage(&self) -> StorageKind {
        self.storage
    }

    #[inline]
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    #[inline]
    pub fn is_enableable(&self) -> bool {
        self.enableable
    }

    /// Sorted, non-overlapping offsets of every entity reference in one element.
    #[inline]
    pub fn entity_offsets(&self) -> &[usize] {
        &self.entity_offsets
    }

    /// Byte ranges of every entity reference in one element.
    pub fn entity_fields(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.entity_offsets
            .iter()
            .map(|offset| *offset..*offset + ENTITY_SIZE)
    }
}

#[inline]
fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}
