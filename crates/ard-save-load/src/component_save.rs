use std::ops::Range;

use ard_ecs::{
    component::{ComponentType, StorageKind},
    entity::{Entity, ENTITY_SIZE},
    key::ComponentKey,
};

use crate::{
    entity_map::EntityRemap,
    error::SaveLoadError,
    format::{EnableBits, HeaderComponent},
};

/// Everything a saver needs to know about one component kind, computed once per saver.
#[derive(Debug, Clone)]
pub struct ComponentSave {
    key: ComponentKey,
    storage: StorageKind,
    element_size: usize,
    enableable: bool,
    /// Offsets of entity references within one element. Sorted.
    entity_offsets: Vec<usize>,
    /// Ranges of one element that are copied as is. Everything except the entity references.
    save_chunks: Vec<Range<usize>>,
}

impl ComponentSave {
    pub fn new(ty: &ComponentType) -> Self {
        Self {
            key: ty.key(),
            storage: ty.storage(),
            element_size: ty.element_size(),
            enableable: ty.is_enableable(),
            save_chunks: save_chunks(ty.element_size(), ty.entity_offsets()),
            entity_offsets: ty.entity_offsets().to_vec(),
        }
    }

    #[inline]
    pub fn key(&self) -> ComponentKey {
        self.key
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

    #[inline]
    pub fn entity_offsets(&self) -> &[usize] {
        &self.entity_offsets
    }

    #[inline]
    pub fn save_chunks(&self) -> &[Range<usize>] {
        &self.save_chunks
    }

    /// Fails if the saved element size differs from the live one.
    pub fn check_header(&self, header: &HeaderComponent) -> Result<(), SaveLoadError> {
        let saved = header.element_size;
        if usize::try_from(saved).ok() == Some(self.element_size) {
            Ok(())
        } else {
            Err(SaveLoadError::ElementSizeMismatch {
                key: self.key,
                saved: saved.max(0) as usize,
                live: self.element_size,
            })
        }
    }

    /// Reads one bit of a saved enable bitset.
    #[inline]
    pub fn is_set(bits: &EnableBits, index: usize) -> bool {
        (bits[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Writes the remapped version of the entity at `offset` in the saved element `src` into the
    /// live element `dst`. Missing entities are written as null.
    #[inline]
    pub fn remap_entity_field(src: &[u8], dst: &mut [u8], offset: usize, remap: &EntityRemap) {
        let field = offset..offset + ENTITY_SIZE;
        let saved: Entity = bytemuck::pod_read_unaligned(&src[field.clone()]);
        dst[field].copy_from_slice(bytemuck::bytes_of(&remap.remap(saved)));
    }

    /// Copies one saved element into a live element, remapping entity references.
    #[inline]
    pub fn copy_element(&self, src: &[u8], dst: &mut [u8], remap: &EntityRemap) {
        for range in &self.save_chunks {
            dst[range.clone()].copy_from_slice(&src[range.clone()]);
        }

        for offset in &self.entity_offsets {
            Self::remap_entity_field(src, dst, *offset, remap);
        }
    }

    /// Copies an array of saved elements into a live array of the same length, remapping entity
    /// references.
    pub fn copy_strided(&self, src: &[u8], dst: &mut [u8], remap: &EntityRemap) {
        debug_assert_eq!(src.len(), dst.len());
        if self.element_size == 0 {
            return;
        }

        // Plain data can go over in one copy
        if self.entity_offsets.is_empty() {
            dst.copy_from_slice(src);
            return;
        }

        let size = self.element_size;
        for range in &self.save_chunks {
            dst.chunks_exact_mut(size)
                .zip(src.chunks_exact(size))
                .for_each(|(d, s)| d[range.clone()].copy_from_slice(&s[range.clone()]));
        }

        for offset in &self.entity_offsets {
            dst.chunks_exact_mut(size)
                .zip(src.chunks_exact(size))
                .for_each(|(d, s)| Self::remap_entity_field(s, d, *offset, remap));
        }
    }
}

/// The full element range minus the entity reference fields, as maximal contiguous runs.
fn save_chunks(element_size: usize, entity_offsets: &[usize]) -> Vec<Range<usize>> {
    let mut chunks = Vec::with_capacity(entity_offsets.len() + 1);
    let mut start = 0;
    for offset in entity_offsets {
        if *offset > start {
            chunks.push(start..*offset);
        }
        start = offset + ENTITY_SIZE;
    }

    if start < element_size {
        chunks.push(start..element_size);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_chunks_skip_entities() {
        assert_eq!(save_chunks(16, &[]), vec![0..16]);
        assert_eq!(save_chunks(0, &[]), vec![]);
        assert_eq!(save_chunks(8, &[0]), vec![]);
        assert_eq!(save_chunks(24, &[0, 16]), vec![8..16]);
        assert_eq!(save_chunks(28, &[4, 12]), vec![0..4, 20..28]);
    }

    #[test]
    fn bits() {
        let bits: EnableBits = [0b101, 1 << 63];
        assert!(ComponentSave::is_set(&bits, 0));
        assert!(!ComponentSave::is_set(&bits, 1));
        assert!(ComponentSave::is_set(&bits, 2));
        assert!(ComponentSave::is_set(&bits, 127));
        assert!(!ComponentSave::is_set(&bits, 64));
    }

    #[test]
    fn remap_field() {
        let remap = EntityRemap::from_pairs([(3, Entity::new(30, 2))]);
        let mut src = [0u8; 16];
        src[..8].copy_from_slice(bytemuck::bytes_of(&Entity::new(3, 1)));
        src[8..].copy_from_slice(bytemuck::bytes_of(&Entity::new(4, 1)));
        let mut dst = [0xAAu8; 16];

        ComponentSave::remap_entity_field(&src, &mut dst, 0, &remap);
        ComponentSave::remap_entity_field(&src, &mut dst, 8, &remap);

        let first: Entity = bytemuck::pod_read_unaligned(&dst[..8]);
        let second: Entity = bytemuck::pod_read_unaligned(&dst[8..]);
        assert_eq!(first, Entity::new(30, 2));
        assert!(second.is_null());
    }
}
