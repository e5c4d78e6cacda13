//! Fixed-width headers of the save stream.
//!
//! A save blob is a sequence of kind records:
//!
//! ```text
//! HeaderSaver     { key, length_in_bytes }     one per kind record
//! HeaderComponent { count, element_size, is_enableable }
//! repeated until `count` entities are read:
//!     HeaderChunk { length }
//!     [u32; length]                            saved entity ids
//!     [u64; 2]                                 enable bits, if enableable
//!     fixed kinds:  [u8; length * element_size]
//!     buffer kinds: [i32; length] element counts, then every entity's elements back to back
//! ```
//!
//! Headers are packed and stored in native byte order, so they are always read unaligned.

use bytemuck::{Pod, Zeroable};

/// Enable bits for up to one full chunk of entities.
pub type EnableBits = [u64; 2];

/// Size in bytes of a saved entity id.
pub const ENTITY_INDEX_SIZE: usize = std::mem::size_of::<u32>();

#[repr(C, packed)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct HeaderSaver {
    /// Stable key of the component kind.
    pub key: u64,
    /// Length of the whole kind record, including this header.
    pub length_in_bytes: i32,
}

#[repr(C, packed)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct HeaderComponent {
    /// Total number of entities in the record.
    pub count: i32,
    pub element_size: i32,
    /// `1` if every chunk record carries enable bits.
    pub is_enableable: u8,
}

#[repr(C, packed)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct HeaderChunk {
    pub length: i32,
}

impl HeaderComponent {
    #[inline]
    pub fn is_enableable(&self) -> bool {
        self.is_enableable != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_sizes() {
        assert_eq!(std::mem::size_of::<HeaderSaver>(), 12);
        assert_eq!(std::mem::size_of::<HeaderComponent>(), 9);
        assert_eq!(std::mem::size_of::<HeaderChunk>(), 4);
        assert_eq!(std::mem::size_of::<EnableBits>(), 16);
    }
}
