use std::fmt;

use bytemuck::{Pod, Zeroable};
use smallvec::SmallVec;

/// Stable numeric identity of a component kind. Unlike `TypeId` this survives recompilation, so
/// it is what gets written into save data.
#[repr(transparent)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Pod, Zeroable)]
pub struct ComponentKey(pub u64);

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u64> for ComponentKey {
    #[inline]
    fn from(value: u64) -> Self {
        ComponentKey(value)
    }
}

/// Sorted set of component keys describing which kinds a chunk holds.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub struct ArchetypeKey {
    keys: SmallVec<[ComponentKey; 8]>,
}

impl ArchetypeKey {
    pub fn from_keys(keys: &[ComponentKey]) -> ArchetypeKey {
        let mut key = ArchetypeKey::default();
        keys.iter().for_each(|k| {
            key.add(*k);
        });
        key
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, ComponentKey> {
        self.keys.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Position of the key within the set, if present.
    #[inline]
    pub fn position(&self, key: ComponentKey) -> Option<usize> {
        self.keys.binary_search(&key).ok()
    }

    #[inline]
    pub fn contains(&self, key: ComponentKey) -> bool {
        self.position(key).is_some()
    }

    /// Returns true if the key was already present.
    #[inline]
    pub fn add(&mut self, key: ComponentKey) -> bool {
        if let Err(pos) = self.keys.binary_search(&key) {
            self.keys.insert(pos, key);
            false
        } else {
            true
        }
    }
}
