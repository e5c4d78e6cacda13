use rustc_hash::FxHashMap;

use crate::{component::ComponentType, error::EcsError, key::ComponentKey};

/// Every component kind known to a world, by key.
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    types: FxHashMap<ComponentKey, ComponentType>,
}

impl TypeRegistry {
    pub fn register(&mut self, ty: ComponentType) -> Result<(), EcsError> {
        let key = ty.key();
        if self.types.contains_key(&key) {
            return Err(EcsError::DuplicateComponent(key));
        }
        self.types.insert(key, ty);
        Ok(())
    }

    #[inline]
    pub fn get(&self, key: ComponentKey) -> Option<&ComponentType> {
        self.types.get(&key)
    }

    #[inline]
    pub fn contains(&self, key: ComponentKey) -> bool {
        self.types.contains_key(&key)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ComponentType> {
        self.types.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
