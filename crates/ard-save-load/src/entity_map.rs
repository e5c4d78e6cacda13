use ard_ecs::entity::Entity;
use rustc_hash::FxHashMap;

/// Maps the ids of entities as they were when saved to the entities that exist now.
///
/// Built by whoever drives the load, then shared read-only by every saver.
#[derive(Debug, Default, Clone)]
pub struct EntityRemap {
    saved_to_live: FxHashMap<u32, Entity>,
}

impl EntityRemap {
    /// Every entity maps to itself. Used when loading back into the world that was saved.
    pub fn identity(entities: &[Entity]) -> Self {
        Self::from_pairs(entities.iter().map(|e| (e.id(), *e)))
    }

    /// Builds a remap from `(saved id, live entity)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (u32, Entity)>) -> Self {
        Self {
            saved_to_live: pairs.into_iter().collect(),
        }
    }

    /// Maps `saved` to `live`, returning the previous mapping if there was one.
    #[inline]
    pub fn insert(&mut self, saved: u32, live: Entity) -> Option<Entity> {
        self.saved_to_live.insert(saved, live)
    }

    #[inline]
    pub fn try_get_entity(&self, saved: u32) -> Option<Entity> {
        self.saved_to_live.get(&saved).copied()
    }

    /// Translates an entity reference found in saved data. Null references and references to
    /// entities that no longer exist both become null.
    ///
    /// Lookup goes by id alone and ignores the saved version. A stale reference whose id was
    /// reused by another entity before saving resolves to that entity rather than to null.
    #[inline]
    pub fn remap(&self, saved: Entity) -> Entity {
        if saved.is_null() {
            return Entity::null();
        }
        self.try_get_entity(saved.id()).unwrap_or_else(Entity::null)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.saved_to_live.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.saved_to_live.is_empty()
    }
}
