pub mod column;

use crate::{
    component::registry::TypeRegistry, entity::Entity, error::EcsError, key::ArchetypeKey,
    key::ComponentKey, MAX_BITSET_COUNT,
};

use self::column::Column;

/// Maximum number of entities in a chunk. Bounded by the width of the enable mask.
pub const CHUNK_CAPACITY: usize = MAX_BITSET_COUNT;

/// A fixed capacity block of entities that all have the same set of components.
#[derive(Debug, Clone)]
pub struct Chunk {
    archetype: ArchetypeKey,
    entities: Vec<Entity>,
    /// One column per key of the archetype, in the same order.
    columns: Vec<Column>,
}

impl Chunk {
    pub(crate) fn new(archetype: ArchetypeKey, registry: &TypeRegistry) -> Result<Self, EcsError> {
        let columns = archetype
            .iter()
            .map(|key| {
                registry
                    .get(*key)
                    .map(Column::new)
                    .ok_or(EcsError::UnregisteredComponent(*key))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            archetype,
            entities: Vec::with_capacity(CHUNK_CAPACITY),
            columns,
        })
    }

    #[inline]
    pub fn archetype(&self) -> &ArchetypeKey {
        &self.archetype
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.entities.len() == CHUNK_CAPACITY
    }

    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Does this chunk store the given component kind.
    #[inline]
    pub fn has(&self, key: ComponentKey) -> bool {
        self.archetype.contains(key)
    }

    #[inline]
    pub fn column(&self, key: ComponentKey) -> Option<&Column> {
        self.archetype.position(key).map(|i| &self.columns[i])
    }

    #[inline]
    pub fn column_mut(&mut self, key: ComponentKey) -> Option<&mut Column> {
        self.archetype.position(key).map(|i| &mut self.columns[i])
    }

    /// Split borrow of the entity list and one column, for writing a column while reading which
    /// entity owns each slot.
    #[inline]
    pub fn entities_and_column_mut(
        &mut self,
        key: ComponentKey,
    ) -> Option<(&[Entity], &mut Column)> {
        let i = self.archetype.position(key)?;
        Some((&self.entities, &mut self.columns[i]))
    }

    /// Adds an entity with default component values. Returns its index in the chunk.
    pub(crate) fn push(&mut self, entity: Entity) -> usize {
        debug_assert!(!self.is_full());
        self.entities.push(entity);
        self.columns.iter_mut().for_each(|c| c.push_default());
        self.entities.len() - 1
    }

    /// Removes the entity at `index`. If another entity was moved to fill its place, that entity
    /// is returned.
    pub(crate) fn swap_remove(&mut self, index: usize) -> Option<Entity> {
        let last = self.entities.len() - 1;
        self.entities.swap_remove(index);
        self.columns.iter_mut().for_each(|c| c.swap_remove(index));

        if index == last {
            None
        } else {
            Some(self.entities[index])
        }
    }
}
