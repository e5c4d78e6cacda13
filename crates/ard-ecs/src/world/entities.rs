use crate::entity::Entity;

/// Description of an entity within the world.
#[derive(Debug, Copy, Clone)]
pub(crate) struct EntityInfo {
    /// Current version of the entity. Never `0`.
    pub ver: u32,
    /// Index of the chunk holding the entities components.
    pub chunk: u32,
    /// Index within the chunk.
    pub index: u32,
    pub alive: bool,
}

/// Allocator for entity handles. Freed ids are reused with a bumped version so stale handles
/// can be detected.
#[derive(Debug, Default)]
pub struct Entities {
    entities: Vec<EntityInfo>,
    free: Vec<u32>,
}

impl Entities {
    /// Number of living entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len() - self.free.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.get(entity).is_some()
    }

    /// Every living entity, in id order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities
            .iter()
            .enumerate()
            .filter(|(_, info)| info.alive)
            .map(|(id, info)| Entity::new(id as u32, info.ver))
    }

    #[inline]
    pub(crate) fn get(&self, entity: Entity) -> Option<&EntityInfo> {
        self.entities
            .get(entity.id() as usize)
            .filter(|info| info.alive && info.ver == entity.ver())
    }

    pub(crate) fn allocate(&mut self, chunk: usize, index: usize) -> Entity {
        match self.free.pop() {
            Some(id) => {
                let info = &mut self.entities[id as usize];
                info.alive = true;
                info.chunk = chunk as u32;
                info.index = index as u32;
                Entity::new(id, info.ver)
            }
            None => {
                self.entities.push(EntityInfo {
                    ver: 1,
                    chunk: chunk as u32,
                    index: index as u32,
                    alive: true,
                });
                Entity::new(self.entities.len() as u32 - 1, 1)
            }
        }
    }

    pub(crate) fn release(&mut self, entity: Entity) {
        let info = &mut self.entities[entity.id() as usize];
        debug_assert_eq!(info.ver, entity.ver());
        info.alive = false;
        info.ver = info.ver.wrapping_add(1).max(1);
        self.free.push(entity.id());
    }

    /// Records that the entity with this id now lives at `index` in its chunk.
    #[inline]
    pub(crate) fn moved(&mut self, entity: Entity, index: usize) {
        self.entities[entity.id() as usize].index = index as u32;
    }
}
