pub mod chunk;
pub mod component;
pub mod entity;
pub mod error;
pub mod key;
pub mod world;

#[cfg(test)]
mod tests;

pub mod prelude {
    pub use crate::chunk::column::Column;
    pub use crate::chunk::column::EnableMask;
    pub use crate::chunk::Chunk;
    pub use crate::chunk::CHUNK_CAPACITY;
    pub use crate::component::registry::TypeRegistry;
    pub use crate::component::ComponentType;
    pub use crate::component::StorageKind;
    pub use crate::entity::Entity;
    pub use crate::entity::ENTITY_SIZE;
    pub use crate::error::EcsError;
    pub use crate::key::ArchetypeKey;
    pub use crate::key::ComponentKey;
    pub use crate::world::entities::Entities;
    pub use crate::world::World;
}

/// Maximum number of entities that can be held in a bitset.
pub const MAX_BITSET_COUNT: usize = 128;
