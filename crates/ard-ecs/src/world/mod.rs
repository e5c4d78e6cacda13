pub mod entities;

use bytemuck::Pod;
use rustc_hash::FxHashMap;

use crate::{
    chunk::{column::Column, Chunk},
    component::{registry::TypeRegistry, ComponentType, StorageKind},
    entity::Entity,
    error::EcsError,
    key::{ArchetypeKey, ComponentKey},
    world::entities::Entities,
};

/// A world contains the data of the ECS. Entities live in chunks grouped by the exact set of
/// components they have.
#[derive(Debug, Default)]
pub struct World {
    registry: TypeRegistry,
    entities: Entities,
    chunks: Vec<Chunk>,
    /// Indices into `chunks` for every archetype.
    archetypes: FxHashMap<ArchetypeKey, Vec<usize>>,
}

impl World {
    pub fn new() -> World {
        World::default()
    }

    pub fn with_registry(registry: TypeRegistry) -> World {
        World {
            registry,
            ..Default::default()
        }
    }

    /// Registers a new component kind.
    pub fn register(&mut self, ty: ComponentType) -> Result<(), EcsError> {
        self.registry.register(ty)
    }

    #[inline]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[inline]
    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    #[inline]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Every chunk in the world, including empty ones.
    #[inline]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Mutable access to every chunk. Chunks own disjoint storage, so the slice can be split
    /// across threads freely.
    #[inline]
    pub fn chunks_mut(&mut self) -> &mut [Chunk] {
        &mut self.chunks
    }

    /// Creates an entity with zeroed components and empty buffers. Enableable components start
    /// enabled.
    pub fn create(&mut self, components: &[ComponentKey]) -> Result<Entity, EcsError> {
        let archetype = ArchetypeKey::from_keys(components);
        let chunk = self.find_chunk(archetype)?;
        let index = self.chunks[chunk].len();
        let entity = self.entities.allocate(chunk, index);
        self.chunks[chunk].push(entity);
        Ok(entity)
    }

    /// Creates `count` entities with the same set of components.
    pub fn create_many(
        &mut self,
        components: &[ComponentKey],
        count: usize,
    ) -> Result<Vec<Entity>, EcsError> {
        (0..count).map(|_| self.create(components)).collect()
    }

    /// Destroys an entity and all of its components.
    pub fn destroy(&mut self, entity: Entity) -> Result<(), EcsError> {
        let info = *self
            .entities
            .get(entity)
            .ok_or(EcsError::DeadEntity(entity))?;

        let chunk = &mut self.chunks[info.chunk as usize];
        if let Some(moved) = chunk.swap_remove(info.index as usize) {
            self.entities.moved(moved, info.index as usize);
        }
        self.entities.release(entity);
        Ok(())
    }

    #[inline]
    pub fn has_component(&self, entity: Entity, key: ComponentKey) -> bool {
        self.entities
            .get(entity)
            .map(|info| self.chunks[info.chunk as usize].has(key))
            .unwrap_or(false)
    }

    /// Raw bytes of a fixed-size component.
    pub fn component_bytes(&self, entity: Entity, key: ComponentKey) -> Result<&[u8], EcsError> {
        let (column, index) = self.column(entity, key, Some(StorageKind::Component))?;
        Ok(column.component(index))
    }

    pub fn component_bytes_mut(
        &mut self,
        entity: Entity,
        key: ComponentKey,
    ) -> Result<&mut [u8], EcsError> {
        let (column, index) = self.column_mut(entity, key, Some(StorageKind::Component))?;
        Ok(column.component_mut(index))
    }

    pub fn get_component<T: Pod>(&self, entity: Entity, key: ComponentKey) -> Result<T, EcsError> {
        let bytes = self.component_bytes(entity, key)?;
        check_size::<T>(key, bytes.len())?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    pub fn set_component<T: Pod>(
        &mut self,
        entity: Entity,
        key: ComponentKey,
        value: &T,
    ) -> Result<(), EcsError> {
        let bytes = self.component_bytes_mut(entity, key)?;
        check_size::<T>(key, bytes.len())?;
        bytes.copy_from_slice(bytemuck::bytes_of(value));
        Ok(())
    }

    /// Raw bytes of a buffer component.
    pub fn buffer_bytes(&self, entity: Entity, key: ComponentKey) -> Result<&[u8], EcsError> {
        let (column, index) = self.column(entity, key, Some(StorageKind::Buffer))?;
        Ok(column.buffer(index))
    }

    pub fn get_buffer<T: Pod>(&self, entity: Entity, key: ComponentKey) -> Result<Vec<T>, EcsError> {
        let (column, index) = self.column(entity, key, Some(StorageKind::Buffer))?;
        check_size::<T>(key, column.element_size())?;
        Ok(bytemuck::pod_collect_to_vec(column.buffer(index)))
    }

    pub fn set_buffer<T: Pod>(
        &mut self,
        entity: Entity,
        key: ComponentKey,
        elements: &[T],
    ) -> Result<(), EcsError> {
        let (column, index) = self.column_mut(entity, key, Some(StorageKind::Buffer))?;
        check_size::<T>(key, column.element_size())?;

        let buffer = column.buffer_mut(index);
        buffer.clear();
        buffer.extend_from_slice(bytemuck::cast_slice(elements));
        Ok(())
    }

    pub fn is_enabled(&self, entity: Entity, key: ComponentKey) -> Result<bool, EcsError> {
        let (column, index) = self.column(entity, key, None)?;
        Ok(column.is_enabled(index))
    }

    pub fn set_enabled(
        &mut self,
        entity: Entity,
        key: ComponentKey,
        enabled: bool,
    ) -> Result<(), EcsError> {
        let (column, index) = self.column_mut(entity, key, None)?;
        if column.set_enabled(index, enabled) {
            Ok(())
        } else {
            Err(EcsError::NotEnableable { key })
        }
    }

    /// Finds a chunk with space for a new entity of the archetype, creating one if needed.
    fn find_chunk(&mut self, archetype: ArchetypeKey) -> Result<usize, EcsError> {
        if let Some(chunks) = self.archetypes.get(&archetype) {
            if let Some(chunk) = chunks.iter().find(|c| !self.chunks[**c].is_full()) {
                return Ok(*chunk);
            }
        }

        let chunk = Chunk::new(archetype.clone(), &self.registry)?;
        self.chunks.push(chunk);
        let id = self.chunks.len() - 1;
        self.archetypes.entry(archetype).or_default().push(id);
        Ok(id)
    }

    /// Chunk and index of a living entity that has the component.
    fn locate(&self, entity: Entity, key: ComponentKey) -> Result<(usize, usize), EcsError> {
        let info = self
            .entities
            .get(entity)
            .ok_or(EcsError::DeadEntity(entity))?;

        if !self.registry.contains(key) {
            return Err(EcsError::UnregisteredComponent(key));
        }

        Ok((info.chunk as usize, info.index as usize))
    }

    /// The column holding the entities component along with the index of the entity in it.
    /// When `storage` is provided, the column must be stored that way.
    fn column(
        &self,
        entity: Entity,
        key: ComponentKey,
        storage: Option<StorageKind>,
    ) -> Result<(&Column, usize), EcsError> {
        let (chunk, index) = self.locate(entity, key)?;
        let column = self.chunks[chunk]
            .column(key)
            .ok_or(EcsError::MissingComponent { entity, key })?;
        check_storage(column, storage)?;
        Ok((column, index))
    }

    fn column_mut(
        &mut self,
        entity: Entity,
        key: ComponentKey,
        storage: Option<StorageKind>,
    ) -> Result<(&mut Column, usize), EcsError> {
        let (chunk, index) = self.locate(entity, key)?;
        let column = self.chunks[chunk]
            .column_mut(key)
            .ok_or(EcsError::MissingComponent { entity, key })?;
        check_storage(column, storage)?;
        Ok((column, index))
    }
}

#[inline]
fn check_storage(column: &Column, storage: Option<StorageKind>) -> Result<(), EcsError> {
    match storage {
        Some(storage) if column.storage() != storage => Err(EcsError::WrongStorage(
            column.key(),
            column.storage().name(),
        )),
        _ => Ok(()),
    }
}

#[inline]
fn check_size<T>(key: ComponentKey, expected: usize) -> Result<(), EcsError> {
    let actual = std::mem::size_of::<T>();
    if actual == expected {
        Ok(())
    } else {
        Err(EcsError::SizeMismatch {
            key,
            expected,
            actual,
        })
    }
}
