use thiserror::Error;

use crate::{entity::Entity, key::ComponentKey};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EcsError {
    #[error("entity {0:?} is not alive")]
    DeadEntity(Entity),
    #[error("component `{0}` is not registered")]
    UnregisteredComponent(ComponentKey),
    #[error("component `{0}` is already registered")]
    DuplicateComponent(ComponentKey),
    #[error("entity {entity:?} does not have component `{key}`")]
    MissingComponent { entity: Entity, key: ComponentKey },
    #[error("component `{0}` is stored as a {1}")]
    WrongStorage(ComponentKey, &'static str),
    #[error("component `{key}` is not enableable")]
    NotEnableable { key: ComponentKey },
    #[error("expected {expected} bytes for component `{key}` but {actual} were provided")]
    SizeMismatch {
        key: ComponentKey,
        expected: usize,
        actual: usize,
    },
    #[error("entity field at offset {offset} does not fit in component `{key}` ({element_size} bytes)")]
    EntityFieldOutOfBounds {
        key: ComponentKey,
        offset: usize,
        element_size: usize,
    },
    #[error("entity field at offset {offset} overlaps another entity field in component `{key}`")]
    EntityFieldOverlap { key: ComponentKey, offset: usize },
}
