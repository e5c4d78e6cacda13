use bytemuck::{Pod, Zeroable};

/// An entity is an identifier that is associated with a set of components in a world.
///
/// Entities are plain data so they can be embedded inside component bytes. A version of `0` is
/// never handed out, which makes zeroed memory a null reference.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Entity {
    id: u32,
    ver: u32,
}

/// Size in bytes of an entity reference embedded in component data.
pub const ENTITY_SIZE: usize = std::mem::size_of::<Entity>();

impl Default for Entity {
    #[inline]
    fn default() -> Self {
        Entity::null()
    }
}

impl Entity {
    /// # Panics
    /// Panics if `ver` is `0`. Use [`Entity::null`] for null handles.
    #[inline]
    pub fn new(id: u32, ver: u32) -> Entity {
        assert_ne!(ver, 0, "entity versions start at 1");
        Entity { id, ver }
    }

    /// Creates a handle to an entity that doesn't exist.
    #[inline]
    pub const fn null() -> Entity {
        Entity { id: 0, ver: 0 }
    }

    /// Determines if this entity is null or not.
    #[inline]
    pub fn is_null(&self) -> bool {
        self.ver == 0
    }

    /// The storage index of the entity. This is the part that gets persisted.
    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn ver(&self) -> u32 {
        self.ver
    }
}
