use bytemuck::{Pod, Zeroable};

use crate::prelude::*;

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
struct ComponentA {
    x: u32,
    y: u32,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
struct ComponentB {
    x: u32,
    y: u32,
}

#[repr(C)]
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
struct Link {
    weight: u32,
    _pad: u32,
    target: Entity,
}

const A: ComponentKey = ComponentKey(1);
const B: ComponentKey = ComponentKey(2);
const LIST: ComponentKey = ComponentKey(3);
const TAG: ComponentKey = ComponentKey(4);

fn world() -> World {
    let mut world = World::new();
    world
        .register(ComponentType::component::<ComponentA>(A, "ComponentA"))
        .unwrap();
    world
        .register(ComponentType::component::<ComponentB>(B, "ComponentB").enableable())
        .unwrap();
    world
        .register(ComponentType::buffer::<u32>(LIST, "List"))
        .unwrap();
    world.register(ComponentType::tag(TAG, "Tag")).unwrap();
    world
}

#[test]
fn archetype_key_is_sorted_set() {
    let key = ArchetypeKey::from_keys(&[B, A, B, TAG]);
    assert_eq!(key.len(), 3);
    assert_eq!(key.iter().copied().collect::<Vec<_>>(), vec![A, B, TAG]);
    assert!(key.contains(TAG));
    assert!(!key.contains(LIST));
    assert_eq!(key.position(B), Some(1));
}

#[test]
fn null_entity_is_zeroed() {
    let null: Entity = Zeroable::zeroed();
    assert!(null.is_null());
    assert_eq!(null, Entity::null());
    assert!(!Entity::new(0, 1).is_null());
}

#[test]
fn duplicate_registration() {
    let mut world = world();
    assert_eq!(
        world.register(ComponentType::component::<u8>(A, "Dupe")),
        Err(EcsError::DuplicateComponent(A))
    );
}

/// Creating entities properly intitializes the component data.
#[test]
fn create_entities() {
    let mut world = world();
    let entities = world.create_many(&[A, B, LIST], 10).unwrap();

    for entity in &entities {
        assert!(world.is_alive(*entity));
        assert_eq!(
            world.get_component::<ComponentA>(*entity, A).unwrap(),
            ComponentA::default()
        );
        assert!(world.is_enabled(*entity, B).unwrap());
        assert!(world.get_buffer::<u32>(*entity, LIST).unwrap().is_empty());
    }

    assert_eq!(world.chunks().len(), 1);
    assert_eq!(world.chunks()[0].len(), 10);
}

#[test]
fn chunks_split_at_capacity() {
    let mut world = world();
    world.create_many(&[A], CHUNK_CAPACITY + 1).unwrap();
    assert_eq!(world.chunks().len(), 2);
    assert!(world.chunks()[0].is_full());
    assert_eq!(world.chunks()[1].len(), 1);
}

#[test]
fn set_and_get() {
    let mut world = world();
    let e = world.create(&[A, B, LIST]).unwrap();

    world.set_component(e, A, &ComponentA { x: 1, y: 2 }).unwrap();
    world.set_buffer::<u32>(e, LIST, &[4, 5, 6]).unwrap();
    world.set_enabled(e, B, false).unwrap();

    assert_eq!(
        world.get_component::<ComponentA>(e, A).unwrap(),
        ComponentA { x: 1, y: 2 }
    );
    assert_eq!(world.get_buffer::<u32>(e, LIST).unwrap(), vec![4, 5, 6]);
    assert!(!world.is_enabled(e, B).unwrap());
    assert!(world.is_enabled(e, A).unwrap());
}

#[test]
fn access_errors() {
    let mut world = world();
    let e = world.create(&[A, LIST]).unwrap();

    assert_eq!(
        world.get_component::<ComponentB>(e, B),
        Err(EcsError::MissingComponent { entity: e, key: B })
    );
    assert_eq!(
        world.get_component::<u32>(e, LIST),
        Err(EcsError::WrongStorage(LIST, "buffer"))
    );
    assert_eq!(
        world.set_enabled(e, A, false),
        Err(EcsError::NotEnableable { key: A })
    );
    assert_eq!(
        world.get_component::<u8>(e, A),
        Err(EcsError::SizeMismatch {
            key: A,
            expected: 8,
            actual: 1
        })
    );
    assert_eq!(
        world.get_component::<u8>(e, ComponentKey(99)),
        Err(EcsError::UnregisteredComponent(ComponentKey(99)))
    );
}

/// Destroying an entity moves the last entity of the chunk into its slot.
#[test]
fn destroy_swaps_last() {
    let mut world = world();
    let entities = world.create_many(&[A, B, LIST], 3).unwrap();
    for (i, e) in entities.iter().enumerate() {
        let i = i as u32;
        world.set_component(*e, A, &ComponentA { x: i, y: i }).unwrap();
        world.set_buffer::<u32>(*e, LIST, &vec![i; i as usize]).unwrap();
    }
    world.set_enabled(entities[2], B, false).unwrap();

    world.destroy(entities[0]).unwrap();
    assert!(!world.is_alive(entities[0]));
    assert_eq!(world.destroy(entities[0]), Err(EcsError::DeadEntity(entities[0])));

    assert_eq!(world.chunks()[0].entities(), &[entities[2], entities[1]]);
    assert_eq!(
        world.get_component::<ComponentA>(entities[2], A).unwrap(),
        ComponentA { x: 2, y: 2 }
    );
    assert_eq!(world.get_buffer::<u32>(entities[2], LIST).unwrap(), vec![2, 2]);
    assert!(!world.is_enabled(entities[2], B).unwrap());
    assert!(world.is_enabled(entities[1], B).unwrap());
}

#[test]
fn ids_are_reused_with_new_version() {
    let mut world = world();
    let first = world.create(&[A]).unwrap();
    world.destroy(first).unwrap();
    let second = world.create(&[A]).unwrap();

    assert_eq!(first.id(), second.id());
    assert_ne!(first.ver(), second.ver());
    assert!(!world.is_alive(first));
    assert!(world.is_alive(second));
    assert_eq!(world.entities().iter().collect::<Vec<_>>(), vec![second]);
}

#[test]
fn tag_has_no_data() {
    let mut world = world();
    let e = world.create(&[TAG]).unwrap();
    assert!(world.component_bytes(e, TAG).unwrap().is_empty());
    world.set_enabled(e, TAG, false).unwrap();
    assert!(!world.is_enabled(e, TAG).unwrap());
}

#[test]
fn entity_fields() {
    let ty = ComponentType::component::<Link>(ComponentKey(5), "Link")
        .with_entity_field(std::mem::offset_of!(Link, target))
        .unwrap();
    assert_eq!(ty.entity_offsets(), &[8]);
    assert_eq!(ty.entity_fields().collect::<Vec<_>>(), vec![8..16]);
}

#[test]
fn entity_field_out_of_bounds() {
    let err = ComponentType::component::<Link>(ComponentKey(5), "Link")
        .with_entity_field(12)
        .unwrap_err();
    assert_eq!(
        err,
        EcsError::EntityFieldOutOfBounds {
            key: ComponentKey(5),
            offset: 12,
            element_size: 16
        }
    );

    // A field past a 4 byte component can never be registered
    let err = ComponentType::component::<u32>(ComponentKey(6), "Small")
        .with_entity_field(8)
        .unwrap_err();
    assert!(matches!(err, EcsError::EntityFieldOutOfBounds { offset: 8, .. }));
    assert!(matches!(
        ComponentType::component::<Link>(ComponentKey(5), "Link").with_entity_field(usize::MAX),
        Err(EcsError::EntityFieldOutOfBounds { .. })
    ));
}

#[test]
fn entity_fields_overlap() {
    let err = ComponentType::component::<Link>(ComponentKey(5), "Link")
        .with_entity_field(0)
        .and_then(|ty| ty.with_entity_field(4))
        .unwrap_err();
    assert_eq!(
        err,
        EcsError::EntityFieldOverlap {
            key: ComponentKey(5),
            offset: 4
        }
    );
}

#[test]
fn enable_mask_layout() {
    let mut world = world();
    let entities = world.create_many(&[B], 70).unwrap();
    world.set_enabled(entities[1], B, false).unwrap();
    world.set_enabled(entities[65], B, false).unwrap();

    let raw = world.chunks()[0]
        .column(B)
        .unwrap()
        .enable_bits()
        .unwrap();
    assert_eq!(raw[0], (u64::MAX) & !0b10);
    assert_eq!(raw[1], ((1u64 << 6) - 1) & !0b10);
}
