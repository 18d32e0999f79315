use super::common::*;
use crate::ecs::{EnforceSingleton, EntityCollection, EntityQuery, System, SystemManager};

#[test]
fn components_track_the_bitset() {
    let mut collection = EntityCollection::new();
    let entity = collection.create_entity();
    assert!(entity.is_missing::<Position>());

    entity.add_component(Position { x: 1.0, y: 2.0 });
    assert!(entity.has::<Position>());
    assert_eq!(
        entity.get::<Position>(),
        Some(&Position { x: 1.0, y: 2.0 })
    );

    entity.remove_component::<Position>();
    assert!(entity.is_missing::<Position>());
    assert!(entity.get::<Position>().is_none());
}

#[test]
fn duplicate_add_keeps_the_original() {
    let mut collection = EntityCollection::new();
    let entity = collection.create_entity();
    entity.add_component(Health {
        current: 100,
        max: 100,
    });
    // Logic error: warned and skipped, the original survives.
    entity.add_component(Health {
        current: 1,
        max: 1,
    });
    assert_eq!(entity.get::<Health>().unwrap().current, 100);
}

#[test]
fn add_component_if_missing_is_an_upsert() {
    let mut collection = EntityCollection::new();
    let entity = collection.create_entity();
    entity.add_component_if_missing(|| Health {
        current: 10,
        max: 10,
    });
    entity.add_component_if_missing(|| Health {
        current: 99,
        max: 99,
    });
    assert_eq!(entity.get::<Health>().unwrap().current, 10);
}

#[test]
fn temp_entities_are_invisible_until_merge() {
    let mut collection = EntityCollection::new();
    let id = {
        let entity = collection.create_entity();
        entity.add_component(Position { x: 0.0, y: 0.0 });
        entity.id
    };

    assert_eq!(collection.live_count(), 0);
    assert_eq!(collection.temp_count(), 1);
    assert_eq!(
        EntityQuery::new(&collection)
            .where_has_component::<Position>()
            .include_temp_warning(false)
            .gen_count(),
        0
    );
    // Reachable by id even before the merge.
    assert!(collection.get_entity_for_id(id).is_some());

    collection.merge_entity_arrays();
    assert_eq!(collection.temp_count(), 0);
    assert_eq!(collection.live_count(), 1);
    assert_eq!(
        EntityQuery::new(&collection)
            .where_has_component::<Position>()
            .gen_count(),
        1
    );
}

#[test]
fn merge_keeps_each_entity_exactly_once() {
    let mut collection = EntityCollection::new();
    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(collection.create_entity().id);
    }
    collection.merge_entity_arrays();
    for id in &ids {
        assert!(collection.get_entity_for_id(*id).is_some());
    }
    assert_eq!(collection.live_count(), 5);

    // Merging again is a no-op.
    collection.merge_entity_arrays();
    assert_eq!(collection.live_count(), 5);
}

#[test]
fn cleanup_removes_flagged_entities() {
    let mut collection = EntityCollection::new();
    let keep = collection.create_entity().id;
    let remove = collection.create_entity().id;
    collection.merge_entity_arrays();

    collection.mark_id_for_cleanup(remove);
    collection.cleanup();

    assert!(collection.get_entity_for_id(keep).is_some());
    assert!(collection.get_entity_for_id(remove).is_none());
}

#[test]
fn delete_all_spares_permanent_entities() {
    let mut collection = EntityCollection::new();
    let permanent = collection.create_permanent_entity().id;
    let normal = collection.create_entity().id;
    collection.merge_entity_arrays();

    collection.delete_all_entities();
    assert!(collection.get_entity_for_id(permanent).is_some());
    assert!(collection.get_entity_for_id(normal).is_none());

    collection.delete_all_entities_no_really_i_mean_all();
    assert!(collection.get_entity_for_id(permanent).is_none());
}

#[test]
fn stale_handles_fail_to_resolve() {
    let mut collection = EntityCollection::new();
    let id = collection.create_entity().id;
    collection.merge_entity_arrays();

    let handle = collection.handle_for(id);
    assert_eq!(collection.resolve(handle).map(|entity| entity.id), Some(id));

    collection.mark_id_for_cleanup(id);
    collection.cleanup();
    assert!(collection.resolve(handle).is_none());

    // The slot may be reused, but with a bumped generation.
    let fresh_id = collection.create_entity().id;
    collection.merge_entity_arrays();
    let fresh = collection.handle_for(fresh_id);
    assert_eq!(fresh.slot, handle.slot);
    assert_ne!(fresh.generation, handle.generation);
    assert!(collection.resolve(handle).is_none());
    assert_eq!(
        collection.resolve(fresh).map(|entity| entity.id),
        Some(fresh_id)
    );
}

#[test]
fn handle_round_trips_while_alive() {
    let mut collection = EntityCollection::new();
    let id = collection.create_entity().id;
    collection.merge_entity_arrays();

    let handle = collection.handle_for(id);
    let resolved = collection.resolve(handle).unwrap().id;
    assert_eq!(collection.handle_for(resolved), handle);
}

#[test]
fn singletons_resolve_in_constant_time() {
    let mut collection = EntityCollection::new();
    let id = {
        let entity = collection.create_entity();
        entity.add_component(Health {
            current: 50,
            max: 50,
        });
        entity.id
    };
    collection.merge_entity_arrays();
    collection.register_singleton::<Health>(id);

    assert!(collection.has_singleton::<Health>());
    assert_eq!(collection.get_singleton::<Health>().id, id);
    assert_eq!(
        collection.get_singleton_cmp::<Health>().unwrap().current,
        50
    );
    assert!(collection.get_singleton_cmp::<Position>().is_none());
}

#[test]
fn singleton_scope_allows_collection_access() {
    let mut collection = EntityCollection::new();
    let id = {
        let entity = collection.create_entity();
        entity.add_component(Health {
            current: 1,
            max: 1,
        });
        entity.id
    };
    collection.merge_entity_arrays();
    collection.register_singleton::<Health>(id);

    let spawned = collection
        .singleton_scope::<Health, _>(|collection, health| {
            health.current += 1;
            collection.create_entity().id
        })
        .unwrap();

    // Mutation stuck, the component is back, and the new entity exists.
    assert_eq!(collection.get_singleton_cmp::<Health>().unwrap().current, 2);
    assert!(collection.get_entity_for_id(spawned).is_some());
}

#[test]
fn enforce_singleton_flags_duplicates() {
    let mut collection = EntityCollection::new();
    for _ in 0..2 {
        collection.create_entity().add_component(Health {
            current: 1,
            max: 1,
        });
    }
    collection.merge_entity_arrays();

    // Not a crash in non-strict builds; the violation is logged.
    let mut manager = SystemManager::new();
    manager.register_update_system(EnforceSingleton::<Health>::new());
    manager.run(&mut collection, 1.0 / 60.0);
}

#[test]
fn entities_added_mid_frame_appear_after_the_frame() {
    struct Spawner;
    impl System for Spawner {
        fn should_iterate(&self) -> bool {
            false
        }
        fn once(&mut self, collection: &mut EntityCollection, _dt: f32) {
            collection.create_entity().add_component(Position {
                x: 0.0,
                y: 0.0,
            });
        }
    }

    let mut collection = EntityCollection::new();
    let mut manager = SystemManager::new();
    manager.register_update_system(Spawner);

    manager.run(&mut collection, 1.0 / 60.0);
    // The frame-end merge made the spawned entity live.
    assert_eq!(collection.live_count(), 1);
}
