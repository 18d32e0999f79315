use std::cell::Cell;
use std::rc::Rc;

use super::common::*;
use crate::ecs::{
    Entity, EntityCollection, FIXED_TICK_RATE, System, SystemManager, SystemSignature, TagFilter,
};

struct MovementSystem;

impl System for MovementSystem {
    fn signature(&self) -> SystemSignature {
        SystemSignature::new().with::<Position>().with::<Velocity>()
    }

    fn for_each(&mut self, entity: &mut Entity, dt: f32) {
        let delta = {
            let velocity = entity.get::<Velocity>().unwrap();
            (velocity.dx * dt, velocity.dy * dt)
        };
        let position = entity.get_mut::<Position>().unwrap();
        position.x += delta.0;
        position.y += delta.1;
    }
}

fn world_with_movers() -> (EntityCollection, i64, i64) {
    let mut collection = EntityCollection::new();
    let mover = {
        let entity = collection.create_entity();
        entity.add_component(Position { x: 0.0, y: 0.0 });
        entity.add_component(Velocity { dx: 10.0, dy: 0.0 });
        entity.id
    };
    let still = {
        let entity = collection.create_entity();
        entity.add_component(Position { x: 100.0, y: 0.0 });
        entity.id
    };
    collection.merge_entity_arrays();
    (collection, mover, still)
}

#[test]
fn signature_filters_iteration() {
    let (mut collection, mover, still) = world_with_movers();
    let mut manager = SystemManager::new();
    manager.register_update_system(MovementSystem);
    manager.run(&mut collection, 1.0);

    assert_eq!(
        collection
            .get_entity_for_id(mover)
            .unwrap()
            .get::<Position>()
            .unwrap()
            .x,
        10.0
    );
    assert_eq!(
        collection
            .get_entity_for_id(still)
            .unwrap()
            .get::<Position>()
            .unwrap()
            .x,
        100.0
    );
}

#[test]
fn lifecycle_hooks_fire_in_order() {
    #[derive(Default)]
    struct Trace {
        log: Rc<std::cell::RefCell<Vec<&'static str>>>,
    }

    impl System for Trace {
        fn signature(&self) -> SystemSignature {
            SystemSignature::new().with::<Position>()
        }
        fn once(&mut self, _collection: &mut EntityCollection, _dt: f32) {
            self.log.borrow_mut().push("once");
        }
        fn on_iteration_begin(&mut self, _dt: f32) {
            self.log.borrow_mut().push("begin");
        }
        fn for_each(&mut self, _entity: &mut Entity, _dt: f32) {
            self.log.borrow_mut().push("each");
        }
        fn on_iteration_end(&mut self, _dt: f32) {
            self.log.borrow_mut().push("end");
        }
        fn after(&mut self, _collection: &mut EntityCollection, _dt: f32) {
            self.log.borrow_mut().push("after");
        }
    }

    let mut collection = EntityCollection::new();
    for _ in 0..2 {
        collection.create_entity().add_component(Position {
            x: 0.0,
            y: 0.0,
        });
    }
    collection.merge_entity_arrays();

    let log = Rc::new(std::cell::RefCell::new(Vec::new()));
    let mut manager = SystemManager::new();
    manager.register_update_system(Trace { log: log.clone() });
    manager.run(&mut collection, 1.0);

    assert_eq!(
        *log.borrow(),
        vec!["once", "begin", "each", "each", "end", "after"]
    );
}

#[test]
fn should_run_gates_everything() {
    struct Conditional {
        enabled: Rc<Cell<bool>>,
        calls: Rc<Cell<u32>>,
    }

    impl System for Conditional {
        fn signature(&self) -> SystemSignature {
            SystemSignature::new().with::<Position>()
        }
        fn should_run(&mut self, _dt: f32) -> bool {
            self.enabled.get()
        }
        fn for_each(&mut self, _entity: &mut Entity, _dt: f32) {
            self.calls.set(self.calls.get() + 1);
        }
    }

    let mut collection = EntityCollection::new();
    collection.create_entity().add_component(Position {
        x: 0.0,
        y: 0.0,
    });
    collection.merge_entity_arrays();

    let enabled = Rc::new(Cell::new(true));
    let calls = Rc::new(Cell::new(0));
    let mut manager = SystemManager::new();
    manager.register_update_system(Conditional {
        enabled: enabled.clone(),
        calls: calls.clone(),
    });

    manager.run(&mut collection, 1.0);
    assert_eq!(calls.get(), 1);

    enabled.set(false);
    manager.run(&mut collection, 1.0);
    assert_eq!(calls.get(), 1);

    enabled.set(true);
    manager.run(&mut collection, 1.0);
    assert_eq!(calls.get(), 2);
}

#[test]
fn tag_requirements_limit_matches() {
    struct EnemyTick {
        ticks: Rc<Cell<u32>>,
    }

    impl System for EnemyTick {
        fn signature(&self) -> SystemSignature {
            SystemSignature::new()
                .with::<Health>()
                .with_tags(TagFilter::all([GameTag::Enemy.id()]))
        }
        fn for_each(&mut self, entity: &mut Entity, _dt: f32) {
            entity.get_mut::<Health>().unwrap().current -= 1;
            self.ticks.set(self.ticks.get() + 1);
        }
    }

    let mut collection = EntityCollection::new();
    for tag in [GameTag::Player, GameTag::Enemy, GameTag::Enemy, GameTag::Npc] {
        let entity = collection.create_entity();
        entity.add_component(Health {
            current: 10,
            max: 10,
        });
        entity.enable_tag(tag.id());
    }
    collection.merge_entity_arrays();

    let ticks = Rc::new(Cell::new(0));
    let mut manager = SystemManager::new();
    manager.register_update_system(EnemyTick {
        ticks: ticks.clone(),
    });
    manager.run(&mut collection, 1.0);

    assert_eq!(ticks.get(), 2);
}

#[test]
fn callback_systems_run_without_iteration() {
    let calls = Rc::new(Cell::new(0));
    let calls_in_cb = calls.clone();

    let mut collection = EntityCollection::new();
    let mut manager = SystemManager::new();
    manager.register_update_callback(move |_dt| {
        calls_in_cb.set(calls_in_cb.get() + 1);
    });

    manager.run(&mut collection, 1.0);
    manager.run(&mut collection, 1.0);
    assert_eq!(calls.get(), 2);
}

#[test]
fn fixed_update_drains_the_accumulator() {
    struct FixedTick {
        ticks: Rc<Cell<u32>>,
    }

    impl System for FixedTick {
        fn should_iterate(&self) -> bool {
            false
        }
        fn once(&mut self, _collection: &mut EntityCollection, dt: f32) {
            assert!((dt - FIXED_TICK_RATE).abs() < f32::EPSILON);
            self.ticks.set(self.ticks.get() + 1);
        }
    }

    let ticks = Rc::new(Cell::new(0));
    let mut collection = EntityCollection::new();
    let mut manager = SystemManager::new();
    manager.register_fixed_update_system(FixedTick {
        ticks: ticks.clone(),
    });

    // 0.1s at 120Hz is 12 full ticks.
    manager.run(&mut collection, 0.1);
    assert_eq!(ticks.get(), 12);

    // The remainder carries over.
    manager.run(&mut collection, FIXED_TICK_RATE * 0.5);
    assert_eq!(ticks.get(), 12);
    manager.run(&mut collection, FIXED_TICK_RATE * 0.6);
    assert_eq!(ticks.get(), 13);
}

#[test]
fn render_systems_see_const_entities() {
    struct RenderCount {
        seen: Rc<Cell<u32>>,
    }

    impl System for RenderCount {
        fn signature(&self) -> SystemSignature {
            SystemSignature::new().with::<Position>()
        }
        fn for_each_const(&self, _entity: &Entity, _dt: f32) {
            self.seen.set(self.seen.get() + 1);
        }
    }

    let mut collection = EntityCollection::new();
    for _ in 0..3 {
        collection.create_entity().add_component(Position {
            x: 0.0,
            y: 0.0,
        });
    }
    collection.merge_entity_arrays();

    let seen = Rc::new(Cell::new(0));
    let mut manager = SystemManager::new();
    manager.register_render_system(RenderCount { seen: seen.clone() });
    manager.run(&mut collection, 1.0);

    assert_eq!(seen.get(), 3);
}

#[test]
fn systems_run_in_registration_order() {
    let order = Rc::new(std::cell::RefCell::new(Vec::new()));
    let mut collection = EntityCollection::new();
    let mut manager = SystemManager::new();
    for index in 1..=3 {
        let order = order.clone();
        manager.register_update_callback(move |_dt| {
            order.borrow_mut().push(index);
        });
    }

    manager.run(&mut collection, 1.0);
    assert_eq!(*order.borrow(), vec![1, 2, 3]);
}
