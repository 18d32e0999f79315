use fixedbitset::FixedBitSet;

use super::collection::EntityCollection;
use super::component::{Component, MAX_COMPONENTS, component_type_id};
use super::entity::Entity;
use super::tags::TagFilter;

/// Fixed-step tick length for the fixed-update phase, in seconds.
pub const FIXED_TICK_RATE: f32 = 1.0 / 120.0;

/// The component + tag requirements a system declares for entity iteration.
#[derive(Clone, Debug, Default)]
pub struct SystemSignature {
    components: FixedBitSet,
    tags: TagFilter,
}

impl SystemSignature {
    pub fn new() -> Self {
        Self {
            components: FixedBitSet::with_capacity(MAX_COMPONENTS),
            tags: TagFilter::none(),
        }
    }

    /// Require component `C` on every iterated entity.
    pub fn with<C: Component>(mut self) -> Self {
        self.components.insert(component_type_id::<C>());
        self
    }

    pub fn with_tags(mut self, tags: TagFilter) -> Self {
        self.tags = tags;
        self
    }

    pub fn has_tag_requirements(&self) -> bool {
        self.tags.has_tag_requirements()
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        if !entity.component_set().is_superset(&self.components) {
            return false;
        }
        if self.tags.has_tag_requirements() && !self.tags.matches(entity) {
            return false;
        }
        true
    }
}

/// A unit of logic run each phase against the entities matching its
/// signature.
///
/// Hooks fire in order: `should_run` gates everything, then `once`,
/// `on_iteration_begin`, `for_each` per matching entity (skipped when
/// `should_iterate` is false), `on_iteration_end`, `after`. Render-phase
/// systems additionally receive `for_each_const` with a shared reference.
///
/// Structural changes during iteration are mediated: adds go to the
/// collection's temp partition, deletes set the `cleanup` flag; both settle
/// at the frame boundary.
pub trait System {
    /// Component and tag requirements, read once at registration.
    fn signature(&self) -> SystemSignature {
        SystemSignature::new()
    }

    fn should_run(&mut self, _dt: f32) -> bool {
        true
    }

    /// Opt out of entity iteration entirely (the other hooks still run).
    fn should_iterate(&self) -> bool {
        true
    }

    fn once(&mut self, _collection: &mut EntityCollection, _dt: f32) {}

    fn on_iteration_begin(&mut self, _dt: f32) {}

    fn for_each(&mut self, _entity: &mut Entity, _dt: f32) {}

    /// Shared-reference variant used by the render phase.
    fn for_each_const(&self, _entity: &Entity, _dt: f32) {}

    fn on_iteration_end(&mut self, _dt: f32) {}

    fn after(&mut self, _collection: &mut EntityCollection, _dt: f32) {}

    /// The iteration step itself. Systems that need collection-wide access
    /// while visiting entities (interaction systems, reconcilers) override
    /// this instead of `for_each`.
    fn run_iteration(
        &mut self,
        collection: &mut EntityCollection,
        signature: &SystemSignature,
        dt: f32,
    ) {
        for entity in collection.entities_mut() {
            if signature.matches(entity) {
                self.for_each(entity, dt);
            }
        }
    }
}

/// Wraps a plain closure as a non-iterating system.
pub struct CallbackSystem {
    callback: Box<dyn FnMut(f32)>,
}

impl CallbackSystem {
    pub fn new(callback: impl FnMut(f32) + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl System for CallbackSystem {
    fn should_iterate(&self) -> bool {
        false
    }

    fn once(&mut self, _collection: &mut EntityCollection, dt: f32) {
        (self.callback)(dt);
    }
}

/// Which collection a registered system iterates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CollectionTarget {
    Game,
    Ui,
}

struct Registered {
    system: Box<dyn System>,
    signature: SystemSignature,
    target: CollectionTarget,
    name: &'static str,
}

/// Phase-ordered system scheduler.
///
/// `run` drains the fixed-update accumulator first (at [`FIXED_TICK_RATE`]),
/// then the update phase, then the render phase, in registration order
/// within each phase. Collections are merged and cleaned at the end of the
/// frame.
pub struct SystemManager {
    update: Vec<Registered>,
    fixed_update: Vec<Registered>,
    render: Vec<Registered>,
    accumulator: f32,
}

impl Default for SystemManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemManager {
    pub fn new() -> Self {
        Self {
            update: Vec::new(),
            fixed_update: Vec::new(),
            render: Vec::new(),
            accumulator: 0.0,
        }
    }

    fn register<S: System + 'static>(
        list: &mut Vec<Registered>,
        system: S,
        target: CollectionTarget,
    ) {
        let signature = system.signature();
        let name = std::any::type_name::<S>();
        log::trace!("registering system {name} ({target:?})");
        list.push(Registered {
            system: Box::new(system),
            signature,
            target,
            name,
        });
    }

    pub fn register_update_system<S: System + 'static>(&mut self, system: S) {
        Self::register(&mut self.update, system, CollectionTarget::Game);
    }

    pub fn register_fixed_update_system<S: System + 'static>(&mut self, system: S) {
        Self::register(&mut self.fixed_update, system, CollectionTarget::Game);
    }

    pub fn register_render_system<S: System + 'static>(&mut self, system: S) {
        Self::register(&mut self.render, system, CollectionTarget::Game);
    }

    pub fn register_ui_update_system<S: System + 'static>(&mut self, system: S) {
        Self::register(&mut self.update, system, CollectionTarget::Ui);
    }

    pub fn register_ui_render_system<S: System + 'static>(&mut self, system: S) {
        Self::register(&mut self.render, system, CollectionTarget::Ui);
    }

    /// Register a bare `FnMut(f32)` as an update system.
    pub fn register_update_callback(&mut self, callback: impl FnMut(f32) + 'static) {
        self.register_update_system(CallbackSystem::new(callback));
    }

    /// Run one frame against a single collection (game and UI systems both
    /// target it).
    pub fn run(&mut self, collection: &mut EntityCollection, dt: f32) {
        // Fixed update drains the accumulator in fixed-size ticks.
        self.accumulator += dt;
        while self.accumulator >= FIXED_TICK_RATE {
            for entry in &mut self.fixed_update {
                run_system(entry, collection, FIXED_TICK_RATE, false);
            }
            self.accumulator -= FIXED_TICK_RATE;
        }

        for entry in &mut self.update {
            run_system(entry, collection, dt, false);
        }

        for entry in &mut self.render {
            run_system(entry, collection, dt, true);
        }

        collection.merge_entity_arrays();
        collection.cleanup();
    }

    /// Run one frame with a separate UI collection.
    pub fn run_split(
        &mut self,
        game: &mut EntityCollection,
        ui: &mut EntityCollection,
        dt: f32,
    ) {
        self.accumulator += dt;
        while self.accumulator >= FIXED_TICK_RATE {
            for entry in &mut self.fixed_update {
                let collection = pick(game, ui, entry.target);
                run_system(entry, collection, FIXED_TICK_RATE, false);
            }
            self.accumulator -= FIXED_TICK_RATE;
        }

        for entry in &mut self.update {
            let collection = pick(game, ui, entry.target);
            run_system(entry, collection, dt, false);
        }

        for entry in &mut self.render {
            let collection = pick(game, ui, entry.target);
            run_system(entry, collection, dt, true);
        }

        game.merge_entity_arrays();
        game.cleanup();
        ui.merge_entity_arrays();
        ui.cleanup();
    }
}

fn pick<'a>(
    game: &'a mut EntityCollection,
    ui: &'a mut EntityCollection,
    target: CollectionTarget,
) -> &'a mut EntityCollection {
    match target {
        CollectionTarget::Game => game,
        CollectionTarget::Ui => ui,
    }
}

fn run_system(entry: &mut Registered, collection: &mut EntityCollection, dt: f32, render: bool) {
    let Registered {
        system,
        signature,
        name,
        ..
    } = entry;
    if !system.should_run(dt) {
        return;
    }
    log::trace!("running system {name}");

    system.once(collection, dt);
    system.on_iteration_begin(dt);

    if system.should_iterate() {
        system.run_iteration(collection, signature, dt);
        if render {
            for entity in collection.entities() {
                if signature.matches(entity) {
                    system.for_each_const(entity, dt);
                }
            }
        }
    }

    system.on_iteration_end(dt);
    system.after(collection, dt);
}
