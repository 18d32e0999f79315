use crate::ecs::{Component, EntityCollection, EntityId, SystemManager};
use crate::geometry::Resolution;
use crate::input::{InputAction, InputSnapshot};
use crate::ui::systems::{
    add_singleton_components, register_after_ui_systems, register_before_ui_systems,
};
use crate::ui::theme::Theme;

/// Owns the entity collections and the scheduler; the host's embedding
/// point.
///
/// The UI keeps its own collection so widgets never pollute game-logic
/// queries (collapsed into one under the `single-ui-collection` feature).
/// Singletons registered through [`register_ui_singleton`] land in both
/// registries so game systems can reach UI state by type.
///
/// A frame:
///
/// ```ignore
/// app.input_mut::<Action>().unwrap().mouse_pos = mouse;
/// app.run_frame(dt); // systems registered between the before/after UI
///                    // markers build widgets and drive interaction
/// ```
///
/// [`register_ui_singleton`]: App::register_ui_singleton
pub struct App {
    pub collection: EntityCollection,
    #[cfg(not(feature = "single-ui-collection"))]
    ui_collection: EntityCollection,
    pub systems: SystemManager,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            collection: EntityCollection::new(),
            #[cfg(not(feature = "single-ui-collection"))]
            ui_collection: EntityCollection::new(),
            systems: SystemManager::new(),
        }
    }

    /// The game collection.
    pub fn game(&mut self) -> &mut EntityCollection {
        &mut self.collection
    }

    /// The UI collection (the game collection when collapsed).
    #[cfg(not(feature = "single-ui-collection"))]
    pub fn ui(&mut self) -> &mut EntityCollection {
        &mut self.ui_collection
    }

    #[cfg(feature = "single-ui-collection")]
    pub fn ui(&mut self) -> &mut EntityCollection {
        &mut self.collection
    }

    /// Set up the UI plugin: singleton components, the frame-opening system,
    /// and (after `host_systems` ran) layout + interaction + frame-closing
    /// systems. Host widget-building systems registered inside
    /// `host_systems` run between the two, which is where widget calls
    /// belong.
    pub fn install_ui<A: InputAction>(
        &mut self,
        theme: Theme,
        resolution: Resolution,
        host_systems: impl FnOnce(&mut SystemManager),
    ) -> EntityId {
        let id = add_singleton_components::<A>(self.ui(), theme);
        register_before_ui_systems::<A>(&mut self.systems);
        host_systems(&mut self.systems);
        register_after_ui_systems::<A>(&mut self.systems, resolution);
        id
    }

    /// Register a singleton for both collections, so game and UI systems
    /// find it by type.
    pub fn register_ui_singleton<C: Component>(&mut self, id: EntityId) {
        self.ui().register_singleton::<C>(id);
        #[cfg(not(feature = "single-ui-collection"))]
        self.collection.register_singleton::<C>(id);
    }

    /// The host-filled input snapshot for this frame.
    pub fn input_mut<A: InputAction>(&mut self) -> Option<&mut InputSnapshot<A>> {
        use crate::input::InputCollector;
        self.ui()
            .get_singleton_cmp_mut::<InputCollector<A>>()
            .map(|collector| &mut collector.snapshot)
    }

    /// Run one frame: fixed updates, updates, render systems, then merge +
    /// cleanup on every collection.
    pub fn run_frame(&mut self, dt: f32) {
        #[cfg(not(feature = "single-ui-collection"))]
        self.systems
            .run_split(&mut self.collection, &mut self.ui_collection, dt);
        #[cfg(feature = "single-ui-collection")]
        self.systems.run(&mut self.collection, dt);
    }
}
