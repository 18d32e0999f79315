use std::collections::BTreeMap;

use fixedbitset::FixedBitSet;

use super::component::{
    Component, ComponentId, EntityId, MAX_COMPONENTS, MAX_ENTITY_TAGS, TagId, component_type_id,
};

/// An identifier plus a component bitset and a component map.
///
/// Entities are created through [`EntityCollection::create_entity`] and live
/// on the heap inside their collection so that merges never move them.
/// Move-only: there is no `Clone`.
///
/// [`EntityCollection::create_entity`]: super::collection::EntityCollection::create_entity
pub struct Entity {
    pub id: EntityId,
    /// Opaque application-defined tag; unused by the runtime.
    pub entity_type: i32,

    pub(crate) component_set: FixedBitSet,
    pub(crate) components: BTreeMap<ComponentId, Box<dyn Component>>,
    pub(crate) tag_set: FixedBitSet,

    /// Delete at end of frame.
    pub cleanup: bool,
}

impl Entity {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            entity_type: 0,
            component_set: FixedBitSet::with_capacity(MAX_COMPONENTS),
            components: BTreeMap::new(),
            tag_set: FixedBitSet::with_capacity(MAX_ENTITY_TAGS),
            cleanup: false,
        }
    }

    // -- Components ---------------------------------------------------------

    pub fn has<T: Component>(&self) -> bool {
        self.component_set.contains(component_type_id::<T>())
    }

    pub fn is_missing<T: Component>(&self) -> bool {
        !self.has::<T>()
    }

    /// Attach a component. Adding a type that is already present is a logic
    /// error: a warning is logged and the existing component is kept.
    pub fn add_component<T: Component>(&mut self, component: T) -> &mut T {
        let component_id = component_type_id::<T>();
        log::trace!(
            "adding component_id:{component_id} {} to entity_id: {}",
            std::any::type_name::<T>(),
            self.id
        );

        if self.component_set.contains(component_id) {
            log::warn!(
                "entity {} already has component id: {component_id} ({})",
                self.id,
                std::any::type_name::<T>()
            );
            #[cfg(feature = "strict")]
            panic!("duplicate component");
            #[cfg(not(feature = "strict"))]
            return self.get_mut::<T>().unwrap();
        }

        let mut boxed: Box<dyn Component> = Box::new(component);
        boxed.attach_parent(self.id);
        self.components.insert(component_id, boxed);
        self.component_set.insert(component_id);
        self.get_mut::<T>().unwrap()
    }

    /// Attach a component unless one of the same type already exists; returns
    /// the attached (or existing) component either way.
    pub fn add_component_if_missing<T: Component>(
        &mut self,
        make: impl FnOnce() -> T,
    ) -> &mut T {
        if self.is_missing::<T>() {
            return self.add_component(make());
        }
        self.get_mut::<T>().unwrap()
    }

    /// Detach a component. Removing a type that is not attached logs an error
    /// and is otherwise a no-op.
    pub fn remove_component<T: Component>(&mut self) {
        let component_id = component_type_id::<T>();
        if !self.component_set.contains(component_id) {
            log::error!(
                "trying to remove component id: {component_id} ({}) from entity {} but it isnt attached",
                std::any::type_name::<T>(),
                self.id
            );
            return;
        }
        self.component_set.set(component_id, false);
        self.components.remove(&component_id);
    }

    pub fn remove_component_if_exists<T: Component>(&mut self) {
        if self.is_missing::<T>() {
            return;
        }
        self.remove_component::<T>();
    }

    pub fn get<T: Component>(&self) -> Option<&T> {
        self.components
            .get(&component_type_id::<T>())
            .and_then(|boxed| boxed.as_any().downcast_ref::<T>())
    }

    pub fn get_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components
            .get_mut(&component_type_id::<T>())
            .and_then(|boxed| boxed.as_any_mut().downcast_mut::<T>())
    }

    pub fn warn_if_missing_component<T: Component>(&self) {
        if self.is_missing::<T>() {
            log::warn!(
                "entity {} is missing component id: {} ({})",
                self.id,
                component_type_id::<T>(),
                std::any::type_name::<T>()
            );
        }
    }

    pub(crate) fn has_component_id(&self, component_id: ComponentId) -> bool {
        self.component_set.contains(component_id)
    }

    pub(crate) fn take_component_box(
        &mut self,
        component_id: ComponentId,
    ) -> Option<Box<dyn Component>> {
        let boxed = self.components.remove(&component_id)?;
        self.component_set.set(component_id, false);
        Some(boxed)
    }

    pub(crate) fn put_component_box(
        &mut self,
        component_id: ComponentId,
        boxed: Box<dyn Component>,
    ) {
        self.components.insert(component_id, boxed);
        self.component_set.insert(component_id);
    }

    // -- Tags ---------------------------------------------------------------

    pub fn enable_tag(&mut self, tag: TagId) {
        debug_assert!(tag < MAX_ENTITY_TAGS, "tag id out of range");
        self.tag_set.insert(tag);
    }

    pub fn disable_tag(&mut self, tag: TagId) {
        self.tag_set.set(tag, false);
    }

    pub fn has_tag(&self, tag: TagId) -> bool {
        self.tag_set.contains(tag)
    }

    pub fn has_all_tags(&self, tags: &FixedBitSet) -> bool {
        self.tag_set.is_superset(tags)
    }

    pub fn has_any_tag(&self, tags: &FixedBitSet) -> bool {
        !self.tag_set.is_disjoint(tags)
    }

    pub fn tag_set(&self) -> &FixedBitSet {
        &self.tag_set
    }

    pub fn component_set(&self) -> &FixedBitSet {
        &self.component_set
    }
}

impl std::fmt::Debug for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("entity_type", &self.entity_type)
            .field("components", &self.components.len())
            .field("cleanup", &self.cleanup)
            .finish()
    }
}
