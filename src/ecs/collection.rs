use std::collections::{HashMap, HashSet};

use super::component::{Component, ComponentId, EntityId, component_type_id};
use super::entity::Entity;
use super::handle::{Handle, HandleTable};

/// Owns entities with two-phase creation, a handle table, and a singleton
/// registry.
///
/// New entities land in `temp` and are invisible to queries until
/// [`merge_entity_arrays`] moves them into `live`. Entities are boxed so a
/// merge never moves them in memory.
///
/// [`merge_entity_arrays`]: EntityCollection::merge_entity_arrays
pub struct EntityCollection {
    temp: Vec<Box<Entity>>,
    live: Vec<Box<Entity>>,
    permanent_ids: HashSet<EntityId>,
    id_index: HashMap<EntityId, usize>,
    handles: HandleTable,
    singletons: HashMap<ComponentId, EntityId>,
    next_id: EntityId,
    suppress_temp_warnings: bool,
}

impl Default for EntityCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityCollection {
    pub fn new() -> Self {
        Self {
            temp: Vec::new(),
            live: Vec::new(),
            permanent_ids: HashSet::new(),
            id_index: HashMap::new(),
            handles: HandleTable::new(),
            singletons: HashMap::new(),
            next_id: 0,
            suppress_temp_warnings: false,
        }
    }

    // -- Entity lifecycle ---------------------------------------------------

    pub fn create_entity(&mut self) -> &mut Entity {
        self.create_entity_with_options(false)
    }

    /// Create an entity that survives [`delete_all_entities`].
    ///
    /// [`delete_all_entities`]: EntityCollection::delete_all_entities
    pub fn create_permanent_entity(&mut self) -> &mut Entity {
        self.create_entity_with_options(true)
    }

    fn create_entity_with_options(&mut self, is_permanent: bool) -> &mut Entity {
        let id = self.next_id;
        self.next_id += 1;

        if is_permanent {
            self.permanent_ids.insert(id);
        }

        #[cfg(feature = "handles-on-create")]
        {
            self.handles.handle_for(id);
        }

        log::trace!("new entity | id: {id} | permanent: {is_permanent}");
        self.temp.push(Box::new(Entity::new(id)));
        self.temp.last_mut().unwrap()
    }

    /// Move all temp entities into live storage and refresh the id index.
    /// Call each frame between mutation and iteration.
    pub fn merge_entity_arrays(&mut self) {
        if self.temp.is_empty() {
            return;
        }
        log::trace!("merging {} temp entities into live", self.temp.len());
        for entity in self.temp.drain(..) {
            self.id_index.insert(entity.id, self.live.len());
            self.live.push(entity);
        }
    }

    pub fn mark_id_for_cleanup(&mut self, id: EntityId) {
        if let Some(entity) = self.get_entity_for_id_mut(id) {
            entity.cleanup = true;
        }
    }

    /// Delete every entity whose `cleanup` flag is set, invalidating any
    /// handle slots that referenced them.
    pub fn cleanup(&mut self) {
        let any_flagged = self.live.iter().any(|e| e.cleanup)
            || self.temp.iter().any(|e| e.cleanup);
        if !any_flagged {
            return;
        }

        let handles = &mut self.handles;
        let permanent_ids = &mut self.permanent_ids;
        let mut remove = |entity: &Box<Entity>| -> bool {
            if entity.cleanup {
                log::trace!("cleaning up entity {}", entity.id);
                handles.invalidate(entity.id);
                permanent_ids.remove(&entity.id);
                true
            } else {
                false
            }
        };
        self.live.retain(|e| !remove(e));
        self.temp.retain(|e| !remove(e));
        self.rebuild_id_index();
    }

    /// Remove all entities except permanent ones.
    pub fn delete_all_entities(&mut self) {
        let handles = &mut self.handles;
        let permanent_ids = &self.permanent_ids;
        let mut remove = |entity: &Box<Entity>| -> bool {
            if permanent_ids.contains(&entity.id) {
                false
            } else {
                handles.invalidate(entity.id);
                true
            }
        };
        self.live.retain(|e| !remove(e));
        self.temp.retain(|e| !remove(e));
        self.rebuild_id_index();
    }

    /// Remove every entity, permanent ones included.
    pub fn delete_all_entities_no_really_i_mean_all(&mut self) {
        self.live.clear();
        self.temp.clear();
        self.permanent_ids.clear();
        self.id_index.clear();
        self.handles.clear();
        self.singletons.clear();
    }

    fn rebuild_id_index(&mut self) {
        self.id_index.clear();
        for (index, entity) in self.live.iter().enumerate() {
            self.id_index.insert(entity.id, index);
        }
    }

    // -- Lookup -------------------------------------------------------------

    /// O(1) via the id index for live entities; falls back to scanning temp
    /// so same-frame creations are reachable by id.
    pub fn get_entity_for_id(&self, id: EntityId) -> Option<&Entity> {
        if id < 0 {
            return None;
        }
        if let Some(&index) = self.id_index.get(&id) {
            return self.live.get(index).map(|boxed| boxed.as_ref());
        }
        self.temp
            .iter()
            .find(|e| e.id == id)
            .map(|boxed| boxed.as_ref())
    }

    pub fn get_entity_for_id_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        if id < 0 {
            return None;
        }
        if let Some(&index) = self.id_index.get(&id) {
            return self.live.get_mut(index).map(|boxed| boxed.as_mut());
        }
        self.temp
            .iter_mut()
            .find(|e| e.id == id)
            .map(|boxed| boxed.as_mut())
    }

    /// Iteration view over live entities. Readers must treat this as
    /// read-only; structural changes go through temp / cleanup flags.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.live.iter().map(|boxed| boxed.as_ref())
    }

    pub fn entities_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.live.iter_mut().map(|boxed| boxed.as_mut())
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn temp_count(&self) -> usize {
        self.temp.len()
    }

    pub fn has_unmerged_temp(&self) -> bool {
        !self.temp.is_empty()
    }

    /// Silence the "query ran with un-merged temp entities" warning for this
    /// collection.
    pub fn suppress_temp_warnings(&mut self, suppress: bool) {
        self.suppress_temp_warnings = suppress;
    }

    pub(crate) fn temp_warnings_suppressed(&self) -> bool {
        self.suppress_temp_warnings
    }

    // -- Handles ------------------------------------------------------------

    /// Allocate (or fetch) the stable handle for an entity.
    pub fn handle_for(&mut self, id: EntityId) -> Handle {
        self.handles.handle_for(id)
    }

    /// Resolve a handle; `None` if the slot's generation differs from the
    /// handle's or the slot is tombstoned.
    pub fn resolve(&self, handle: Handle) -> Option<&Entity> {
        let id = self.handles.resolve(handle)?;
        self.get_entity_for_id(id)
    }

    pub fn resolve_mut(&mut self, handle: Handle) -> Option<&mut Entity> {
        let id = self.handles.resolve(handle)?;
        self.get_entity_for_id_mut(id)
    }

    // -- Singletons ---------------------------------------------------------

    /// Register an entity as the unique holder of component `C`.
    pub fn register_singleton<C: Component>(&mut self, id: EntityId) {
        let component_id = component_type_id::<C>();
        match self.get_entity_for_id(id) {
            Some(entity) if entity.has::<C>() => {}
            Some(_) => log::warn!(
                "registering singleton {} on entity {id} which doesnt have the component attached",
                std::any::type_name::<C>()
            ),
            None => log::warn!(
                "registering singleton {} for unknown entity {id}",
                std::any::type_name::<C>()
            ),
        }
        self.singletons.insert(component_id, id);
    }

    pub fn has_singleton<C: Component>(&self) -> bool {
        self.singletons.contains_key(&component_type_id::<C>())
    }

    pub(crate) fn singleton_id<C: Component>(&self) -> Option<EntityId> {
        self.singletons.get(&component_type_id::<C>()).copied()
    }

    /// The unique entity registered for component `C`.
    ///
    /// Panics if no singleton was registered; use
    /// [`get_singleton_cmp`](EntityCollection::get_singleton_cmp) for the
    /// fallible path.
    pub fn get_singleton<C: Component>(&self) -> &Entity {
        let id = self.singleton_id::<C>().unwrap_or_else(|| {
            panic!(
                "no singleton registered for {}",
                std::any::type_name::<C>()
            )
        });
        self.get_entity_for_id(id).unwrap_or_else(|| {
            panic!(
                "singleton entity {id} for {} no longer exists",
                std::any::type_name::<C>()
            )
        })
    }

    pub fn get_singleton_cmp<C: Component>(&self) -> Option<&C> {
        let id = self.singleton_id::<C>()?;
        self.get_entity_for_id(id)?.get::<C>()
    }

    pub fn get_singleton_cmp_mut<C: Component>(&mut self) -> Option<&mut C> {
        let id = self.singleton_id::<C>()?;
        self.get_entity_for_id_mut(id)?.get_mut::<C>()
    }

    /// Temporarily detach the singleton component `C` so the caller can
    /// mutate it and the rest of the collection at the same time. The
    /// component is reattached afterwards.
    pub fn singleton_scope<C: Component, R>(
        &mut self,
        f: impl FnOnce(&mut Self, &mut C) -> R,
    ) -> Option<R> {
        let id = self.singleton_id::<C>()?;
        let component_id = component_type_id::<C>();
        let mut boxed = self
            .get_entity_for_id_mut(id)?
            .take_component_box(component_id)?;

        let result = {
            let component = boxed
                .as_any_mut()
                .downcast_mut::<C>()
                .expect("type mismatch in singleton registry");
            f(self, component)
        };

        if let Some(entity) = self.get_entity_for_id_mut(id) {
            entity.put_component_box(component_id, boxed);
        } else {
            log::warn!(
                "singleton entity {id} for {} was deleted inside singleton_scope",
                std::any::type_name::<C>()
            );
        }
        Some(result)
    }
}

impl std::fmt::Debug for EntityCollection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCollection")
            .field("live", &self.live.len())
            .field("temp", &self.temp.len())
            .field("permanent", &self.permanent_ids.len())
            .field("singletons", &self.singletons.len())
            .finish()
    }
}
