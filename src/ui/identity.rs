use std::collections::HashMap;
use std::panic::Location;

use lateshift_derive::Component;

use crate::ecs::{Component, EntityCollection, EntityId};

/// Stable identity for a widget call site: hash of (parent, disambiguator,
/// source location). Deterministic per call site and per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UiId(pub u64);

/// `(entity, parent)` pair every widget function takes.
pub type EntityParent = (EntityId, EntityId);

/// Process-lifetime memo from widget identity to entity id. Singleton on the
/// UI collection.
#[derive(Component, Default)]
pub struct UIElementRegistry {
    map: HashMap<UiId, EntityId>,
}

impl UIElementRegistry {
    pub fn lookup(&self, id: UiId) -> Option<EntityId> {
        self.map.get(&id).copied()
    }

    pub fn insert(&mut self, id: UiId, entity: EntityId) {
        self.map.insert(id, entity);
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

fn hash_identity(parent: EntityId, index: i64, location: &Location<'_>) -> UiId {
    const FNV_OFFSET: u64 = 14695981039346656037;
    const FNV_PRIME: u64 = 1099511628211;

    let mut hash = FNV_OFFSET;
    let mut eat = |bytes: &[u8]| {
        for &byte in bytes {
            hash ^= byte as u64;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    };
    eat(&parent.to_le_bytes());
    eat(&index.to_le_bytes());
    eat(location.file().as_bytes());
    eat(&location.line().to_le_bytes());
    eat(&location.column().to_le_bytes());
    UiId(hash)
}

/// Resolve-or-create the entity for this widget call site.
///
/// Two widgets at the same source location under the same parent (a loop)
/// need distinct disambiguators; use [`mk_indexed`].
#[track_caller]
pub fn mk(ui: &mut EntityCollection, parent: EntityId) -> EntityParent {
    mk_at(ui, parent, -1, Location::caller())
}

/// [`mk`] with an explicit disambiguator for call sites that run more than
/// once per frame.
#[track_caller]
pub fn mk_indexed(ui: &mut EntityCollection, parent: EntityId, index: i64) -> EntityParent {
    mk_at(ui, parent, index, Location::caller())
}

fn mk_at(
    ui: &mut EntityCollection,
    parent: EntityId,
    index: i64,
    location: &Location<'_>,
) -> EntityParent {
    ensure_registry(ui);
    let ui_id = hash_identity(parent, index, location);

    let existing = ui
        .get_singleton_cmp::<UIElementRegistry>()
        .and_then(|registry| registry.lookup(ui_id));

    if let Some(entity_id) = existing {
        if ui.get_entity_for_id(entity_id).is_some() {
            log::trace!("reusing element {ui_id:?} for {entity_id}");
            return (entity_id, parent);
        }
        // Recoverable: the memoized entity was deleted. Rebind the call site
        // to a fresh entity.
        log::error!(
            "widget at {}:{}:{} resolved to deleted entity {entity_id}; recreating. If two widgets share this location, pass a unique index via mk_indexed",
            location.file(),
            location.line(),
            location.column()
        );
    }

    let entity_id = ui.create_entity().id;
    if let Some(registry) = ui.get_singleton_cmp_mut::<UIElementRegistry>() {
        registry.insert(ui_id, entity_id);
    }
    log::trace!("creating element {ui_id:?} for {entity_id}");
    (entity_id, parent)
}

fn ensure_registry(ui: &mut EntityCollection) {
    if ui.has_singleton::<UIElementRegistry>() {
        return;
    }
    let id = {
        let entity = ui.create_permanent_entity();
        entity.add_component(UIElementRegistry::default());
        entity.id
    };
    ui.register_singleton::<UIElementRegistry>(id);
}
