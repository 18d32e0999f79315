use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{OnceLock, RwLock};

/// Upper bound on distinct component types. The component bitset on every
/// entity is this many bits wide.
pub const MAX_COMPONENTS: usize = 128;

/// Upper bound on distinct entity tags.
pub const MAX_ENTITY_TAGS: usize = 64;

/// Dense index assigned to each component type the first time it is seen.
pub type ComponentId = usize;

/// Entity identifier. Dense and monotonically increasing within a collection.
/// Negative values are reserved for sentinels (see `UIContext::ROOT`).
pub type EntityId = i64;

/// Tag index into an entity's tag bitset.
pub type TagId = usize;

/// Data attached to an entity, identified by a per-type [`ComponentId`].
///
/// Components are plain data. Use `#[derive(Component)]` from
/// `lateshift_derive` to generate the downcast plumbing:
///
/// ```ignore
/// use lateshift::prelude::*;
///
/// #[derive(Component)]
/// struct Position {
///     x: f32,
///     y: f32,
/// }
/// ```
///
/// Components are move-only by convention; anything owning children
/// (strings, vecs, boxed callbacks) must not implement `Clone`.
pub trait Component: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Called when the component is attached to an entity. The id stays valid
    /// for the entity's lifetime; resolve it through the collection, never
    /// store references.
    fn attach_parent(&mut self, _parent: EntityId) {}
}

static NEXT_COMPONENT_ID: AtomicUsize = AtomicUsize::new(0);
static COMPONENT_IDS: OnceLock<RwLock<HashMap<TypeId, ComponentId>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<TypeId, ComponentId>> {
    COMPONENT_IDS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Returns the dense id for a component type, assigning one on first use.
///
/// Ids form a stable injection from type to integer for the lifetime of the
/// process: distinct types map to distinct ids, and the same type always maps
/// to the same id.
pub fn component_type_id<T: Component>() -> ComponentId {
    let type_id = TypeId::of::<T>();
    if let Some(id) = registry().read().unwrap().get(&type_id) {
        return *id;
    }

    let mut ids = registry().write().unwrap();
    *ids.entry(type_id).or_insert_with(|| {
        let id = NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed);
        assert!(
            id < MAX_COMPONENTS,
            "exceeded MAX_COMPONENTS ({MAX_COMPONENTS}) distinct component types"
        );
        log::trace!(
            "assigned component id {id} to {}",
            std::any::type_name::<T>()
        );
        id
    })
}

/// Number of component types registered so far.
pub fn registered_component_count() -> usize {
    NEXT_COMPONENT_ID.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;

    impl Component for A {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    impl Component for B {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn type_ids_are_stable_and_distinct() {
        let a1 = component_type_id::<A>();
        let a2 = component_type_id::<A>();
        let b = component_type_id::<B>();
        assert_eq!(a1, a2);
        assert_ne!(a1, b);
        assert!(a1 < MAX_COMPONENTS);
        assert!(b < MAX_COMPONENTS);
    }
}
