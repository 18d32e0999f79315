use std::marker::PhantomData;

use super::collection::EntityCollection;
use super::component::Component;
use super::query::EntityQuery;
use super::system::System;

/// Verifies each frame that exactly one entity holds component `C`.
///
/// Register it right after the singleton's setup so a missing or duplicated
/// singleton is caught the frame it happens.
pub struct EnforceSingleton<C: Component> {
    _marker: PhantomData<C>,
}

impl<C: Component> Default for EnforceSingleton<C> {
    fn default() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<C: Component> EnforceSingleton<C> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: Component> System for EnforceSingleton<C> {
    fn should_iterate(&self) -> bool {
        false
    }

    fn once(&mut self, collection: &mut EntityCollection, _dt: f32) {
        let count = EntityQuery::new(collection)
            .where_has_component::<C>()
            .include_temp_warning(false)
            .gen_count();

        if count != 1 {
            log::error!(
                "expected exactly one entity with {} but found {count}",
                std::any::type_name::<C>()
            );
            #[cfg(feature = "strict")]
            panic!("singleton violation");
        }
    }
}
