use std::cmp::Ordering;

use fixedbitset::FixedBitSet;

use super::collection::EntityCollection;
use super::component::{Component, ComponentId, EntityId, TagId, component_type_id};
use super::entity::Entity;

type Predicate<'a> = Box<dyn Fn(&Entity) -> bool + 'a>;
type Comparator<'a> = Box<dyn Fn(&Entity, &Entity) -> Ordering + 'a>;

enum Filter<'a> {
    HasComponent(ComponentId),
    MissingComponent(ComponentId),
    HasTag(TagId),
    HasAllTags(FixedBitSet),
    HasAnyTag(FixedBitSet),
    Id(EntityId),
    NotId(EntityId),
    Lambda(Predicate<'a>),
}

impl Filter<'_> {
    fn matches(&self, entity: &Entity) -> bool {
        match self {
            Filter::HasComponent(id) => entity.has_component_id(*id),
            Filter::MissingComponent(id) => !entity.has_component_id(*id),
            Filter::HasTag(tag) => entity.has_tag(*tag),
            Filter::HasAllTags(tags) => entity.has_all_tags(tags),
            Filter::HasAnyTag(tags) => entity.has_any_tag(tags),
            Filter::Id(id) => entity.id == *id,
            Filter::NotId(id) => entity.id != *id,
            Filter::Lambda(predicate) => predicate(entity),
        }
    }
}

/// Composable, filtered iteration over a collection's live entities.
///
/// Filters are evaluated in declaration order and short-circuit on the first
/// failure. Sorting happens before any limit is applied.
///
/// ```ignore
/// let movers = EntityQuery::new(&collection)
///     .where_has_component::<Position>()
///     .where_has_component::<Velocity>()
///     .r#gen();
/// ```
pub struct EntityQuery<'a> {
    collection: &'a EntityCollection,
    filters: Vec<Filter<'a>>,
    order_by: Option<Comparator<'a>>,
    limit: Option<usize>,
    suppress_temp_warning: bool,
}

impl<'a> EntityQuery<'a> {
    pub fn new(collection: &'a EntityCollection) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            order_by: None,
            limit: None,
            suppress_temp_warning: false,
        }
    }

    // -- Filters ------------------------------------------------------------

    pub fn where_has_component<C: Component>(mut self) -> Self {
        self.filters
            .push(Filter::HasComponent(component_type_id::<C>()));
        self
    }

    pub fn where_missing_component<C: Component>(mut self) -> Self {
        self.filters
            .push(Filter::MissingComponent(component_type_id::<C>()));
        self
    }

    pub fn where_has_tag(mut self, tag: TagId) -> Self {
        self.filters.push(Filter::HasTag(tag));
        self
    }

    pub fn where_has_all_tags(mut self, tags: FixedBitSet) -> Self {
        self.filters.push(Filter::HasAllTags(tags));
        self
    }

    pub fn where_has_any_tag(mut self, tags: FixedBitSet) -> Self {
        self.filters.push(Filter::HasAnyTag(tags));
        self
    }

    pub fn where_id(mut self, id: EntityId) -> Self {
        self.filters.push(Filter::Id(id));
        self
    }

    pub fn where_not_id(mut self, id: EntityId) -> Self {
        self.filters.push(Filter::NotId(id));
        self
    }

    pub fn where_lambda(mut self, predicate: impl Fn(&Entity) -> bool + 'a) -> Self {
        self.filters.push(Filter::Lambda(Box::new(predicate)));
        self
    }

    // -- Ordering and limits ------------------------------------------------

    /// Stable sort by a user comparator, applied before any limit.
    pub fn order_by_lambda(mut self, cmp: impl Fn(&Entity, &Entity) -> Ordering + 'a) -> Self {
        self.order_by = Some(Box::new(cmp));
        self
    }

    /// Cap the result count.
    ///
    /// By default `take(n)` yields at most `n` entities. The `take-plus-one`
    /// feature restores the historical behavior of yielding `n + 1`.
    pub fn take(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn first(self) -> Self {
        self.take(1)
    }

    /// Silence the un-merged-temp warning for this query only.
    pub fn include_temp_warning(mut self, warn: bool) -> Self {
        self.suppress_temp_warning = !warn;
        self
    }

    // -- Generation ---------------------------------------------------------

    pub fn r#gen(self) -> Vec<&'a Entity> {
        self.warn_if_unmerged();

        let mut results: Vec<&'a Entity> = self
            .collection
            .entities()
            .filter(|entity| self.filters.iter().all(|f| f.matches(entity)))
            .collect();

        if let Some(cmp) = &self.order_by {
            results.sort_by(|a, b| cmp(a, b));
        }

        if let Some(limit) = self.limit {
            let cap = if cfg!(feature = "take-plus-one") {
                limit + 1
            } else {
                limit
            };
            results.truncate(cap);
        }

        results
    }

    pub fn gen_ids(self) -> Vec<EntityId> {
        self.r#gen().into_iter().map(|e| e.id).collect()
    }

    pub fn gen_count(self) -> usize {
        self.r#gen().len()
    }

    pub fn gen_first(self) -> Option<&'a Entity> {
        self.first().r#gen().into_iter().next()
    }

    pub fn has_values(self) -> bool {
        self.gen_first().is_some()
    }

    fn warn_if_unmerged(&self) {
        if self.collection.has_unmerged_temp()
            && !self.suppress_temp_warning
            && !self.collection.temp_warnings_suppressed()
        {
            log::warn!(
                "query evaluated with {} un-merged temp entities; they are invisible until merge_entity_arrays() runs",
                self.collection.temp_count()
            );
        }
    }
}
