use fixedbitset::FixedBitSet;

use super::component::{MAX_ENTITY_TAGS, TagId};
use super::entity::Entity;

/// Build a tag bitset from tag ids.
pub fn tag_set(tags: impl IntoIterator<Item = TagId>) -> FixedBitSet {
    let mut set = FixedBitSet::with_capacity(MAX_ENTITY_TAGS);
    for tag in tags {
        debug_assert!(tag < MAX_ENTITY_TAGS, "tag id out of range");
        set.insert(tag);
    }
    set
}

/// Tag requirements matched against an entity's tag bitset: every
/// `required_all` bit must be present, at least one `required_any` bit (when
/// non-empty), and no `forbidden` bit.
#[derive(Clone, Debug, Default)]
pub struct TagFilter {
    required_all: Option<FixedBitSet>,
    required_any: Option<FixedBitSet>,
    forbidden: Option<FixedBitSet>,
}

impl TagFilter {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn all(tags: impl IntoIterator<Item = TagId>) -> Self {
        Self::default().with_all(tags)
    }

    pub fn any(tags: impl IntoIterator<Item = TagId>) -> Self {
        Self::default().with_any(tags)
    }

    pub fn without(tags: impl IntoIterator<Item = TagId>) -> Self {
        Self::default().with_none(tags)
    }

    pub fn with_all(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.required_all = Some(tag_set(tags));
        self
    }

    pub fn with_any(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.required_any = Some(tag_set(tags));
        self
    }

    pub fn with_none(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.forbidden = Some(tag_set(tags));
        self
    }

    /// Whether this filter constrains anything at all. Systems whose
    /// signature has no tag requirements skip the tag check entirely.
    pub fn has_tag_requirements(&self) -> bool {
        self.required_all.is_some() || self.required_any.is_some() || self.forbidden.is_some()
    }

    pub fn matches(&self, entity: &Entity) -> bool {
        if let Some(all) = &self.required_all {
            if !entity.has_all_tags(all) {
                return false;
            }
        }
        if let Some(any) = &self.required_any {
            if !entity.has_any_tag(any) {
                return false;
            }
        }
        if let Some(forbidden) = &self.forbidden {
            if entity.has_any_tag(forbidden) {
                return false;
            }
        }
        true
    }
}
