use std::collections::HashMap;

use super::component::EntityId;

/// A stable reference to an entity that survives merges and is invalidated by
/// destruction. Resolution goes through [`EntityCollection::resolve`].
///
/// [`EntityCollection::resolve`]: super::collection::EntityCollection::resolve
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    pub slot: u32,
    pub generation: u32,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    /// `None` marks a tombstone; the slot is free for reuse.
    target: Option<EntityId>,
}

/// Slot table backing [`Handle`] resolution. Slots are reused after their
/// entity dies, with the generation bumped so stale handles fail to resolve.
#[derive(Default, Debug)]
pub struct HandleTable {
    slots: Vec<Slot>,
    by_entity: HashMap<EntityId, u32>,
    free: Vec<u32>,
}

impl HandleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a handle for an entity, or return the existing one.
    pub fn handle_for(&mut self, entity_id: EntityId) -> Handle {
        if let Some(&slot) = self.by_entity.get(&entity_id) {
            return Handle {
                slot,
                generation: self.slots[slot as usize].generation,
            };
        }

        let slot = if let Some(slot) = self.free.pop() {
            self.slots[slot as usize].target = Some(entity_id);
            slot
        } else {
            self.slots.push(Slot {
                generation: 1,
                target: Some(entity_id),
            });
            (self.slots.len() - 1) as u32
        };

        self.by_entity.insert(entity_id, slot);
        Handle {
            slot,
            generation: self.slots[slot as usize].generation,
        }
    }

    /// Resolve a handle to its entity id, or `None` if the handle is stale or
    /// the slot is tombstoned.
    pub fn resolve(&self, handle: Handle) -> Option<EntityId> {
        let slot = self.slots.get(handle.slot as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.target
    }

    /// Tombstone the slot for a destroyed entity and bump its generation so
    /// outstanding handles fail to resolve.
    pub fn invalidate(&mut self, entity_id: EntityId) {
        let Some(slot) = self.by_entity.remove(&entity_id) else {
            return;
        };
        let entry = &mut self.slots[slot as usize];
        entry.target = None;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(slot);
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.by_entity.clear();
        self.free.clear();
    }
}
