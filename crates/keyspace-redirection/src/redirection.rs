use std::collections::BTreeSet;

use crate::error::RedirectionResult;
use crate::row_set::RowSet;
use crate::selector::RedirectionType;
use crate::shift::check_shift;
use crate::store::{BackingStore, RedirectionStorage, NULL_ROW_KEY};
use crate::update::TableUpdate;

/// Maps outer row keys onto dense inner slots, reusing freed slots before allocating new ones.
///
/// Slots are never renumbered: removing a key returns its slot to the free pool and leaves the
/// high-water mark alone, so every other live mapping stays valid. Callers size their column
/// storage from [`required_capacity`](Self::required_capacity) before writing to a slot
/// returned by [`add`](Self::add).
#[derive(Clone, Debug)]
pub struct RowRedirection<S = RedirectionStorage> {
    store: S,
    free: BTreeSet<u64>,
    next_slot: u64,
}

impl RowRedirection<RedirectionStorage> {
    pub fn with_type(ty: RedirectionType, initial_capacity: usize) -> Self {
        Self::new(RedirectionStorage::for_type(ty, initial_capacity))
    }

    pub fn redirection_type(&self) -> RedirectionType {
        self.store.redirection_type()
    }
}

impl<S: BackingStore> RowRedirection<S> {
    pub fn new(mut store: S) -> Self {
        store.clear();
        Self {
            store,
            free: BTreeSet::new(),
            next_slot: 0,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn get(&self, outer: u64) -> Option<u64> {
        match self.store.get(outer) {
            NULL_ROW_KEY => None,
            inner => Some(inner),
        }
    }

    /// Like [`get`](Self::get), but answers [`NULL_ROW_KEY`] for an unmapped key.
    pub fn get_or_null(&self, outer: u64) -> u64 {
        self.store.get(outer)
    }

    /// Maps `outer` to a slot and returns it. A key that is already mapped keeps its slot.
    ///
    /// Returns [`NULL_ROW_KEY`] if the store cannot address `outer`; no slot is consumed then.
    pub fn add(&mut self, outer: u64) -> u64 {
        if let Some(existing) = self.get(outer) {
            log::warn!("outer key {outer} is already redirected to slot {existing}");
            return existing;
        }
        let slot = self.allocate();
        self.store.set(outer, slot);
        if self.store.get(outer) != slot {
            self.release(slot);
            return NULL_ROW_KEY;
        }
        slot
    }

    /// Drops the mapping for `outer`, returning its slot to the free pool. Unmapped keys are
    /// ignored.
    pub fn remove(&mut self, outer: u64) -> Option<u64> {
        match self.store.remove(outer) {
            NULL_ROW_KEY => None,
            slot => {
                self.free.insert(slot);
                Some(slot)
            }
        }
    }

    /// Re-keys every mapped key of `candidates` within `[start, end]` to `key + delta`.
    ///
    /// Keys are visited ascending for a negative delta and descending otherwise, so a key is
    /// never overwritten by a neighbour moving in the same pass. Candidates without a mapping
    /// are skipped.
    pub fn shift(
        &mut self,
        candidates: &RowSet,
        start: u64,
        end: u64,
        delta: i64,
    ) -> RedirectionResult<()> {
        check_shift(start, end, delta)?;
        self.shift_candidates(candidates, start, end, delta);
        Ok(())
    }

    fn shift_candidates(&mut self, candidates: &RowSet, start: u64, end: u64, delta: i64) {
        if delta == 0 {
            return;
        }
        if delta < 0 {
            for key in candidates.keys_in(start, end) {
                self.shift_key(key, delta);
            }
        } else {
            for key in candidates.keys_in_rev(start, end) {
                self.shift_key(key, delta);
            }
        }
    }

    fn shift_key(&mut self, key: u64, delta: i64) {
        let inner = self.store.remove(key);
        if inner == NULL_ROW_KEY {
            return;
        }
        let dest = key.saturating_add_signed(delta);
        let displaced = self.store.get(dest);
        if displaced != NULL_ROW_KEY {
            log::warn!("shift of outer key {key} to {dest} displaced slot {displaced}");
            self.free.insert(displaced);
        }
        self.store.set(dest, inner);
    }

    /// Applies one update: removes, then shifts over `prev_row_set \ removed`, then adds.
    ///
    /// `prev_row_set` is the key set the update was produced against.
    pub fn apply_update(&mut self, update: &TableUpdate, prev_row_set: &RowSet) {
        for key in update.removed.iter() {
            self.remove(key);
        }
        if !update.shifted.is_empty() {
            let candidates = prev_row_set.minus(&update.removed);
            update
                .shifted
                .apply(|start, end, delta| self.shift_candidates(&candidates, start, end, delta));
        }
        for key in update.added.iter() {
            self.add(key);
        }
        log::trace!(
            "redirection update: removed={} shifts={} added={} live={} free={} required_capacity={}",
            update.removed.len(),
            update.shifted.len(),
            update.added.len(),
            self.len(),
            self.free.len(),
            self.next_slot
        );
    }

    fn allocate(&mut self) -> u64 {
        if let Some(slot) = self.free.pop_first() {
            return slot;
        }
        let slot = self.next_slot;
        self.next_slot += 1;
        slot
    }

    fn release(&mut self, slot: u64) {
        if slot + 1 == self.next_slot {
            self.next_slot = slot;
        } else {
            self.free.insert(slot);
        }
    }

    /// Highest slot ever handed out.
    pub fn max_inner_index(&self) -> Option<u64> {
        self.next_slot.checked_sub(1)
    }

    /// Capacity column storage needs to hold every slot handed out so far.
    pub fn required_capacity(&self) -> u64 {
        self.next_slot
    }

    pub fn free_slots(&self) -> impl Iterator<Item = u64> + '_ {
        self.free.iter().copied()
    }

    pub fn free_slot_count(&self) -> usize {
        self.free.len()
    }

    /// Number of mapped outer keys.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
