use crate::row_set::RowSet;
use crate::shift::ShiftData;

/// One upstream update cycle: keys added, keys removed, and keys moved.
///
/// `removed` is expressed in the previous key space; `added` in the new key space after shifts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableUpdate {
    pub added: RowSet,
    pub removed: RowSet,
    pub shifted: ShiftData,
}

impl TableUpdate {
    pub fn new(added: RowSet, removed: RowSet, shifted: ShiftData) -> Self {
        Self {
            added,
            removed,
            shifted,
        }
    }

    pub fn added(added: RowSet) -> Self {
        Self {
            added,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.shifted.is_empty()
    }

    /// Applies this update to the key set it was produced against.
    pub fn apply_to(&self, prev_row_set: &RowSet) -> RowSet {
        let mut next = self.shifted.apply_to(&prev_row_set.minus(&self.removed));
        next.insert_all(&self.added);
        next
    }
}
