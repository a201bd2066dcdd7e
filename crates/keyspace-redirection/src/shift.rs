use crate::error::{RedirectionError, RedirectionResult};
use crate::row_set::{RowSet, MAX_ROW_KEY};

/// Every key in `[start, end]` moves by `delta`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shift {
    pub start: u64,
    pub end: u64,
    pub delta: i64,
}

impl Shift {
    fn shifted_start(&self) -> u64 {
        self.start.saturating_add_signed(self.delta)
    }

    fn shifted_end(&self) -> u64 {
        self.end.saturating_add_signed(self.delta)
    }

    fn contains(&self, key: u64) -> bool {
        self.start <= key && key <= self.end
    }
}

/// Sorted, non-overlapping shifts for one update. Built through [`ShiftDataBuilder`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShiftData {
    shifts: Vec<Shift>,
}

impl ShiftData {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> ShiftDataBuilder {
        ShiftDataBuilder::default()
    }

    pub fn is_empty(&self) -> bool {
        self.shifts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.shifts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shift> + '_ {
        self.shifts.iter()
    }

    /// Calls `f(start, end, delta)` for every shift in an order that never moves a key onto one
    /// that has yet to move.
    ///
    /// Shifts are grouped into runs of equal sign: negative runs are visited front to back,
    /// positive runs back to front.
    pub fn apply(&self, mut f: impl FnMut(u64, u64, i64)) {
        let mut run_start = 0;
        while run_start < self.shifts.len() {
            let positive = self.shifts[run_start].delta > 0;
            let run_end = self.shifts[run_start..]
                .iter()
                .position(|shift| (shift.delta > 0) != positive)
                .map_or(self.shifts.len(), |len| run_start + len);
            let run = &self.shifts[run_start..run_end];
            if positive {
                run.iter()
                    .rev()
                    .for_each(|shift| f(shift.start, shift.end, shift.delta));
            } else {
                run.iter()
                    .for_each(|shift| f(shift.start, shift.end, shift.delta));
            }
            run_start = run_end;
        }
    }

    /// Where `key` ends up after this update.
    pub fn shift_key(&self, key: u64) -> u64 {
        let idx = self.shifts.partition_point(|shift| shift.end < key);
        match self.shifts.get(idx) {
            Some(shift) if shift.contains(key) => key.saturating_add_signed(shift.delta),
            _ => key,
        }
    }

    /// The row set after moving every key of `row_set`.
    pub fn apply_to(&self, row_set: &RowSet) -> RowSet {
        if self.is_empty() {
            return row_set.clone();
        }
        row_set.iter().map(|key| self.shift_key(key)).collect()
    }
}

/// Rejects an inverted range, or one that starts or ends outside `[0, MAX_ROW_KEY]` before or
/// after moving by `delta`.
pub(crate) fn check_shift(start: u64, end: u64, delta: i64) -> RedirectionResult<()> {
    let invalid = |reason| RedirectionError::InvalidShift {
        start,
        end,
        delta,
        reason,
    };
    if start > end {
        return Err(invalid("start is after end"));
    }
    let in_key_space = |key: Option<u64>| key.is_some_and(|key| key <= MAX_ROW_KEY);
    if !in_key_space(Some(end))
        || !in_key_space(start.checked_add_signed(delta))
        || !in_key_space(end.checked_add_signed(delta))
    {
        return Err(invalid("shifted keys leave the key space"));
    }
    Ok(())
}

/// Validating builder for [`ShiftData`].
///
/// Shifts must be added in ascending order of `start`, must not overlap, must keep every key
/// within `[0, MAX_ROW_KEY]`, and must keep the relative order of the keys they move. Zero deltas
/// are dropped; adjacent ranges with the same delta are coalesced.
#[derive(Clone, Debug, Default)]
pub struct ShiftDataBuilder {
    shifts: Vec<Shift>,
}

impl ShiftDataBuilder {
    pub fn shift_range(&mut self, start: u64, end: u64, delta: i64) -> RedirectionResult<&mut Self> {
        check_shift(start, end, delta)?;
        if delta == 0 {
            return Ok(self);
        }
        let invalid = |reason| RedirectionError::InvalidShift {
            start,
            end,
            delta,
            reason,
        };
        let shift = Shift { start, end, delta };
        if let Some(prev) = self.shifts.last_mut() {
            if start <= prev.end {
                return Err(invalid("overlaps or precedes the previous shift"));
            }
            if shift.shifted_start() <= prev.shifted_end() {
                return Err(invalid("reorders keys of the previous shift"));
            }
            if prev.delta == delta && prev.end + 1 == start {
                prev.end = end;
                return Ok(self);
            }
        }
        self.shifts.push(shift);
        Ok(self)
    }

    pub fn build(self) -> ShiftData {
        ShiftData {
            shifts: self.shifts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn visit_order(data: &ShiftData) -> Vec<(u64, u64, i64)> {
        let mut order = Vec::new();
        data.apply(|start, end, delta| order.push((start, end, delta)));
        order
    }

    #[test]
    fn apply_visits_positive_runs_backwards() {
        let mut builder = ShiftData::builder();
        builder
            .shift_range(10, 19, -5)
            .unwrap()
            .shift_range(20, 29, -3)
            .unwrap()
            .shift_range(40, 49, 2)
            .unwrap()
            .shift_range(50, 59, 4)
            .unwrap()
            .shift_range(70, 79, -1)
            .unwrap();
        let data = builder.build();
        assert_eq!(
            visit_order(&data),
            vec![
                (10, 19, -5),
                (20, 29, -3),
                (50, 59, 4),
                (40, 49, 2),
                (70, 79, -1),
            ]
        );
    }

    #[test]
    fn builder_coalesces_and_validates() {
        let mut builder = ShiftData::builder();
        builder
            .shift_range(0, 4, 3)
            .unwrap()
            .shift_range(5, 9, 3)
            .unwrap()
            .shift_range(10, 12, 0)
            .unwrap();
        assert!(builder.shift_range(8, 20, 3).is_err());
        let data = builder.build();
        assert_eq!(data.len(), 1);
        assert_eq!(data.shift_key(9), 12);
        assert_eq!(data.shift_key(11), 11);

        let mut builder = ShiftData::builder();
        assert!(builder.shift_range(0, 3, -1).is_err());
        builder.shift_range(10, 12, 5).unwrap();
        assert_eq!(
            builder.shift_range(13, 14, 1).err(),
            Some(RedirectionError::InvalidShift {
                start: 13,
                end: 14,
                delta: 1,
                reason: "reorders keys of the previous shift"
            })
        );
    }

    #[test]
    fn shifts_stay_within_row_keys() {
        let mut builder = ShiftData::builder();
        assert!(builder.shift_range(0, MAX_ROW_KEY, 1).is_err());
        assert!(builder.shift_range(MAX_ROW_KEY, u64::MAX, -1).is_err());
        assert!(builder.shift_range(10, 20, i64::MAX).is_err());
        builder.shift_range(1, MAX_ROW_KEY, -1).unwrap();
        assert_eq!(builder.build().shift_key(MAX_ROW_KEY), MAX_ROW_KEY - 1);
    }

    #[test]
    fn apply_to_moves_row_set() {
        let mut builder = ShiftData::builder();
        builder.shift_range(5, 9, 10).unwrap();
        let row_set: RowSet = [1, 5, 6, 20].into_iter().collect();
        let shifted = builder.build().apply_to(&row_set);
        assert_eq!(shifted.iter().collect::<Vec<_>>(), vec![1, 15, 16, 20]);
    }
}
