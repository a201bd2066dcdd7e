use crate::error::{RedirectionError, RedirectionResult};

/// Largest valid outer row key. Keys are non-negative signed 64-bit values.
pub const MAX_ROW_KEY: u64 = i64::MAX as u64;

/// An ordered set of outer row keys, stored as sorted, disjoint, non-adjacent inclusive ranges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowSet {
    ranges: Vec<(u64, u64)>,
    size: u64,
}

impl RowSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The keys `0..size`.
    pub fn flat(size: u64) -> Self {
        match size {
            0 => Self::new(),
            _ => Self {
                ranges: vec![(0, size - 1)],
                size,
            },
        }
    }

    pub fn from_range(start: u64, end: u64) -> RedirectionResult<Self> {
        let mut row_set = Self::new();
        row_set.insert_range(start, end)?;
        Ok(row_set)
    }

    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Whether the keys are exactly `0..len()`.
    pub fn is_flat(&self) -> bool {
        match self.ranges.as_slice() {
            [] => true,
            [(start, _)] => *start == 0,
            _ => false,
        }
    }

    pub fn first_key(&self) -> Option<u64> {
        self.ranges.first().map(|&(start, _)| start)
    }

    pub fn last_key(&self) -> Option<u64> {
        self.ranges.last().map(|&(_, end)| end)
    }

    pub fn ranges(&self) -> &[(u64, u64)] {
        &self.ranges
    }

    pub fn contains(&self, key: u64) -> bool {
        let idx = self.ranges.partition_point(|&(_, end)| end < key);
        self.ranges
            .get(idx)
            .is_some_and(|&(start, _)| start <= key)
    }

    /// Position of `key` within the set.
    pub fn find(&self, key: u64) -> Option<u64> {
        let mut offset = 0;
        for &(start, end) in &self.ranges {
            if key < start {
                return None;
            }
            if key <= end {
                return Some(offset + (key - start));
            }
            offset += end - start + 1;
        }
        None
    }

    /// The key at `position`.
    pub fn get(&self, position: u64) -> Option<u64> {
        let mut remaining = position;
        for &(start, end) in &self.ranges {
            let len = end - start + 1;
            if remaining < len {
                return Some(start + remaining);
            }
            remaining -= len;
        }
        None
    }

    pub fn insert(&mut self, key: u64) {
        self.insert_bounded(key, key);
    }

    /// Inserts `[start, end]`. Ranges reaching past [`MAX_ROW_KEY`] are rejected.
    pub fn insert_range(&mut self, start: u64, end: u64) -> RedirectionResult<()> {
        if start > end || end > MAX_ROW_KEY {
            return Err(RedirectionError::InvalidRange { start, end });
        }
        self.insert_bounded(start, end);
        Ok(())
    }

    fn insert_bounded(&mut self, start: u64, end: u64) {
        // First range that touches or follows `start`.
        let first = self
            .ranges
            .partition_point(|&(_, e)| e.saturating_add(1) < start);
        let mut last = first;
        let mut merged = (start, end);
        while let Some(&(s, e)) = self.ranges.get(last) {
            if s > end.saturating_add(1) {
                break;
            }
            merged = (merged.0.min(s), merged.1.max(e));
            self.size -= e - s + 1;
            last += 1;
        }
        self.size += merged.1 - merged.0 + 1;
        self.ranges.splice(first..last, [merged]);
    }

    pub fn remove(&mut self, key: u64) {
        self.remove_bounded(key, key);
    }

    pub fn remove_range(&mut self, start: u64, end: u64) -> RedirectionResult<()> {
        if start > end {
            return Err(RedirectionError::InvalidRange { start, end });
        }
        self.remove_bounded(start, end);
        Ok(())
    }

    fn remove_bounded(&mut self, start: u64, end: u64) {
        let first = self.ranges.partition_point(|&(_, e)| e < start);
        let mut last = first;
        let mut kept = Vec::with_capacity(2);
        while let Some(&(s, e)) = self.ranges.get(last) {
            if s > end {
                break;
            }
            self.size -= e - s + 1;
            if s < start {
                kept.push((s, start - 1));
            }
            if e > end {
                kept.push((end + 1, e));
            }
            last += 1;
        }
        for &(s, e) in &kept {
            self.size += e - s + 1;
        }
        self.ranges.splice(first..last, kept);
    }

    pub fn insert_all(&mut self, other: &RowSet) {
        for &(start, end) in &other.ranges {
            self.insert_bounded(start, end);
        }
    }

    pub fn remove_all(&mut self, other: &RowSet) {
        for &(start, end) in &other.ranges {
            self.remove_bounded(start, end);
        }
    }

    /// `self \ other`.
    pub fn minus(&self, other: &RowSet) -> RowSet {
        let mut result = self.clone();
        result.remove_all(other);
        result
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = u64> + '_ {
        self.ranges.iter().flat_map(|&(start, end)| start..=end)
    }

    /// Keys in `[start, end]`, ascending.
    pub fn keys_in(&self, start: u64, end: u64) -> impl Iterator<Item = u64> + '_ {
        self.clamped(start, end).flat_map(|(s, e)| s..=e)
    }

    /// Keys in `[start, end]`, descending.
    pub fn keys_in_rev(&self, start: u64, end: u64) -> impl Iterator<Item = u64> + '_ {
        self.clamped(start, end).rev().flat_map(|(s, e)| (s..=e).rev())
    }

    fn clamped(
        &self,
        start: u64,
        end: u64,
    ) -> impl DoubleEndedIterator<Item = (u64, u64)> + '_ {
        let first = self.ranges.partition_point(|&(_, e)| e < start);
        let last = self.ranges.partition_point(|&(s, _)| s <= end);
        let window: &[(u64, u64)] = if first < last && start <= end {
            &self.ranges[first..last]
        } else {
            &[]
        };
        window
            .iter()
            .map(move |&(s, e)| (s.max(start), e.min(end)))
    }
}

impl FromIterator<u64> for RowSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut row_set = RowSet::new();
        for key in iter {
            row_set.insert(key);
        }
        row_set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_merges_adjacent_and_overlapping_ranges() {
        let mut row_set = RowSet::new();
        row_set.insert_range(10, 12).unwrap();
        row_set.insert_range(20, 25).unwrap();
        row_set.insert(13);
        assert_eq!(row_set.ranges(), &[(10, 13), (20, 25)]);
        row_set.insert_range(11, 21).unwrap();
        assert_eq!(row_set.ranges(), &[(10, 25)]);
        assert_eq!(row_set.len(), 16);
    }

    #[test]
    fn remove_splits_ranges() {
        let mut row_set = RowSet::from_range(0, 9).unwrap();
        row_set.remove_range(3, 5).unwrap();
        row_set.remove(9);
        assert_eq!(row_set.ranges(), &[(0, 2), (6, 8)]);
        assert_eq!(row_set.len(), 6);
        assert!(!row_set.is_flat());
        assert_eq!(row_set.find(6), Some(3));
        assert_eq!(row_set.get(3), Some(6));
        assert_eq!(row_set.find(4), None);
    }

    #[test]
    fn bounded_iteration_in_both_directions() {
        let row_set: RowSet = [1, 2, 3, 7, 8, 20].into_iter().collect();
        assert_eq!(row_set.keys_in(2, 8).collect::<Vec<_>>(), vec![2, 3, 7, 8]);
        assert_eq!(row_set.keys_in_rev(2, 8).collect::<Vec<_>>(), vec![8, 7, 3, 2]);
        assert_eq!(row_set.keys_in(9, 19).count(), 0);
        assert_eq!(row_set.keys_in(8, 2).count(), 0);
    }

    #[test]
    fn invalid_range_is_rejected() {
        assert_eq!(
            RowSet::from_range(5, 4),
            Err(RedirectionError::InvalidRange { start: 5, end: 4 })
        );
    }

    #[test]
    fn ranges_touching_max_row_key() {
        let mut row_set = RowSet::from_range(MAX_ROW_KEY - 1, MAX_ROW_KEY).unwrap();
        row_set.insert(MAX_ROW_KEY - 2);
        assert_eq!(row_set.ranges(), &[(MAX_ROW_KEY - 2, MAX_ROW_KEY)]);
        row_set.remove(MAX_ROW_KEY);
        assert_eq!(row_set.last_key(), Some(MAX_ROW_KEY - 1));
    }

    #[test]
    fn whole_key_space_is_one_valid_range() {
        let row_set = RowSet::from_range(0, MAX_ROW_KEY).unwrap();
        assert_eq!(row_set.len(), MAX_ROW_KEY + 1);
        assert!(row_set.is_flat());
        assert_eq!(row_set.find(MAX_ROW_KEY), Some(MAX_ROW_KEY));
        assert_eq!(row_set.get(MAX_ROW_KEY), Some(MAX_ROW_KEY));

        assert_eq!(
            RowSet::from_range(0, u64::MAX),
            Err(RedirectionError::InvalidRange {
                start: 0,
                end: u64::MAX
            })
        );
        let mut row_set = RowSet::new();
        assert!(row_set.insert_range(MAX_ROW_KEY, MAX_ROW_KEY + 1).is_err());
        assert!(row_set.is_empty());
    }
}
