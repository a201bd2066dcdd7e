use crate::row_set::RowSet;
use crate::store::NULL_ROW_KEY;

/// Read-only redirection of a static table: an outer key maps to its position in the row set.
#[derive(Clone, Debug)]
pub struct InverseRowRedirection {
    row_set: RowSet,
    /// Position of the first key of each range.
    offsets: Vec<u64>,
}

impl InverseRowRedirection {
    pub fn new(row_set: RowSet) -> Self {
        let offsets = row_set
            .ranges()
            .iter()
            .scan(0u64, |next, &(start, end)| {
                let offset = *next;
                *next += end - start + 1;
                Some(offset)
            })
            .collect();
        Self { row_set, offsets }
    }

    pub fn row_set(&self) -> &RowSet {
        &self.row_set
    }

    pub fn get(&self, outer: u64) -> Option<u64> {
        let ranges = self.row_set.ranges();
        let idx = ranges.partition_point(|&(_, end)| end < outer);
        let &(start, _) = ranges.get(idx)?;
        (start <= outer).then(|| self.offsets[idx] + (outer - start))
    }

    pub fn get_or_null(&self, outer: u64) -> u64 {
        self.get(outer).unwrap_or(NULL_ROW_KEY)
    }

    pub fn len(&self) -> u64 {
        self.row_set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_set.is_empty()
    }
}
