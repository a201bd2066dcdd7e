use std::fmt;

use serde::{Deserialize, Serialize};

use crate::control::RedirectionControl;
use crate::error::RedirectionResult;
use crate::inverse::InverseRowRedirection;
use crate::redirection::RowRedirection;
use crate::row_set::RowSet;
use crate::store::{BLOCK_SIZE, LOG_BLOCK_SIZE};

/// Largest flat table that may be addressed by a contiguous store.
pub const MAX_CONTIGUOUS_SIZE: u64 = i32::MAX as u64;

/// Storage representation for an outer-to-inner mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RedirectionType {
    Contiguous,
    Sparse,
    Hash,
}

impl fmt::Display for RedirectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Contiguous => "contiguous",
            Self::Sparse => "sparse",
            Self::Hash => "hash",
        })
    }
}

/// Whether sparse block storage for `row_set` would allocate more than `maximum_overhead` times
/// the blocks a perfectly packed key space needs.
pub fn sparse_structure_exceeds_overhead(row_set: &RowSet, maximum_overhead: f64) -> bool {
    let required_blocks = row_set.len().div_ceil(BLOCK_SIZE);
    let acceptable_blocks = (maximum_overhead * required_blocks as f64).floor() as u64;

    let mut used_blocks = 0u64;
    let mut last_block = None;
    for &(start, end) in row_set.ranges() {
        let start_block = start >> LOG_BLOCK_SIZE;
        let end_block = end >> LOG_BLOCK_SIZE;
        used_blocks += end_block - start_block;
        if last_block != Some(start_block) {
            used_blocks += 1;
        }
        if used_blocks > acceptable_blocks {
            return true;
        }
        last_block = Some(end_block);
    }
    false
}

/// Chooses the storage for redirecting a table of `size` rows.
///
/// A flat table that fits contiguous addressing gets `Contiguous` when static and `Sparse` when
/// refreshing. Otherwise `Sparse` wins while its block overhead stays within
/// `maximum_overhead`, and `Hash` is the fallback.
pub fn select_redirection_type(
    size: u64,
    is_flat: bool,
    is_refreshing: bool,
    row_set: &RowSet,
    maximum_overhead: f64,
    allow_sparse: bool,
) -> RedirectionType {
    let selected = if is_flat && size < MAX_CONTIGUOUS_SIZE {
        if is_refreshing {
            RedirectionType::Sparse
        } else {
            RedirectionType::Contiguous
        }
    } else if allow_sparse && !sparse_structure_exceeds_overhead(row_set, maximum_overhead) {
        RedirectionType::Sparse
    } else {
        RedirectionType::Hash
    };
    log::debug!(
        "selected {selected} redirection (size={size}, flat={is_flat}, refreshing={is_refreshing}, \
         maximum_overhead={maximum_overhead}, allow_sparse={allow_sparse})"
    );
    selected
}

/// The redirection an incremental operator should carry for its source table.
#[derive(Clone, Debug)]
pub enum RedirectionPlan {
    Inverse(InverseRowRedirection),
    Writable(RowRedirection),
}

/// [`select_redirection_type`] driven by a validated [`RedirectionControl`].
#[derive(Clone, Debug, Default)]
pub struct RedirectionStrategySelector {
    control: RedirectionControl,
}

impl RedirectionStrategySelector {
    pub fn new(control: RedirectionControl) -> RedirectionResult<Self> {
        control.validate()?;
        Ok(Self { control })
    }

    pub fn control(&self) -> &RedirectionControl {
        &self.control
    }

    pub fn select(&self, row_set: &RowSet, is_refreshing: bool) -> RedirectionType {
        select_redirection_type(
            row_set.len(),
            row_set.is_flat(),
            is_refreshing,
            row_set,
            self.control.maximum_overhead,
            self.control.allow_sparse_redirection,
        )
    }

    /// An empty writable redirection for `row_set` using the selected storage.
    pub fn redirection_for(&self, row_set: &RowSet, is_refreshing: bool) -> RowRedirection {
        let ty = self.select(row_set, is_refreshing);
        RowRedirection::with_type(ty, self.initial_capacity(row_set))
    }

    /// Redirection policy for cumulative operators.
    ///
    /// A static table keeps its own keys unless it is non-flat and too sparse for block
    /// storage, in which case positions are looked up through an inverse redirection. A
    /// refreshing table gets a writable redirection that never uses contiguous storage.
    pub fn plan_for_update_by(
        &self,
        row_set: &RowSet,
        is_refreshing: bool,
    ) -> Option<RedirectionPlan> {
        if !is_refreshing {
            let too_sparse = !row_set.is_flat()
                && sparse_structure_exceeds_overhead(
                    row_set,
                    self.control.max_static_sparse_memory_overhead,
                );
            log::debug!("static table of {} rows: inverse redirection={too_sparse}", row_set.len());
            return too_sparse.then(|| RedirectionPlan::Inverse(InverseRowRedirection::new(row_set.clone())));
        }
        let ty = match self.select(row_set, true) {
            RedirectionType::Contiguous => RedirectionType::Sparse,
            other => other,
        };
        Some(RedirectionPlan::Writable(RowRedirection::with_type(
            ty,
            self.initial_capacity(row_set),
        )))
    }

    fn initial_capacity(&self, row_set: &RowSet) -> usize {
        usize::try_from(row_set.len())
            .unwrap_or(usize::MAX)
            .max(self.control.initial_hash_capacity)
    }
}

/// [`RedirectionStrategySelector::plan_for_update_by`] for a one-off control.
pub fn select_for_update_by(
    row_set: &RowSet,
    is_refreshing: bool,
    control: &RedirectionControl,
) -> RedirectionResult<Option<RedirectionPlan>> {
    let selector = RedirectionStrategySelector::new(control.clone())?;
    Ok(selector.plan_for_update_by(row_set, is_refreshing))
}
