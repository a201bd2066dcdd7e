//! Outer row key to inner slot redirection.
//!
//! A [`RowRedirection`] maps a sparse, shifting outer key space onto dense inner slots that
//! index column storage. [`RedirectionStrategySelector`] picks the backing representation for
//! that mapping from the shape of the table.

#![forbid(unsafe_code)]

mod control;
mod error;
mod inverse;
mod redirection;
mod row_set;
mod selector;
mod shift;
mod store;
mod update;

pub use crate::control::RedirectionControl;
pub use crate::error::{RedirectionError, RedirectionResult};
pub use crate::inverse::InverseRowRedirection;
pub use crate::redirection::RowRedirection;
pub use crate::row_set::{RowSet, MAX_ROW_KEY};
pub use crate::selector::{
    select_for_update_by, select_redirection_type, sparse_structure_exceeds_overhead,
    RedirectionPlan, RedirectionStrategySelector, RedirectionType, MAX_CONTIGUOUS_SIZE,
};
pub use crate::shift::{Shift, ShiftData, ShiftDataBuilder};
pub use crate::store::{
    BackingStore, DenseStore, HashStore, RedirectionStorage, SparseBlockStore, BLOCK_SIZE,
    LOG_BLOCK_SIZE, NULL_ROW_KEY,
};
pub use crate::update::TableUpdate;
