use serde::{Deserialize, Serialize};

use crate::error::{RedirectionError, RedirectionResult};

/// Tuning knobs for choosing and sizing a redirection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RedirectionControl {
    /// Sparse storage is chosen while allocated blocks hold at least `1 / maximum_overhead` live
    /// keys.
    pub maximum_overhead: f64,
    pub allow_sparse_redirection: bool,
    /// Static, non-flat tables fall back to an inverse lookup above this sparse overhead.
    pub max_static_sparse_memory_overhead: f64,
    pub initial_hash_capacity: usize,
}

impl Default for RedirectionControl {
    fn default() -> Self {
        Self {
            maximum_overhead: 4.0,
            allow_sparse_redirection: true,
            max_static_sparse_memory_overhead: 1.1,
            initial_hash_capacity: 1024,
        }
    }
}

impl RedirectionControl {
    pub fn validate(&self) -> RedirectionResult<()> {
        check_ratio("maximumOverhead", self.maximum_overhead)?;
        check_ratio(
            "maxStaticSparseMemoryOverhead",
            self.max_static_sparse_memory_overhead,
        )
    }
}

fn check_ratio(name: &str, value: f64) -> RedirectionResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(RedirectionError::InvalidControl(format!(
            "{name} must be a positive finite ratio, got {value}"
        )))
    }
}
