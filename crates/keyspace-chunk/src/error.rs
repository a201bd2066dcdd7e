use crate::chunk::ChunkType;
use keyspace_math::MathError;

pub type ChunkResult<T> = Result<T, ChunkError>;

/// Caller contract violations. Inputs are never truncated to make an operation fit.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ChunkError {
    #[error("chunk length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("destination too small: need {required} slots, capacity is {capacity}")]
    DestinationTooSmall { required: usize, capacity: usize },

    #[error("chunk type mismatch: expected {expected:?}, got {actual:?}")]
    TypeMismatch { expected: ChunkType, actual: ChunkType },

    #[error("position {position} out of bounds for chunk of size {size}")]
    PositionOutOfBounds { position: usize, size: usize },

    #[error("size {size} exceeds chunk capacity {capacity}")]
    SizeExceedsCapacity { size: usize, capacity: usize },

    #[error("pair positions must come in pairs, got {0} positions")]
    OddPairPositions(usize),

    #[error(transparent)]
    Math(#[from] MathError),
}
