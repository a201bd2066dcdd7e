//! Consistent equality, hashing and ordering for join, group-by and dedup keys.
//!
//! - [`scalar`]: per-semantics math for every primitive scalar.
//! - [`sequence`]: whole-sequence and ranged operations derived from a scalar math.
//! - [`nested`]: closures for arbitrarily nested arrays, shallow or deep.
//! - [`copy`]: shallow and deep array copies.

#![forbid(unsafe_code)]

pub mod copy;
mod error;
pub mod nested;
pub mod scalar;
pub mod sequence;
mod value;

pub use crate::copy::CopyFn;
pub use crate::error::{MathError, MathResult};
pub use crate::nested::{
    build_comparator, build_equals, build_hasher, CompareFn, EqualsFn, HashFn, NestedMath,
    Traversal,
};
pub use crate::scalar::{
    BitwiseMath, CanonicalMath, ConsistentMath, NativeMath, ScalarMath, Semantics, WithMath,
    BITWISE, CANONICAL, NATIVE,
};
pub use crate::sequence::SequenceMath;
pub use crate::value::{LeafKind, PrimitiveElement, PrimitiveKind, Value, ValueType};
