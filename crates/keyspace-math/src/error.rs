use crate::value::ValueType;

pub type MathResult<T> = Result<T, MathError>;

/// Structural mistakes in a factory request. Always raised at construction time, never while
/// evaluating values.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    #[error("primitive types are not supported here: {0}")]
    PrimitiveLeaf(ValueType),

    #[error("deep traversal over an `any` leaf is not supported: {0}")]
    DeepAnyLeaf(ValueType),

    #[error("leaf type is not comparable: {0}")]
    NotComparable(ValueType),

    #[error("only array types can be copied: {0}")]
    NotAnArray(ValueType),

    #[error("a leaf function requires a deep copy: {0}")]
    LeafFunctionRequiresDeep(ValueType),

    #[error("deep copy of {0} requires a leaf function")]
    MissingLeafFunction(ValueType),
}
