//! Array copy factories.
//!
//! A shallow copy produces a new top-level array that shares its elements with the source. A deep
//! copy recreates every nested array; generic leaves are passed through a caller-supplied leaf
//! function. Nulls are preserved as nulls at every level.

use crate::error::{MathError, MathResult};
use crate::nested::Traversal;
use crate::value::{LeafKind, PrimitiveElement, Value, ValueType};
use std::sync::Arc;

pub type CopyFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

pub fn copy(ty: ValueType) -> MathResult<CopyFn> {
    copy_fn(ty, Traversal::Shallow, None)
}

pub fn deep_copy(ty: ValueType) -> MathResult<CopyFn> {
    copy_fn(ty, Traversal::Deep, None)
}

pub fn deep_copy_with(ty: ValueType, leaf: CopyFn) -> MathResult<CopyFn> {
    copy_fn(ty, Traversal::Deep, Some(leaf))
}

/// Deep copy of the array structure that keeps generic leaves as they are.
pub fn deep_copy_shallow_leaf(ty: ValueType) -> MathResult<CopyFn> {
    deep_copy_with(ty, Arc::new(|leaf: &Value| leaf.clone()))
}

pub fn copy_fn(ty: ValueType, traversal: Traversal, leaf: Option<CopyFn>) -> MathResult<CopyFn> {
    if !ty.is_array() {
        return Err(MathError::NotAnArray(ty));
    }
    if leaf.is_some() {
        if traversal == Traversal::Shallow {
            return Err(MathError::LeafFunctionRequiresDeep(ty));
        }
        if ty.leaf().is_primitive() {
            return Err(MathError::PrimitiveLeaf(ty));
        }
    }
    copy_for(ty, traversal, leaf)
}

fn copy_for(ty: ValueType, traversal: Traversal, leaf: Option<CopyFn>) -> MathResult<CopyFn> {
    match (ty.depth(), ty.leaf()) {
        (0, _) => leaf.ok_or(MathError::MissingLeafFunction(ty)),
        (1, LeafKind::Primitive(kind)) => {
            Ok(crate::dispatch_primitive!(kind, T => primitive_array_copy::<T>()))
        }
        (depth, leaf_kind) => match traversal {
            Traversal::Shallow => Ok(shallow_array_copy()),
            Traversal::Deep => {
                let element = copy_for(ValueType::array(leaf_kind, depth - 1), traversal, leaf)?;
                Ok(deep_array_copy(element))
            }
        },
    }
}

fn primitive_array_copy<T: PrimitiveElement>() -> CopyFn {
    Arc::new(|value: &Value| match T::slice(value) {
        Some(values) => T::wrap(Arc::from(values)),
        None => value.clone(),
    })
}

fn shallow_array_copy() -> CopyFn {
    Arc::new(|value: &Value| match value {
        Value::Array(values) => Value::Array(Arc::from(&values[..])),
        other => other.clone(),
    })
}

fn deep_array_copy(element: CopyFn) -> CopyFn {
    Arc::new(move |value: &Value| match value {
        Value::Array(values) => Value::Array(
            values
                .iter()
                .map(|v| if v.is_null() { Value::Null } else { element(v) })
                .collect(),
        ),
        other => other.clone(),
    })
}
