//! Equality, hashing and ordering for arbitrarily nested sequences.
//!
//! Factories take a [`ValueType`] and return a ready-to-call closure. All type dispatch happens
//! once, while the closure is built: one-dimensional primitive arrays bind straight to the
//! [`SequenceMath`] of the requested semantics, nested arrays wrap the closure built for their
//! component type.
//!
//! Two traversals exist. [`Traversal::Shallow`] looks one level deep: the elements of a generic
//! array are compared with [`Value::object_equals`], so nested arrays match only when they are the
//! same instance. [`Traversal::Deep`] recurses all the way to the leaves. Deep traversal over an
//! [`LeafKind::Any`] leaf is rejected when the closure is built.

use crate::copy::{self, CopyFn};
use crate::error::{MathError, MathResult};
use crate::scalar::{ConsistentMath, ScalarMath, Semantics, WithMath};
use crate::sequence::SequenceMath;
use crate::value::{LeafKind, PrimitiveElement, Value, ValueType};
use std::cmp::Ordering;
use std::sync::Arc;

pub type EqualsFn = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;
pub type HashFn = Arc<dyn Fn(&Value) -> i32 + Send + Sync>;
pub type CompareFn = Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Traversal {
    #[default]
    Shallow,
    Deep,
}

fn check_traversal(ty: ValueType, traversal: Traversal) -> MathResult<()> {
    if ty.depth() == 0 && ty.leaf().is_primitive() {
        return Err(MathError::PrimitiveLeaf(ty));
    }
    if traversal == Traversal::Deep && ty.leaf() == LeafKind::Any {
        return Err(MathError::DeepAnyLeaf(ty));
    }
    Ok(())
}

fn element_type(ty: ValueType) -> ValueType {
    ValueType::array(ty.leaf(), ty.depth().saturating_sub(1))
}

/// Builds an equality predicate for values of type `ty`.
pub fn build_equals<M: ConsistentMath>(
    math: M,
    ty: ValueType,
    traversal: Traversal,
) -> MathResult<EqualsFn> {
    check_traversal(ty, traversal)?;
    Ok(equals_for(math, ty, traversal))
}

fn equals_for<M: ConsistentMath>(math: M, ty: ValueType, traversal: Traversal) -> EqualsFn {
    match (ty.depth(), ty.leaf()) {
        (0, _) => object_equals(),
        (1, LeafKind::Primitive(kind)) => {
            crate::dispatch_primitive!(kind, T => primitive_array_equals::<T, M>(math))
        }
        _ => {
            let element = match traversal {
                Traversal::Shallow => object_equals(),
                Traversal::Deep => equals_for(math, element_type(ty), traversal),
            };
            generic_array_equals(element)
        }
    }
}

fn object_equals() -> EqualsFn {
    Arc::new(|x: &Value, y: &Value| x.object_equals(y))
}

fn primitive_array_equals<T, M>(math: M) -> EqualsFn
where
    T: PrimitiveElement,
    M: ScalarMath<T> + Send + Sync + 'static,
{
    Arc::new(move |x: &Value, y: &Value| match (T::slice(x), T::slice(y)) {
        (Some(x), Some(y)) => SequenceMath::<T>::equals_slice(&math, x, y),
        _ => x.object_equals(y),
    })
}

fn generic_array_equals(element: EqualsFn) -> EqualsFn {
    Arc::new(move |x: &Value, y: &Value| match (x, y) {
        (Value::Array(xs), Value::Array(ys)) => {
            Arc::ptr_eq(xs, ys)
                || (xs.len() == ys.len() && xs.iter().zip(ys.iter()).all(|(a, b)| element(a, b)))
        }
        _ => x.object_equals(y),
    })
}

/// Builds a hash function consistent with [`build_equals`] for the same arguments.
pub fn build_hasher<M: ConsistentMath>(
    math: M,
    ty: ValueType,
    traversal: Traversal,
) -> MathResult<HashFn> {
    check_traversal(ty, traversal)?;
    Ok(hasher_for(math, ty, traversal))
}

fn hasher_for<M: ConsistentMath>(math: M, ty: ValueType, traversal: Traversal) -> HashFn {
    match (ty.depth(), ty.leaf()) {
        (0, _) => object_hash(),
        (1, LeafKind::Primitive(kind)) => {
            crate::dispatch_primitive!(kind, T => primitive_array_hasher::<T, M>(math))
        }
        _ => {
            let element = match traversal {
                Traversal::Shallow => object_hash(),
                Traversal::Deep => hasher_for(math, element_type(ty), traversal),
            };
            generic_array_hasher(element)
        }
    }
}

fn object_hash() -> HashFn {
    Arc::new(|x: &Value| x.object_hash())
}

fn primitive_array_hasher<T, M>(math: M) -> HashFn
where
    T: PrimitiveElement,
    M: ScalarMath<T> + Send + Sync + 'static,
{
    Arc::new(move |x: &Value| match T::slice(x) {
        Some(x) => SequenceMath::<T>::hash_slice(&math, x),
        None => x.object_hash(),
    })
}

fn generic_array_hasher(element: HashFn) -> HashFn {
    Arc::new(move |x: &Value| match x {
        Value::Array(xs) => xs
            .iter()
            .fold(1i32, |hash, e| hash.wrapping_mul(31).wrapping_add(element(e))),
        _ => x.object_hash(),
    })
}

/// Builds a total order for values of type `ty`. Always recursive.
///
/// Nulls order first. Arrays order by length first, then by the first element the component
/// comparator does not consider equal.
pub fn build_comparator<M: ConsistentMath>(math: M, ty: ValueType) -> MathResult<CompareFn> {
    if !ty.leaf().is_comparable() {
        return Err(MathError::NotComparable(ty));
    }
    if ty.depth() == 0 && ty.leaf().is_primitive() {
        return Err(MathError::PrimitiveLeaf(ty));
    }
    Ok(comparator_for(math, ty))
}

fn comparator_for<M: ConsistentMath>(math: M, ty: ValueType) -> CompareFn {
    match (ty.depth(), ty.leaf()) {
        (0, _) => Arc::new(|x: &Value, y: &Value| x.natural_compare(y)),
        (1, LeafKind::Primitive(kind)) => {
            crate::dispatch_primitive!(kind, T => primitive_array_comparator::<T, M>(math))
        }
        _ => generic_array_comparator(comparator_for(math, element_type(ty))),
    }
}

fn primitive_array_comparator<T, M>(math: M) -> CompareFn
where
    T: PrimitiveElement,
    M: ScalarMath<T> + Send + Sync + 'static,
{
    Arc::new(move |x: &Value, y: &Value| match (T::slice(x), T::slice(y)) {
        (Some(x), Some(y)) => SequenceMath::<T>::compare_slice(&math, x, y),
        _ => x.natural_compare(y),
    })
}

fn generic_array_comparator(element: CompareFn) -> CompareFn {
    Arc::new(move |x: &Value, y: &Value| match (x, y) {
        (Value::Array(xs), Value::Array(ys)) => {
            if Arc::ptr_eq(xs, ys) {
                return Ordering::Equal;
            }
            xs.len().cmp(&ys.len()).then_with(|| {
                xs.iter()
                    .zip(ys.iter())
                    .map(|(a, b)| element(a, b))
                    .find(|ord| ord.is_ne())
                    .unwrap_or(Ordering::Equal)
            })
        }
        _ => x.natural_compare(y),
    })
}

struct EqualsRequest {
    ty: ValueType,
    traversal: Traversal,
}

impl WithMath for EqualsRequest {
    type Output = MathResult<EqualsFn>;

    fn visit<M: ConsistentMath>(self, math: M) -> Self::Output {
        build_equals(math, self.ty, self.traversal)
    }
}

struct HasherRequest {
    ty: ValueType,
    traversal: Traversal,
}

impl WithMath for HasherRequest {
    type Output = MathResult<HashFn>;

    fn visit<M: ConsistentMath>(self, math: M) -> Self::Output {
        build_hasher(math, self.ty, self.traversal)
    }
}

struct ComparatorRequest {
    ty: ValueType,
}

impl WithMath for ComparatorRequest {
    type Output = MathResult<CompareFn>;

    fn visit<M: ConsistentMath>(self, math: M) -> Self::Output {
        build_comparator(math, self.ty)
    }
}

/// Factory for nested equality, hashing, ordering and copying under one [`Semantics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NestedMath {
    semantics: Semantics,
}

impl NestedMath {
    pub const fn new(semantics: Semantics) -> Self {
        Self { semantics }
    }

    pub fn semantics(&self) -> Semantics {
        self.semantics
    }

    pub fn predicate(&self, ty: ValueType, traversal: Traversal) -> MathResult<EqualsFn> {
        self.semantics.dispatch(EqualsRequest { ty, traversal })
    }

    pub fn hasher_for(&self, ty: ValueType, traversal: Traversal) -> MathResult<HashFn> {
        self.semantics.dispatch(HasherRequest { ty, traversal })
    }

    pub fn equals(&self, ty: ValueType) -> MathResult<EqualsFn> {
        self.predicate(ty, Traversal::Shallow)
    }

    pub fn deep_equals(&self, ty: ValueType) -> MathResult<EqualsFn> {
        self.predicate(ty, Traversal::Deep)
    }

    pub fn hasher(&self, ty: ValueType) -> MathResult<HashFn> {
        self.hasher_for(ty, Traversal::Shallow)
    }

    pub fn deep_hasher(&self, ty: ValueType) -> MathResult<HashFn> {
        self.hasher_for(ty, Traversal::Deep)
    }

    pub fn comparator(&self, ty: ValueType) -> MathResult<CompareFn> {
        self.semantics.dispatch(ComparatorRequest { ty })
    }

    pub fn copy(ty: ValueType) -> MathResult<CopyFn> {
        copy::copy(ty)
    }

    pub fn deep_copy(ty: ValueType) -> MathResult<CopyFn> {
        copy::deep_copy(ty)
    }

    pub fn deep_copy_with(ty: ValueType, leaf: CopyFn) -> MathResult<CopyFn> {
        copy::deep_copy_with(ty, leaf)
    }
}
