//! Per-element kernels shared by the hasher and equals adapters.
//!
//! A kernel is resolved once per factory call. Bare primitives get a [`ScalarKernel`] bound to
//! the concrete math type; everything carried in object chunks gets a [`ValueKernel`] wrapping the
//! nested-math closures.

use crate::chunk::{ChunkElement, ChunkRef, ChunkType};
use crate::error::{ChunkError, ChunkResult};
use keyspace_math::{
    ConsistentMath, EqualsFn, HashFn, LeafKind, NestedMath, PrimitiveKind, ScalarMath, Semantics,
    Traversal, Value, ValueType, WithMath,
};
use std::marker::PhantomData;

pub(crate) trait Kernel: Send + Sync + 'static {
    type Item: ChunkElement;

    fn equals(&self, x: &Self::Item, y: &Self::Item) -> bool;

    fn hash_code(&self, x: &Self::Item) -> i32;
}

pub(crate) struct ScalarKernel<T, M> {
    math: M,
    _element: PhantomData<fn() -> T>,
}

impl<T, M> ScalarKernel<T, M> {
    fn new(math: M) -> Self {
        Self {
            math,
            _element: PhantomData,
        }
    }
}

impl<T, M> Kernel for ScalarKernel<T, M>
where
    T: ChunkElement + Copy,
    M: ScalarMath<T> + Send + Sync + 'static,
{
    type Item = T;

    #[inline]
    fn equals(&self, x: &T, y: &T) -> bool {
        self.math.equals(*x, *y)
    }

    #[inline]
    fn hash_code(&self, x: &T) -> i32 {
        self.math.hash_code(*x)
    }
}

pub(crate) struct ValueKernel {
    equals: EqualsFn,
    hash: HashFn,
}

impl Kernel for ValueKernel {
    type Item = Value;

    fn equals(&self, x: &Value, y: &Value) -> bool {
        (self.equals)(x, y)
    }

    fn hash_code(&self, x: &Value) -> i32 {
        (self.hash)(x)
    }
}

/// Receives the resolved kernel and wraps it into the adapter the caller asked for.
pub(crate) trait KernelSink {
    type Output;

    fn accept<K: Kernel>(self, kernel: K) -> Self::Output;
}

struct ScalarKernelRequest<S> {
    kind: PrimitiveKind,
    sink: S,
}

impl<S: KernelSink> WithMath for ScalarKernelRequest<S> {
    type Output = S::Output;

    fn visit<M: ConsistentMath>(self, math: M) -> Self::Output {
        let sink = self.sink;
        keyspace_math::dispatch_primitive!(self.kind, T => sink.accept(ScalarKernel::<T, M>::new(math)))
    }
}

pub(crate) fn build_kernel<S: KernelSink>(
    semantics: Semantics,
    ty: ValueType,
    traversal: Traversal,
    sink: S,
) -> ChunkResult<S::Output> {
    match (ty.depth(), ty.leaf()) {
        (0, LeafKind::Primitive(kind)) => Ok(semantics.dispatch(ScalarKernelRequest { kind, sink })),
        _ => {
            let math = NestedMath::new(semantics);
            let kernel = ValueKernel {
                equals: math.predicate(ty, traversal)?,
                hash: math.hasher_for(ty, traversal)?,
            };
            Ok(sink.accept(kernel))
        }
    }
}

/// Batch operations over one resolved kernel.
pub(crate) struct KernelOps<K> {
    pub(crate) kernel: K,
}

impl<K: Kernel> KernelOps<K> {
    pub(crate) fn new(kernel: K) -> Self {
        Self { kernel }
    }

    pub(crate) fn chunk_type(&self) -> ChunkType {
        <K::Item as ChunkElement>::CHUNK_TYPE
    }

    pub(crate) fn values<'a>(&self, chunk: ChunkRef<'a>) -> ChunkResult<&'a [K::Item]> {
        <K::Item as ChunkElement>::slice(chunk).ok_or(ChunkError::TypeMismatch {
            expected: self.chunk_type(),
            actual: chunk.chunk_type(),
        })
    }

    /// Both sides, typed and of equal length.
    pub(crate) fn pairwise<'a>(
        &self,
        lhs: ChunkRef<'a>,
        rhs: ChunkRef<'a>,
    ) -> ChunkResult<(&'a [K::Item], &'a [K::Item])> {
        let lhs = self.values(lhs)?;
        let rhs = self.values(rhs)?;
        if lhs.len() != rhs.len() {
            return Err(ChunkError::LengthMismatch {
                expected: lhs.len(),
                actual: rhs.len(),
            });
        }
        Ok((lhs, rhs))
    }
}

pub(crate) fn check_positions(positions: &[usize], size: usize) -> ChunkResult<()> {
    match positions.iter().find(|&&position| position >= size) {
        Some(&position) => Err(ChunkError::PositionOutOfBounds { position, size }),
        None => Ok(()),
    }
}
