use crate::chunk::{ChunkRef, ChunkType, WritableChunk};
use crate::error::ChunkResult;
use crate::kernel::{build_kernel, Kernel, KernelOps, KernelSink};
use keyspace_math::{ScalarMath, Semantics, Traversal, ValueType};

/// Column-at-a-time hashing of composite keys.
///
/// `hash_initial` seeds a hash column from the first key column; `hash_update` folds each
/// further key column into it. No per-row key object is ever built.
pub trait ChunkHasher: Send + Sync {
    fn chunk_type(&self) -> ChunkType;

    /// Writes `scramble(hash(values[i]))` to `dest[i]` and sets the size of `dest` to
    /// `values.len()`.
    fn hash_initial(&self, values: ChunkRef<'_>, dest: &mut WritableChunk<i32>) -> ChunkResult<()>;

    /// Replaces `dest[i]` with `update_hash(dest[i], scramble(hash(values[i])))`. `dest` must
    /// already hold one hash per value.
    fn hash_update(&self, values: ChunkRef<'_>, dest: &mut WritableChunk<i32>) -> ChunkResult<()>;
}

/// Murmur3 32-bit finalizer.
#[inline]
pub fn scramble(hash: i32) -> i32 {
    let mut x = hash as u32;
    x ^= x >> 16;
    x = x.wrapping_mul(0x85eb_ca6b);
    x ^= x >> 13;
    x = x.wrapping_mul(0xc2b2_ae35);
    x ^= x >> 16;
    x as i32
}

#[inline]
pub fn update_hash(existing: i32, new_hash: i32) -> i32 {
    existing.wrapping_mul(31).wrapping_add(new_hash)
}

#[inline]
pub fn hash_initial_single<T: Copy, M: ScalarMath<T> + ?Sized>(math: &M, value: T) -> i32 {
    scramble(math.hash_code(value))
}

#[inline]
pub fn hash_update_single<T: Copy, M: ScalarMath<T> + ?Sized>(
    math: &M,
    existing: i32,
    value: T,
) -> i32 {
    update_hash(existing, hash_initial_single(math, value))
}

impl<K: Kernel> ChunkHasher for KernelOps<K> {
    fn chunk_type(&self) -> ChunkType {
        KernelOps::chunk_type(self)
    }

    fn hash_initial(&self, values: ChunkRef<'_>, dest: &mut WritableChunk<i32>) -> ChunkResult<()> {
        let values = self.values(values)?;
        dest.ensure_fits(values.len())?;
        for (slot, value) in dest.storage_mut().iter_mut().zip(values) {
            *slot = scramble(self.kernel.hash_code(value));
        }
        dest.set_size(values.len())
    }

    fn hash_update(&self, values: ChunkRef<'_>, dest: &mut WritableChunk<i32>) -> ChunkResult<()> {
        let values = self.values(values)?;
        dest.ensure_size(values.len())?;
        for (slot, value) in dest.storage_mut().iter_mut().zip(values) {
            *slot = update_hash(*slot, scramble(self.kernel.hash_code(value)));
        }
        Ok(())
    }
}

struct HasherSink;

impl KernelSink for HasherSink {
    type Output = Box<dyn ChunkHasher>;

    fn accept<K: Kernel>(self, kernel: K) -> Self::Output {
        Box::new(KernelOps::new(kernel))
    }
}

/// Builds the hasher for chunks carrying values of type `ty`.
pub fn chunk_hasher(
    semantics: Semantics,
    ty: ValueType,
    traversal: Traversal,
) -> ChunkResult<Box<dyn ChunkHasher>> {
    let hasher = build_kernel(semantics, ty, traversal, HasherSink)?;
    log::debug!(
        "built {semantics} chunk hasher for {ty} ({traversal:?}, {:?} chunks)",
        hasher.chunk_type()
    );
    Ok(hasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scramble_matches_murmur_finalizer() {
        assert_eq!(scramble(0), 0);
        assert_eq!(scramble(1), 0x514e_28b7);
    }

    #[test]
    fn update_hash_is_polynomial() {
        assert_eq!(update_hash(1, 2), 33);
        assert_eq!(update_hash(i32::MAX, 0), i32::MAX.wrapping_mul(31));
    }
}
