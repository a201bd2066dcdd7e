use crate::chunk::{ChunkRef, ChunkType, WritableChunk};
use crate::error::{ChunkError, ChunkResult};
use crate::kernel::{build_kernel, check_positions, Kernel, KernelOps, KernelSink};
use keyspace_math::{Semantics, Traversal, ValueType};

/// Element-wise equality predicates over chunks.
///
/// Plain operations overwrite `dest` and set its size to the number of results. The `and_`
/// variants conjoin into results already present in `dest`, whose size must equal the number of
/// results; positions already `false` are not evaluated again.
pub trait ChunkEquals: Send + Sync {
    fn chunk_type(&self) -> ChunkType;

    /// Whether both chunks have the same length and are equal at every position.
    fn equal_reduce(&self, lhs: ChunkRef<'_>, rhs: ChunkRef<'_>) -> ChunkResult<bool>;

    /// First position where the chunks differ, or the shorter length when no common position
    /// differs.
    fn first_difference(&self, lhs: ChunkRef<'_>, rhs: ChunkRef<'_>) -> ChunkResult<usize>;

    fn equal(
        &self,
        lhs: ChunkRef<'_>,
        rhs: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()>;

    fn not_equal(
        &self,
        lhs: ChunkRef<'_>,
        rhs: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()>;

    fn and_equal(
        &self,
        lhs: ChunkRef<'_>,
        rhs: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()>;

    fn and_not_equal(
        &self,
        lhs: ChunkRef<'_>,
        rhs: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()>;

    /// `dest[i] = values[i] == values[i + 1]`; produces `len - 1` results (none for an empty
    /// chunk).
    fn equal_next(&self, values: ChunkRef<'_>, dest: &mut WritableChunk<bool>) -> ChunkResult<()>;

    fn and_equal_next(&self, values: ChunkRef<'_>, dest: &mut WritableChunk<bool>)
        -> ChunkResult<()>;

    /// `dest[i] = lhs[lhs_positions[i]] == rhs[rhs_positions[i]]`.
    fn equal_permuted(
        &self,
        lhs_positions: &[usize],
        rhs_positions: &[usize],
        lhs: ChunkRef<'_>,
        rhs: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()>;

    fn and_equal_permuted(
        &self,
        lhs_positions: &[usize],
        rhs_positions: &[usize],
        lhs: ChunkRef<'_>,
        rhs: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()>;

    /// `dest[i] = lhs[lhs_positions[i]] == rhs[i]`.
    fn equal_lhs_permuted(
        &self,
        lhs_positions: &[usize],
        lhs: ChunkRef<'_>,
        rhs: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()>;

    fn and_equal_lhs_permuted(
        &self,
        lhs_positions: &[usize],
        lhs: ChunkRef<'_>,
        rhs: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()>;

    /// `dest[i] = values[positions[2 * i]] == values[positions[2 * i + 1]]`.
    fn equal_pairs(
        &self,
        positions: &[usize],
        values: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()>;

    fn and_equal_pairs(
        &self,
        positions: &[usize],
        values: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()>;
}

fn fill(
    dest: &mut WritableChunk<bool>,
    count: usize,
    mut predicate: impl FnMut(usize) -> bool,
) -> ChunkResult<()> {
    dest.ensure_fits(count)?;
    for (ii, slot) in dest.storage_mut()[..count].iter_mut().enumerate() {
        *slot = predicate(ii);
    }
    dest.set_size(count)
}

fn conjoin(
    dest: &mut WritableChunk<bool>,
    count: usize,
    mut predicate: impl FnMut(usize) -> bool,
) -> ChunkResult<()> {
    dest.ensure_size(count)?;
    for (ii, slot) in dest.storage_mut()[..count].iter_mut().enumerate() {
        if *slot {
            *slot = predicate(ii);
        }
    }
    Ok(())
}

fn same_len(expected: usize, actual: usize) -> ChunkResult<()> {
    if expected != actual {
        return Err(ChunkError::LengthMismatch { expected, actual });
    }
    Ok(())
}

fn pair_count(positions: &[usize]) -> ChunkResult<usize> {
    if positions.len() % 2 != 0 {
        return Err(ChunkError::OddPairPositions(positions.len()));
    }
    Ok(positions.len() / 2)
}

impl<K: Kernel> ChunkEquals for KernelOps<K> {
    fn chunk_type(&self) -> ChunkType {
        KernelOps::chunk_type(self)
    }

    fn equal_reduce(&self, lhs: ChunkRef<'_>, rhs: ChunkRef<'_>) -> ChunkResult<bool> {
        let lhs = self.values(lhs)?;
        let rhs = self.values(rhs)?;
        Ok(lhs.len() == rhs.len() && lhs.iter().zip(rhs).all(|(x, y)| self.kernel.equals(x, y)))
    }

    fn first_difference(&self, lhs: ChunkRef<'_>, rhs: ChunkRef<'_>) -> ChunkResult<usize> {
        let lhs = self.values(lhs)?;
        let rhs = self.values(rhs)?;
        let common = lhs.len().min(rhs.len());
        Ok(lhs
            .iter()
            .zip(rhs)
            .position(|(x, y)| !self.kernel.equals(x, y))
            .unwrap_or(common))
    }

    fn equal(
        &self,
        lhs: ChunkRef<'_>,
        rhs: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()> {
        let (lhs, rhs) = self.pairwise(lhs, rhs)?;
        fill(dest, lhs.len(), |ii| self.kernel.equals(&lhs[ii], &rhs[ii]))
    }

    fn not_equal(
        &self,
        lhs: ChunkRef<'_>,
        rhs: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()> {
        let (lhs, rhs) = self.pairwise(lhs, rhs)?;
        fill(dest, lhs.len(), |ii| !self.kernel.equals(&lhs[ii], &rhs[ii]))
    }

    fn and_equal(
        &self,
        lhs: ChunkRef<'_>,
        rhs: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()> {
        let (lhs, rhs) = self.pairwise(lhs, rhs)?;
        conjoin(dest, lhs.len(), |ii| self.kernel.equals(&lhs[ii], &rhs[ii]))
    }

    fn and_not_equal(
        &self,
        lhs: ChunkRef<'_>,
        rhs: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()> {
        let (lhs, rhs) = self.pairwise(lhs, rhs)?;
        conjoin(dest, lhs.len(), |ii| !self.kernel.equals(&lhs[ii], &rhs[ii]))
    }

    fn equal_next(&self, values: ChunkRef<'_>, dest: &mut WritableChunk<bool>) -> ChunkResult<()> {
        let values = self.values(values)?;
        fill(dest, values.len().saturating_sub(1), |ii| {
            self.kernel.equals(&values[ii], &values[ii + 1])
        })
    }

    fn and_equal_next(
        &self,
        values: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()> {
        let values = self.values(values)?;
        conjoin(dest, values.len().saturating_sub(1), |ii| {
            self.kernel.equals(&values[ii], &values[ii + 1])
        })
    }

    fn equal_permuted(
        &self,
        lhs_positions: &[usize],
        rhs_positions: &[usize],
        lhs: ChunkRef<'_>,
        rhs: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()> {
        let lhs = self.values(lhs)?;
        let rhs = self.values(rhs)?;
        same_len(lhs_positions.len(), rhs_positions.len())?;
        check_positions(lhs_positions, lhs.len())?;
        check_positions(rhs_positions, rhs.len())?;
        fill(dest, lhs_positions.len(), |ii| {
            self.kernel
                .equals(&lhs[lhs_positions[ii]], &rhs[rhs_positions[ii]])
        })
    }

    fn and_equal_permuted(
        &self,
        lhs_positions: &[usize],
        rhs_positions: &[usize],
        lhs: ChunkRef<'_>,
        rhs: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()> {
        let lhs = self.values(lhs)?;
        let rhs = self.values(rhs)?;
        same_len(lhs_positions.len(), rhs_positions.len())?;
        check_positions(lhs_positions, lhs.len())?;
        check_positions(rhs_positions, rhs.len())?;
        conjoin(dest, lhs_positions.len(), |ii| {
            self.kernel
                .equals(&lhs[lhs_positions[ii]], &rhs[rhs_positions[ii]])
        })
    }

    fn equal_lhs_permuted(
        &self,
        lhs_positions: &[usize],
        lhs: ChunkRef<'_>,
        rhs: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()> {
        let lhs = self.values(lhs)?;
        let rhs = self.values(rhs)?;
        same_len(lhs_positions.len(), rhs.len())?;
        check_positions(lhs_positions, lhs.len())?;
        fill(dest, lhs_positions.len(), |ii| {
            self.kernel.equals(&lhs[lhs_positions[ii]], &rhs[ii])
        })
    }

    fn and_equal_lhs_permuted(
        &self,
        lhs_positions: &[usize],
        lhs: ChunkRef<'_>,
        rhs: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()> {
        let lhs = self.values(lhs)?;
        let rhs = self.values(rhs)?;
        same_len(lhs_positions.len(), rhs.len())?;
        check_positions(lhs_positions, lhs.len())?;
        conjoin(dest, lhs_positions.len(), |ii| {
            self.kernel.equals(&lhs[lhs_positions[ii]], &rhs[ii])
        })
    }

    fn equal_pairs(
        &self,
        positions: &[usize],
        values: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()> {
        let values = self.values(values)?;
        let pairs = pair_count(positions)?;
        check_positions(positions, values.len())?;
        fill(dest, pairs, |ii| {
            self.kernel
                .equals(&values[positions[2 * ii]], &values[positions[2 * ii + 1]])
        })
    }

    fn and_equal_pairs(
        &self,
        positions: &[usize],
        values: ChunkRef<'_>,
        dest: &mut WritableChunk<bool>,
    ) -> ChunkResult<()> {
        let values = self.values(values)?;
        let pairs = pair_count(positions)?;
        check_positions(positions, values.len())?;
        conjoin(dest, pairs, |ii| {
            self.kernel
                .equals(&values[positions[2 * ii]], &values[positions[2 * ii + 1]])
        })
    }
}

struct EqualsSink;

impl KernelSink for EqualsSink {
    type Output = Box<dyn ChunkEquals>;

    fn accept<K: Kernel>(self, kernel: K) -> Self::Output {
        Box::new(KernelOps::new(kernel))
    }
}

/// Builds the equality predicates for chunks carrying values of type `ty`.
pub fn chunk_equals(
    semantics: Semantics,
    ty: ValueType,
    traversal: Traversal,
) -> ChunkResult<Box<dyn ChunkEquals>> {
    let equals = build_kernel(semantics, ty, traversal, EqualsSink)?;
    log::debug!(
        "built {semantics} chunk equals for {ty} ({traversal:?}, {:?} chunks)",
        equals.chunk_type()
    );
    Ok(equals)
}
