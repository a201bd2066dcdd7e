use crate::scalar::ScalarMath;
use std::cmp::Ordering;
use std::ops::Range;

/// Equality, hashing and ordering of whole sequences, built from a [`ScalarMath`].
///
/// Every scalar math gets these for free. Ranged forms take half-open bounds on each operand
/// independently and are zero-copy.
///
/// Ordering is length-first: sequences of different length order the shorter one first, and
/// only equal-length sequences are decided by their first mismatching element. A sequence
/// compares `Equal` exactly when [`equals_slice`](SequenceMath::equals_slice) holds.
pub trait SequenceMath<T: Copy>: ScalarMath<T> {
    fn equals_slice(&self, x: &[T], y: &[T]) -> bool {
        if std::ptr::eq(x, y) {
            return true;
        }
        x.len() == y.len() && self.mismatch(x, y).is_none()
    }

    /// `None` is a null sequence reference; two nulls are equal, a null never equals a value.
    fn equals_nullable(&self, x: Option<&[T]>, y: Option<&[T]>) -> bool {
        match (x, y) {
            (None, None) => true,
            (Some(x), Some(y)) => self.equals_slice(x, y),
            _ => false,
        }
    }

    /// [`equals_slice`](SequenceMath::equals_slice) over `x[x_range]` and `y[y_range]`.
    ///
    /// # Panics
    ///
    /// Panics if a range is out of bounds for its operand.
    fn equals_range(&self, x: &[T], x_range: Range<usize>, y: &[T], y_range: Range<usize>) -> bool {
        self.equals_slice(&x[x_range], &y[y_range])
    }

    /// Polynomial hash seeded at 1: `hash = 31 * hash + hash_code(element)`.
    fn hash_slice(&self, x: &[T]) -> i32 {
        x.iter().fold(1i32, |hash, &value| {
            hash.wrapping_mul(31).wrapping_add(self.hash_code(value))
        })
    }

    fn hash_nullable(&self, x: Option<&[T]>) -> i32 {
        x.map_or(0, |x| self.hash_slice(x))
    }

    /// [`hash_slice`](SequenceMath::hash_slice) over `x[range]`.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds for `x`.
    fn hash_range(&self, x: &[T], range: Range<usize>) -> i32 {
        self.hash_slice(&x[range])
    }

    fn compare_slice(&self, x: &[T], y: &[T]) -> Ordering {
        if std::ptr::eq(x, y) {
            return Ordering::Equal;
        }
        match self.mismatch(x, y) {
            Some(idx) if x.len() == y.len() => self.compare(x[idx], y[idx]),
            _ => x.len().cmp(&y.len()),
        }
    }

    /// Nulls order before every sequence.
    fn compare_nullable(&self, x: Option<&[T]>, y: Option<&[T]>) -> Ordering {
        match (x, y) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => self.compare_slice(x, y),
        }
    }

    /// [`compare_slice`](SequenceMath::compare_slice) over `x[x_range]` and `y[y_range]`.
    ///
    /// # Panics
    ///
    /// Panics if a range is out of bounds for its operand.
    fn compare_range(
        &self,
        x: &[T],
        x_range: Range<usize>,
        y: &[T],
        y_range: Range<usize>,
    ) -> Ordering {
        self.compare_slice(&x[x_range], &y[y_range])
    }

    /// Index of the first element that differs.
    ///
    /// Returns `None` when both sequences have the same length and match everywhere, and the
    /// shorter length when one is a strict prefix of the other.
    fn mismatch(&self, x: &[T], y: &[T]) -> Option<usize> {
        let common = x.len().min(y.len());
        if let Some(idx) = x[..common]
            .iter()
            .zip(&y[..common])
            .position(|(&a, &b)| !self.equals(a, b))
        {
            return Some(idx);
        }
        (x.len() != y.len()).then_some(common)
    }

    /// Like [`mismatch`](SequenceMath::mismatch); the result is relative to the range starts.
    ///
    /// # Panics
    ///
    /// Panics if a range is out of bounds for its operand.
    fn mismatch_range(
        &self,
        x: &[T],
        x_range: Range<usize>,
        y: &[T],
        y_range: Range<usize>,
    ) -> Option<usize> {
        self.mismatch(&x[x_range], &y[y_range])
    }
}

impl<T: Copy, M: ScalarMath<T> + ?Sized> SequenceMath<T> for M {}
