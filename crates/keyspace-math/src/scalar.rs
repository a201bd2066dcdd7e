//! Per-semantics equality, hashing and ordering of scalars.
//!
//! Three floating-point semantics are supported. Each one fixes, at the same time, how distinct
//! NaN encodings and the two signed zeros behave for `equals`, `hash_code` and `compare`:
//!
//! | semantics | NaN payloads | `-0.0` vs `0.0` (equals / hash) | `compare(-0.0, 0.0)` |
//! |-----------|--------------|----------------------------------|----------------------|
//! | [`BitwiseMath`]   | distinct | distinct | `Less` |
//! | [`NativeMath`]    | all equal | distinct | `Less` |
//! | [`CanonicalMath`] | all equal | equal    | `Less` |
//!
//! Canonical semantics treat the zeros as the same key but still sort `-0.0` before `0.0`, so
//! `CanonicalMath::compare` returning `Equal` is not equivalent to `CanonicalMath::equals`.
//!
//! Non-float scalars (`bool`, `u16`, the signed integers) behave identically under all three
//! semantics. Hash codes follow the classic 32-bit host conventions.

use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::fmt;

const CANONICAL_NAN_F32_BITS: u32 = 0x7fc0_0000;
const CANONICAL_NAN_F64_BITS: u64 = 0x7ff8_0000_0000_0000;

/// Equality, hashing and ordering of one scalar type under one semantics.
pub trait ScalarMath<T: Copy> {
    fn equals(&self, x: T, y: T) -> bool;
    fn hash_code(&self, x: T) -> i32;
    fn compare(&self, x: T, y: T) -> Ordering;
}

/// Raw-bit semantics: two floats are equal only if their encodings are identical.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitwiseMath;

/// Host-language semantics: all NaNs are one value, `-0.0` and `0.0` are different values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NativeMath;

/// Engine semantics: all NaNs are one value and `-0.0` is canonicalized to `0.0` for equality and
/// hashing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CanonicalMath;

pub const BITWISE: BitwiseMath = BitwiseMath;
pub const NATIVE: NativeMath = NativeMath;
pub const CANONICAL: CanonicalMath = CanonicalMath;

/// Runtime tag for one of the three semantics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Semantics {
    Bitwise,
    Native,
    #[default]
    Canonical,
}

impl Semantics {
    pub const ALL: [Semantics; 3] = [Semantics::Bitwise, Semantics::Native, Semantics::Canonical];

    /// Resolve this tag to its concrete math type and hand it to `visitor`.
    ///
    /// Factories use this to build monomorphic code once, instead of branching on the tag for
    /// every element.
    pub fn dispatch<V: WithMath>(self, visitor: V) -> V::Output {
        match self {
            Semantics::Bitwise => visitor.visit(BITWISE),
            Semantics::Native => visitor.visit(NATIVE),
            Semantics::Canonical => visitor.visit(CANONICAL),
        }
    }

    pub fn equals<T: Copy>(self, x: T, y: T) -> bool
    where
        BitwiseMath: ScalarMath<T>,
        NativeMath: ScalarMath<T>,
        CanonicalMath: ScalarMath<T>,
    {
        match self {
            Semantics::Bitwise => <BitwiseMath as ScalarMath<T>>::equals(&BITWISE, x, y),
            Semantics::Native => <NativeMath as ScalarMath<T>>::equals(&NATIVE, x, y),
            Semantics::Canonical => <CanonicalMath as ScalarMath<T>>::equals(&CANONICAL, x, y),
        }
    }

    pub fn hash_code<T: Copy>(self, x: T) -> i32
    where
        BitwiseMath: ScalarMath<T>,
        NativeMath: ScalarMath<T>,
        CanonicalMath: ScalarMath<T>,
    {
        match self {
            Semantics::Bitwise => <BitwiseMath as ScalarMath<T>>::hash_code(&BITWISE, x),
            Semantics::Native => <NativeMath as ScalarMath<T>>::hash_code(&NATIVE, x),
            Semantics::Canonical => <CanonicalMath as ScalarMath<T>>::hash_code(&CANONICAL, x),
        }
    }

    pub fn compare<T: Copy>(self, x: T, y: T) -> Ordering
    where
        BitwiseMath: ScalarMath<T>,
        NativeMath: ScalarMath<T>,
        CanonicalMath: ScalarMath<T>,
    {
        match self {
            Semantics::Bitwise => <BitwiseMath as ScalarMath<T>>::compare(&BITWISE, x, y),
            Semantics::Native => <NativeMath as ScalarMath<T>>::compare(&NATIVE, x, y),
            Semantics::Canonical => <CanonicalMath as ScalarMath<T>>::compare(&CANONICAL, x, y),
        }
    }
}

impl fmt::Display for Semantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Semantics::Bitwise => "bitwise",
            Semantics::Native => "native",
            Semantics::Canonical => "canonical",
        })
    }
}

/// A math type covering every primitive leaf kind.
pub trait ConsistentMath:
    ScalarMath<bool>
    + ScalarMath<u16>
    + ScalarMath<i8>
    + ScalarMath<i16>
    + ScalarMath<i32>
    + ScalarMath<i64>
    + ScalarMath<f32>
    + ScalarMath<f64>
    + Copy
    + Default
    + fmt::Debug
    + Send
    + Sync
    + 'static
{
    const SEMANTICS: Semantics;
}

impl ConsistentMath for BitwiseMath {
    const SEMANTICS: Semantics = Semantics::Bitwise;
}

impl ConsistentMath for NativeMath {
    const SEMANTICS: Semantics = Semantics::Native;
}

impl ConsistentMath for CanonicalMath {
    const SEMANTICS: Semantics = Semantics::Canonical;
}

/// Callback for [`Semantics::dispatch`].
pub trait WithMath {
    type Output;

    fn visit<M: ConsistentMath>(self, math: M) -> Self::Output;
}

#[inline]
pub(crate) fn fold_bits(bits: u64) -> i32 {
    (bits ^ (bits >> 32)) as i32
}

#[inline]
pub(crate) fn hash_bool(x: bool) -> i32 {
    if x {
        1231
    } else {
        1237
    }
}

#[inline]
pub(crate) fn hash_char(x: u16) -> i32 {
    i32::from(x)
}

#[inline]
pub(crate) fn hash_byte(x: i8) -> i32 {
    i32::from(x)
}

#[inline]
pub(crate) fn hash_short(x: i16) -> i32 {
    i32::from(x)
}

#[inline]
pub(crate) fn hash_int(x: i32) -> i32 {
    x
}

#[inline]
pub(crate) fn hash_long(x: i64) -> i32 {
    fold_bits(x as u64)
}

#[inline]
fn nan_collapsed_bits_f32(x: f32) -> u32 {
    if x.is_nan() {
        CANONICAL_NAN_F32_BITS
    } else {
        x.to_bits()
    }
}

#[inline]
fn nan_collapsed_bits_f64(x: f64) -> u64 {
    if x.is_nan() {
        CANONICAL_NAN_F64_BITS
    } else {
        x.to_bits()
    }
}

#[inline]
fn canonical_bits_f32(x: f32) -> u32 {
    if x == 0.0 {
        0
    } else {
        nan_collapsed_bits_f32(x)
    }
}

#[inline]
fn canonical_bits_f64(x: f64) -> u64 {
    if x == 0.0 {
        0
    } else {
        nan_collapsed_bits_f64(x)
    }
}

// Numeric order, then the NaN-collapsed bit pattern as a signed integer. That places `-0.0`
// before `0.0` and every NaN after `+inf`.
#[inline]
pub(crate) fn native_compare_f32(x: f32, y: f32) -> Ordering {
    if x < y {
        Ordering::Less
    } else if x > y {
        Ordering::Greater
    } else {
        (nan_collapsed_bits_f32(x) as i32).cmp(&(nan_collapsed_bits_f32(y) as i32))
    }
}

#[inline]
pub(crate) fn native_compare_f64(x: f64, y: f64) -> Ordering {
    if x < y {
        Ordering::Less
    } else if x > y {
        Ordering::Greater
    } else {
        (nan_collapsed_bits_f64(x) as i64).cmp(&(nan_collapsed_bits_f64(y) as i64))
    }
}

#[inline]
pub(crate) fn native_hash_f32(x: f32) -> i32 {
    nan_collapsed_bits_f32(x) as i32
}

#[inline]
pub(crate) fn native_hash_f64(x: f64) -> i32 {
    fold_bits(nan_collapsed_bits_f64(x))
}

impl ScalarMath<f32> for BitwiseMath {
    #[inline]
    fn equals(&self, x: f32, y: f32) -> bool {
        x.to_bits() == y.to_bits()
    }

    #[inline]
    fn hash_code(&self, x: f32) -> i32 {
        x.to_bits() as i32
    }

    #[inline]
    fn compare(&self, x: f32, y: f32) -> Ordering {
        native_compare_f32(x, y).then_with(|| x.to_bits().cmp(&y.to_bits()))
    }
}

impl ScalarMath<f64> for BitwiseMath {
    #[inline]
    fn equals(&self, x: f64, y: f64) -> bool {
        x.to_bits() == y.to_bits()
    }

    #[inline]
    fn hash_code(&self, x: f64) -> i32 {
        fold_bits(x.to_bits())
    }

    #[inline]
    fn compare(&self, x: f64, y: f64) -> Ordering {
        native_compare_f64(x, y).then_with(|| x.to_bits().cmp(&y.to_bits()))
    }
}

impl ScalarMath<f32> for NativeMath {
    #[inline]
    fn equals(&self, x: f32, y: f32) -> bool {
        nan_collapsed_bits_f32(x) == nan_collapsed_bits_f32(y)
    }

    #[inline]
    fn hash_code(&self, x: f32) -> i32 {
        native_hash_f32(x)
    }

    #[inline]
    fn compare(&self, x: f32, y: f32) -> Ordering {
        native_compare_f32(x, y)
    }
}

impl ScalarMath<f64> for NativeMath {
    #[inline]
    fn equals(&self, x: f64, y: f64) -> bool {
        nan_collapsed_bits_f64(x) == nan_collapsed_bits_f64(y)
    }

    #[inline]
    fn hash_code(&self, x: f64) -> i32 {
        native_hash_f64(x)
    }

    #[inline]
    fn compare(&self, x: f64, y: f64) -> Ordering {
        native_compare_f64(x, y)
    }
}

impl ScalarMath<f32> for CanonicalMath {
    #[inline]
    fn equals(&self, x: f32, y: f32) -> bool {
        OrderedFloat(x) == OrderedFloat(y)
    }

    #[inline]
    fn hash_code(&self, x: f32) -> i32 {
        canonical_bits_f32(x) as i32
    }

    /// Sorts `-0.0` before `0.0` even though [`equals`](ScalarMath::equals) treats them as equal.
    #[inline]
    fn compare(&self, x: f32, y: f32) -> Ordering {
        native_compare_f32(x, y)
    }
}

impl ScalarMath<f64> for CanonicalMath {
    #[inline]
    fn equals(&self, x: f64, y: f64) -> bool {
        OrderedFloat(x) == OrderedFloat(y)
    }

    #[inline]
    fn hash_code(&self, x: f64) -> i32 {
        fold_bits(canonical_bits_f64(x))
    }

    /// Sorts `-0.0` before `0.0` even though [`equals`](ScalarMath::equals) treats them as equal.
    #[inline]
    fn compare(&self, x: f64, y: f64) -> Ordering {
        native_compare_f64(x, y)
    }
}

macro_rules! exact_scalar_math {
    ($math:ty; $($t:ty => $hash:path),+ $(,)?) => {
        $(
            impl ScalarMath<$t> for $math {
                #[inline]
                fn equals(&self, x: $t, y: $t) -> bool {
                    x == y
                }

                #[inline]
                fn hash_code(&self, x: $t) -> i32 {
                    $hash(x)
                }

                #[inline]
                fn compare(&self, x: $t, y: $t) -> Ordering {
                    x.cmp(&y)
                }
            }
        )+
    };
}

macro_rules! exact_scalar_math_for_all {
    ($($math:ty),+) => {
        $(
            exact_scalar_math!($math;
                bool => hash_bool,
                u16 => hash_char,
                i8 => hash_byte,
                i16 => hash_short,
                i32 => hash_int,
                i64 => hash_long,
            );
        )+
    };
}

exact_scalar_math_for_all!(BitwiseMath, NativeMath, CanonicalMath);
