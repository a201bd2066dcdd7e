//! Runtime values and their type descriptors.
//!
//! A [`ValueType`] describes a (possibly nested) sequence type: a leaf kind plus a nesting depth.
//! `ValueType::array(PrimitiveKind::Double, 2)` is "array of arrays of f64". Depth 0 is the bare
//! leaf.
//!
//! [`Value`] is the type-erased representation used wherever nested sequences flow through the
//! engine. Arrays are shared (`Arc`), which gives every array a reference identity; shallow
//! equality and hashing of nested elements is defined in terms of that identity.

use crate::scalar::{
    fold_bits, hash_bool, hash_byte, hash_char, hash_int, hash_long, hash_short,
    native_compare_f32, native_compare_f64, native_hash_f32, native_hash_f64, NativeMath,
    ScalarMath,
};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Char,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "bool",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Byte => "i8",
            PrimitiveKind::Short => "i16",
            PrimitiveKind::Int => "i32",
            PrimitiveKind::Long => "i64",
            PrimitiveKind::Float => "f32",
            PrimitiveKind::Double => "f64",
        }
    }
}

/// The innermost element type of a sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LeafKind {
    Primitive(PrimitiveKind),
    /// Strings: a generic leaf with a natural order.
    Text,
    /// Heterogeneous leaf: any value, including arrays. Has no natural order.
    Any,
}

impl LeafKind {
    pub fn is_primitive(self) -> bool {
        matches!(self, LeafKind::Primitive(_))
    }

    pub fn is_comparable(self) -> bool {
        !matches!(self, LeafKind::Any)
    }
}

impl From<PrimitiveKind> for LeafKind {
    fn from(kind: PrimitiveKind) -> Self {
        LeafKind::Primitive(kind)
    }
}

impl fmt::Display for LeafKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafKind::Primitive(kind) => f.write_str(kind.name()),
            LeafKind::Text => f.write_str("text"),
            LeafKind::Any => f.write_str("any"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ValueType {
    leaf: LeafKind,
    depth: u8,
}

impl ValueType {
    pub fn scalar(leaf: impl Into<LeafKind>) -> Self {
        Self {
            leaf: leaf.into(),
            depth: 0,
        }
    }

    pub fn array(leaf: impl Into<LeafKind>, depth: u8) -> Self {
        Self {
            leaf: leaf.into(),
            depth,
        }
    }

    pub fn leaf(self) -> LeafKind {
        self.leaf
    }

    pub fn depth(self) -> u8 {
        self.depth
    }

    pub fn is_array(self) -> bool {
        self.depth > 0
    }

    /// The primitive kind when this is a one-dimensional primitive array.
    pub fn primitive_array_kind(self) -> Option<PrimitiveKind> {
        match (self.depth, self.leaf) {
            (1, LeafKind::Primitive(kind)) => Some(kind),
            _ => None,
        }
    }

    /// Element type of an array type; `None` for a bare leaf.
    pub fn component(self) -> Option<ValueType> {
        self.depth.checked_sub(1).map(|depth| Self {
            leaf: self.leaf,
            depth,
        })
    }

    pub fn array_of(self) -> ValueType {
        Self {
            leaf: self.leaf,
            depth: self.depth + 1,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.leaf)?;
        for _ in 0..self.depth {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// A type-erased, possibly nested value.
#[derive(Clone, Debug)]
pub enum Value {
    Null,
    Boolean(bool),
    Char(u16),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Text(Arc<str>),
    BooleanArray(Arc<[bool]>),
    CharArray(Arc<[u16]>),
    ByteArray(Arc<[i8]>),
    ShortArray(Arc<[i16]>),
    IntArray(Arc<[i32]>),
    LongArray(Arc<[i64]>),
    FloatArray(Arc<[f32]>),
    DoubleArray(Arc<[f64]>),
    Array(Arc<[Value]>),
}

impl Value {
    pub fn array(values: impl IntoIterator<Item = Value>) -> Self {
        Value::Array(values.into_iter().collect())
    }

    pub fn text(value: &str) -> Self {
        Value::Text(Arc::from(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Length of an array value.
    pub fn len(&self) -> Option<usize> {
        Some(match self {
            Value::BooleanArray(v) => v.len(),
            Value::CharArray(v) => v.len(),
            Value::ByteArray(v) => v.len(),
            Value::ShortArray(v) => v.len(),
            Value::IntArray(v) => v.len(),
            Value::LongArray(v) => v.len(),
            Value::FloatArray(v) => v.len(),
            Value::DoubleArray(v) => v.len(),
            Value::Array(v) => v.len(),
            _ => return None,
        })
    }

    fn identity(&self) -> Option<*const u8> {
        Some(match self {
            Value::BooleanArray(v) => Arc::as_ptr(v) as *const u8,
            Value::CharArray(v) => Arc::as_ptr(v) as *const u8,
            Value::ByteArray(v) => Arc::as_ptr(v) as *const u8,
            Value::ShortArray(v) => Arc::as_ptr(v) as *const u8,
            Value::IntArray(v) => Arc::as_ptr(v) as *const u8,
            Value::LongArray(v) => Arc::as_ptr(v) as *const u8,
            Value::FloatArray(v) => Arc::as_ptr(v) as *const u8,
            Value::DoubleArray(v) => Arc::as_ptr(v) as *const u8,
            Value::Array(v) => Arc::as_ptr(v) as *const u8,
            _ => return None,
        })
    }

    /// Whether both values are the same array instance.
    pub fn same_array(&self, other: &Value) -> bool {
        match (self.identity(), other.identity()) {
            (Some(x), Some(y)) => x == y && self.len() == other.len(),
            _ => false,
        }
    }

    /// Object equality: boxed scalars compare with native semantics, text by content, arrays by
    /// identity.
    pub fn object_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(x), Value::Boolean(y)) => x == y,
            (Value::Char(x), Value::Char(y)) => x == y,
            (Value::Byte(x), Value::Byte(y)) => x == y,
            (Value::Short(x), Value::Short(y)) => x == y,
            (Value::Int(x), Value::Int(y)) => x == y,
            (Value::Long(x), Value::Long(y)) => x == y,
            (Value::Float(x), Value::Float(y)) => NativeMath.equals(*x, *y),
            (Value::Double(x), Value::Double(y)) => NativeMath.equals(*x, *y),
            (Value::Text(x), Value::Text(y)) => x == y,
            _ => self.same_array(other),
        }
    }

    /// Hash consistent with [`object_equals`](Value::object_equals).
    pub fn object_hash(&self) -> i32 {
        match self {
            Value::Null => 0,
            Value::Boolean(x) => hash_bool(*x),
            Value::Char(x) => hash_char(*x),
            Value::Byte(x) => hash_byte(*x),
            Value::Short(x) => hash_short(*x),
            Value::Int(x) => hash_int(*x),
            Value::Long(x) => hash_long(*x),
            Value::Float(x) => native_hash_f32(*x),
            Value::Double(x) => native_hash_f64(*x),
            Value::Text(x) => text_hash(x),
            _ => self
                .identity()
                .map_or(0, |ptr| fold_bits(ptr as usize as u64)),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Char(_) => 2,
            Value::Byte(_) => 3,
            Value::Short(_) => 4,
            Value::Int(_) => 5,
            Value::Long(_) => 6,
            Value::Float(_) => 7,
            Value::Double(_) => 8,
            Value::Text(_) => 9,
            Value::BooleanArray(_) => 10,
            Value::CharArray(_) => 11,
            Value::ByteArray(_) => 12,
            Value::ShortArray(_) => 13,
            Value::IntArray(_) => 14,
            Value::LongArray(_) => 15,
            Value::FloatArray(_) => 16,
            Value::DoubleArray(_) => 17,
            Value::Array(_) => 18,
        }
    }

    /// Natural order of comparable leaves; nulls first. Values of different shapes order by shape.
    pub(crate) fn natural_compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Boolean(x), Value::Boolean(y)) => x.cmp(y),
            (Value::Char(x), Value::Char(y)) => x.cmp(y),
            (Value::Byte(x), Value::Byte(y)) => x.cmp(y),
            (Value::Short(x), Value::Short(y)) => x.cmp(y),
            (Value::Int(x), Value::Int(y)) => x.cmp(y),
            (Value::Long(x), Value::Long(y)) => x.cmp(y),
            (Value::Float(x), Value::Float(y)) => native_compare_f32(*x, *y),
            (Value::Double(x), Value::Double(y)) => native_compare_f64(*x, *y),
            (Value::Text(x), Value::Text(y)) => x.cmp(y),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// 32-bit polynomial hash over UTF-16 code units.
fn text_hash(text: &str) -> i32 {
    text.encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

macro_rules! value_conversions {
    ($($t:ty => $scalar:ident, $array:ident);+ $(;)?) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::$scalar(value)
                }
            }

            impl From<Vec<$t>> for Value {
                fn from(values: Vec<$t>) -> Self {
                    Value::$array(Arc::from(values))
                }
            }

            impl From<&[$t]> for Value {
                fn from(values: &[$t]) -> Self {
                    Value::$array(Arc::from(values))
                }
            }
        )+
    };
}

value_conversions! {
    bool => Boolean, BooleanArray;
    u16 => Char, CharArray;
    i8 => Byte, ByteArray;
    i16 => Short, ShortArray;
    i32 => Int, IntArray;
    i64 => Long, LongArray;
    f32 => Float, FloatArray;
    f64 => Double, DoubleArray;
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::text(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(values: Vec<Value>) -> Self {
        Value::Array(Arc::from(values))
    }
}

/// Expands `$body` once per primitive kind with `$t` bound to the matching Rust scalar type.
#[macro_export]
macro_rules! dispatch_primitive {
    ($kind:expr, $t:ident => $body:expr) => {
        match $kind {
            $crate::PrimitiveKind::Boolean => {
                type $t = bool;
                $body
            }
            $crate::PrimitiveKind::Char => {
                type $t = u16;
                $body
            }
            $crate::PrimitiveKind::Byte => {
                type $t = i8;
                $body
            }
            $crate::PrimitiveKind::Short => {
                type $t = i16;
                $body
            }
            $crate::PrimitiveKind::Int => {
                type $t = i32;
                $body
            }
            $crate::PrimitiveKind::Long => {
                type $t = i64;
                $body
            }
            $crate::PrimitiveKind::Float => {
                type $t = f32;
                $body
            }
            $crate::PrimitiveKind::Double => {
                type $t = f64;
                $body
            }
        }
    };
}

/// Access to the primitive slice stored in a [`Value`].
pub trait PrimitiveElement: Copy + Send + Sync + 'static {
    const KIND: PrimitiveKind;

    fn slice(value: &Value) -> Option<&[Self]>;

    fn wrap(values: Arc<[Self]>) -> Value;
}

macro_rules! primitive_elements {
    ($($t:ty => $kind:ident, $array:ident);+ $(;)?) => {
        $(
            impl PrimitiveElement for $t {
                const KIND: PrimitiveKind = PrimitiveKind::$kind;

                #[inline]
                fn slice(value: &Value) -> Option<&[Self]> {
                    match value {
                        Value::$array(values) => Some(values),
                        _ => None,
                    }
                }

                fn wrap(values: Arc<[Self]>) -> Value {
                    Value::$array(values)
                }
            }
        )+
    };
}

primitive_elements! {
    bool => Boolean, BooleanArray;
    u16 => Char, CharArray;
    i8 => Byte, ByteArray;
    i16 => Short, ShortArray;
    i32 => Int, IntArray;
    i64 => Long, LongArray;
    f32 => Float, FloatArray;
    f64 => Double, DoubleArray;
}
