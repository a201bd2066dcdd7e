use crate::error::{ChunkError, ChunkResult};
use keyspace_math::{LeafKind, PrimitiveKind, Value, ValueType};

/// Conventional number of rows processed per batch.
pub const DEFAULT_CHUNK_CAPACITY: usize = 4096;

/// A fixed-capacity output buffer with a logical size.
///
/// Storage is allocated once, up front. Kernels write positions `0..n` and then set the size to
/// `n`; nothing past the capacity is ever written.
#[derive(Clone, Debug, PartialEq)]
pub struct WritableChunk<T> {
    values: Vec<T>,
    size: usize,
}

impl<T: Clone + Default> WritableChunk<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: vec![T::default(); capacity],
            size: 0,
        }
    }
}

impl<T> WritableChunk<T> {
    /// Wraps `values` as a full chunk (size == capacity).
    pub fn from_vec(values: Vec<T>) -> Self {
        let size = values.len();
        Self { values, size }
    }

    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn set_size(&mut self, size: usize) -> ChunkResult<()> {
        if size > self.values.len() {
            return Err(ChunkError::SizeExceedsCapacity {
                size,
                capacity: self.values.len(),
            });
        }
        self.size = size;
        Ok(())
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values[..self.size]
    }

    /// The whole backing storage, regardless of the logical size.
    pub(crate) fn storage_mut(&mut self) -> &mut [T] {
        &mut self.values
    }

    pub fn get(&self, position: usize) -> Option<&T> {
        self.as_slice().get(position)
    }

    pub fn set(&mut self, position: usize, value: T) -> ChunkResult<()> {
        let capacity = self.values.len();
        let slot = self
            .values
            .get_mut(position)
            .ok_or(ChunkError::PositionOutOfBounds {
                position,
                size: capacity,
            })?;
        *slot = value;
        Ok(())
    }

    pub fn into_vec(mut self) -> Vec<T> {
        self.values.truncate(self.size);
        self.values
    }

    /// Checks that `required` positions fit, before anything is written.
    pub(crate) fn ensure_fits(&self, required: usize) -> ChunkResult<()> {
        if required > self.values.len() {
            return Err(ChunkError::DestinationTooSmall {
                required,
                capacity: self.values.len(),
            });
        }
        Ok(())
    }

    /// Checks that the current logical size is exactly `expected`.
    pub(crate) fn ensure_size(&self, expected: usize) -> ChunkResult<()> {
        if self.size != expected {
            return Err(ChunkError::LengthMismatch {
                expected,
                actual: self.size,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChunkType {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Object,
}

impl ChunkType {
    /// The chunk type that carries values of type `ty`: bare primitives get their own chunk
    /// type, everything else (text, arrays, `any`) travels as objects.
    pub fn for_value_type(ty: ValueType) -> ChunkType {
        match (ty.depth(), ty.leaf()) {
            (0, LeafKind::Primitive(kind)) => kind.into(),
            _ => ChunkType::Object,
        }
    }
}

impl From<PrimitiveKind> for ChunkType {
    fn from(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::Boolean => ChunkType::Boolean,
            PrimitiveKind::Char => ChunkType::Char,
            PrimitiveKind::Byte => ChunkType::Byte,
            PrimitiveKind::Short => ChunkType::Short,
            PrimitiveKind::Int => ChunkType::Int,
            PrimitiveKind::Long => ChunkType::Long,
            PrimitiveKind::Float => ChunkType::Float,
            PrimitiveKind::Double => ChunkType::Double,
        }
    }
}

/// A read-only, typed view of a run of values.
#[derive(Clone, Copy, Debug)]
pub enum ChunkRef<'a> {
    Boolean(&'a [bool]),
    Char(&'a [u16]),
    Byte(&'a [i8]),
    Short(&'a [i16]),
    Int(&'a [i32]),
    Long(&'a [i64]),
    Float(&'a [f32]),
    Double(&'a [f64]),
    Object(&'a [Value]),
}

impl<'a> ChunkRef<'a> {
    pub fn chunk_type(&self) -> ChunkType {
        match self {
            ChunkRef::Boolean(_) => ChunkType::Boolean,
            ChunkRef::Char(_) => ChunkType::Char,
            ChunkRef::Byte(_) => ChunkType::Byte,
            ChunkRef::Short(_) => ChunkType::Short,
            ChunkRef::Int(_) => ChunkType::Int,
            ChunkRef::Long(_) => ChunkType::Long,
            ChunkRef::Float(_) => ChunkType::Float,
            ChunkRef::Double(_) => ChunkType::Double,
            ChunkRef::Object(_) => ChunkType::Object,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ChunkRef::Boolean(v) => v.len(),
            ChunkRef::Char(v) => v.len(),
            ChunkRef::Byte(v) => v.len(),
            ChunkRef::Short(v) => v.len(),
            ChunkRef::Int(v) => v.len(),
            ChunkRef::Long(v) => v.len(),
            ChunkRef::Float(v) => v.len(),
            ChunkRef::Double(v) => v.len(),
            ChunkRef::Object(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A Rust type that has a [`ChunkRef`] variant.
pub trait ChunkElement: Sized + Send + Sync + 'static {
    const CHUNK_TYPE: ChunkType;

    fn chunk_ref(values: &[Self]) -> ChunkRef<'_>;

    fn slice(chunk: ChunkRef<'_>) -> Option<&[Self]>;
}

macro_rules! chunk_elements {
    ($($t:ty => $variant:ident),+ $(,)?) => {
        $(
            impl ChunkElement for $t {
                const CHUNK_TYPE: ChunkType = ChunkType::$variant;

                fn chunk_ref(values: &[Self]) -> ChunkRef<'_> {
                    ChunkRef::$variant(values)
                }

                #[inline]
                fn slice(chunk: ChunkRef<'_>) -> Option<&[Self]> {
                    match chunk {
                        ChunkRef::$variant(values) => Some(values),
                        _ => None,
                    }
                }
            }

            impl<'a> From<&'a [$t]> for ChunkRef<'a> {
                fn from(values: &'a [$t]) -> Self {
                    ChunkRef::$variant(values)
                }
            }
        )+
    };
}

chunk_elements! {
    bool => Boolean,
    u16 => Char,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    Value => Object,
}

impl<'a, T: ChunkElement> From<&'a WritableChunk<T>> for ChunkRef<'a> {
    fn from(chunk: &'a WritableChunk<T>) -> Self {
        T::chunk_ref(chunk.as_slice())
    }
}
