//! Vectorized hashing and equality over chunks of key values.
//!
//! Factories are keyed by semantics, value type and traversal and resolve all dispatch once;
//! the returned adapters only loop over caller-provided buffers and never allocate.

#![forbid(unsafe_code)]

mod chunk;
mod equals;
mod error;
mod hasher;
mod kernel;

pub use crate::chunk::{ChunkElement, ChunkRef, ChunkType, WritableChunk, DEFAULT_CHUNK_CAPACITY};
pub use crate::equals::{chunk_equals, ChunkEquals};
pub use crate::error::{ChunkError, ChunkResult};
pub use crate::hasher::{
    chunk_hasher, hash_initial_single, hash_update_single, scramble, update_hash, ChunkHasher,
};
