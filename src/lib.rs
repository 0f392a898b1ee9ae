//! Serialize - Type-Tagged Binary Serialization Engine
//!
//! Arsitektur:
//! - Shared handle: `Ref<T>` untuk fragment tanpa copy
//! - Chunk assembly: fragment digabung sekali jadi satu buffer
//! - Self-describing: header count + metadata di depan payload
//! - Fail loudly: mismatch dan input rusak jadi `Error`, bukan no-op

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;

pub use crate::config::SerializerConfig;
pub use crate::core::{Chunk, ChunkBuilder, ChunkFile, ChunkRef, Ref};
pub use crate::error::{Error, Result};
pub use crate::protocol::{DataType, Field, Metadata, Pack, Plain, Serializer, State, Unpack};
