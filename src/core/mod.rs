//! Core module: Buffer assembly dengan shared fragment
//!
//! Prinsip desain:
//! - Shared ownership: builder dan serializer memegang handle, bukan byte copy
//! - Single copy: fragment hanya di-copy sekali, saat `combine`
//! - Single-threaded: tidak ada locking, tidak ada atomic

mod builder;
mod chunk;
mod handle;
mod storage;

pub use builder::ChunkBuilder;
pub use chunk::{Chunk, ChunkRef};
pub use handle::Ref;
pub use storage::ChunkFile;
