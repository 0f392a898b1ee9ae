//! Memory-Mapped Chunk File
//!
//! Chunk hasil `to_binary` bisa disimpan ke disk lalu di-mmap kembali:
//! - Zero-copy read: header bisa di-parse langsung dari page cache
//! - Whole-payload: `to_chunk` selalu materialize seluruh isi file

use memmap2::{Mmap, MmapOptions};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use tracing::debug;

use super::chunk::Chunk;
use crate::error::Result;

/// File read-only yang di-mmap, berisi satu Chunk utuh
pub struct ChunkFile {
    // None untuk file kosong: mmap dengan panjang 0 tidak portable
    mmap: Option<Mmap>,
}

impl ChunkFile {
    /// Tulis chunk ke `path` (truncate jika sudah ada).
    pub fn write<P: AsRef<Path>>(path: P, chunk: &Chunk) -> Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.as_ref())?;

        file.write_all(chunk.as_bytes())?;
        file.sync_all()?;

        debug!(path = %path.as_ref().display(), size = chunk.size(), "chunk written");
        Ok(())
    }

    /// Buka dan mmap file chunk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let len = file.metadata()?.len() as usize;

        let mmap = if len == 0 {
            None
        } else {
            // SAFETY: File dibuka read-only; caller tidak boleh memodifikasi
            // file selama ChunkFile masih hidup.
            Some(unsafe { MmapOptions::new().len(len).map(&file)? })
        };

        debug!(path = %path.as_ref().display(), size = len, "chunk file mapped");
        Ok(Self { mmap })
    }

    /// Isi file (zero-copy via slice ke mmap region)
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy seluruh isi file ke Chunk baru di memory.
    pub fn to_chunk(&self) -> Chunk {
        Chunk::from_slice(self.as_bytes())
    }
}
