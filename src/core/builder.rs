//! Chunk Builder: kumpulan fragment yang digabung jadi satu Chunk
//!
//! Builder hanya memegang shared handle, tidak pernah raw ownership.
//! `combine` bersifat destruktif: builder kosong lagi setelahnya.

use std::collections::VecDeque;

use tracing::trace;

use super::chunk::{Chunk, ChunkRef};

/// Urutan fragment = urutan output, persis seperti di-append/prepend.
#[derive(Debug, Default, Clone)]
pub struct ChunkBuilder {
    fragments: VecDeque<ChunkRef>,
}

impl ChunkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tambah fragment di ekor
    #[inline]
    pub fn append(&mut self, fragment: ChunkRef) {
        self.fragments.push_back(fragment);
    }

    /// Tambah fragment di kepala
    #[inline]
    pub fn prepend(&mut self, fragment: ChunkRef) {
        self.fragments.push_front(fragment);
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Jumlah fragment dalam antrian
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Ukuran terkini setiap fragment, urut seperti output (null = 0)
    pub fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.fragments
            .iter()
            .map(|f| f.borrow().map_or(0, |c| c.size()))
    }

    /// Total bytes semua fragment (fragment null dihitung 0)
    pub fn total_size(&self) -> usize {
        self.sizes().sum()
    }

    /// Lepas semua share ke fragment.
    pub fn clear(&mut self) {
        self.fragments.clear();
    }

    /// Gabungkan semua fragment ke satu Chunk baru, lalu kosongkan builder.
    ///
    /// Chunk hasil adalah copy independen, bukan alias ke fragment manapun.
    pub fn combine(&mut self) -> ChunkRef {
        let total_size = self.total_size();
        let mut combined = Chunk::new(total_size);

        let out = combined.as_bytes_mut();
        let mut offset = 0;

        for fragment in self.fragments.drain(..) {
            let Some(chunk) = fragment.borrow() else {
                continue;
            };

            let size = chunk.size();
            if size > 0 {
                out[offset..offset + size].copy_from_slice(chunk.as_bytes());
                offset += size;
            }
        }

        trace!(total_size, "combined fragments");

        combined.into_ref()
    }
}
