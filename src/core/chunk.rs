//! Chunk: byte buffer dengan ukuran tetap
//!
//! Chunk meng-own storage-nya secara eksklusif. Ukuran tidak bisa berubah
//! setelah konstruksi; isi hanya diganti utuh (clone/take).

use super::handle::Ref;

/// Shared handle ke sebuah Chunk (fragment).
pub type ChunkRef = Ref<Chunk>;

/// Owned byte buffer dengan ukuran tetap
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Chunk {
    data: Box<[u8]>,
}

impl Chunk {
    /// Chunk kosong (size 0), tanpa alokasi.
    #[inline(always)]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Alokasi chunk baru dengan `size` bytes (zero-filled).
    #[inline]
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size].into_boxed_slice(),
        }
    }

    /// Deep copy dari slice
    #[inline]
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            data: bytes.into(),
        }
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Akses mutable ke isi buffer. Ukuran tetap tidak berubah.
    #[inline(always)]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Pindahkan buffer keluar, meninggalkan chunk ini kosong.
    #[inline]
    pub fn take(&mut self) -> Chunk {
        std::mem::take(self)
    }

    /// Bungkus ke shared handle baru (count = 1).
    #[inline]
    pub fn into_ref(self) -> ChunkRef {
        Ref::new(self)
    }
}

impl From<Vec<u8>> for Chunk {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            data: bytes.into_boxed_slice(),
        }
    }
}

impl From<&[u8]> for Chunk {
    fn from(bytes: &[u8]) -> Self {
        Self::from_slice(bytes)
    }
}

impl AsRef<[u8]> for Chunk {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_chunk() {
        let chunk = Chunk::new(0);
        assert_eq!(chunk.size(), 0);
        assert!(chunk.is_empty());
        assert_eq!(chunk.as_bytes(), &[] as &[u8]);
    }

    #[test]
    fn test_from_slice_deep_copies() {
        let mut source = [1u8, 2, 3];
        let chunk = Chunk::from_slice(&source);
        source[0] = 9;

        assert_eq!(chunk.size(), 3);
        assert_eq!(chunk.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut a = Chunk::from_slice(b"abc");
        let b = a.clone();
        a.as_bytes_mut()[0] = b'z';

        assert_eq!(b.as_bytes(), b"abc");
        assert_ne!(a.as_bytes().as_ptr(), b.as_bytes().as_ptr());
    }

    #[test]
    fn test_take_leaves_source_empty() {
        let mut a = Chunk::from_slice(b"payload");
        let ptr = a.as_bytes().as_ptr();
        let b = a.take();

        assert_eq!(a.size(), 0);
        assert_eq!(b.size(), 7);
        // Buffer dipindah, bukan di-copy
        assert_eq!(b.as_bytes().as_ptr(), ptr);
    }
}
