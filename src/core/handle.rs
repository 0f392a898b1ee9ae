//! Shared Handle: reference-counted ownership untuk heap value
//!
//! Counting dilakukan oleh `Rc` per-object, bukan tabel global yang di-key
//! dengan address. Single-threaded: `Ref<T>` sengaja tidak `Send`/`Sync`.
//!
//! Vocabulary:
//! - `ref_copy`: alias ke pointee yang sama (count +1)
//! - `shallow_copy`: clone logis ke storage baru (count sendiri = 1)
//! - `binary_copy`: copy byte-for-byte ke storage baru (count sendiri = 1)

use std::cell::{Ref as Borrowed, RefCell, RefMut};
use std::fmt;
use std::mem::{self, MaybeUninit};
use std::ptr;
use std::rc::Rc;

/// Handle dengan shared ownership, boleh null.
///
/// Dua handle sama (`==`) jika dan hanya jika menunjuk address yang sama.
pub struct Ref<T> {
    inner: Option<Rc<RefCell<T>>>,
}

impl<T> Ref<T> {
    /// Handle null, tidak ikut counting.
    #[inline(always)]
    pub const fn null() -> Self {
        Self { inner: None }
    }

    /// Alokasi value baru di heap, count = 1.
    #[inline]
    pub fn new(value: T) -> Self {
        Self {
            inner: Some(Rc::new(RefCell::new(value))),
        }
    }

    /// Ambil alih value dari `Box`.
    ///
    /// Value di-move keluar lalu dialokasi ulang di dalam `Rc`; alokasi
    /// `Box` lama di-free, bukan dipakai ulang.
    #[inline]
    pub fn from_box(value: Box<T>) -> Self {
        Self::new(*value)
    }

    #[inline(always)]
    pub fn is_null(&self) -> bool {
        self.inner.is_none()
    }

    /// Jumlah handle hidup untuk pointee ini (0 untuk null).
    #[inline(always)]
    pub fn strong_count(&self) -> usize {
        self.inner.as_ref().map_or(0, Rc::strong_count)
    }

    /// Handle kedua ke pointee yang sama.
    #[inline(always)]
    pub fn ref_copy(&self) -> Self {
        self.clone()
    }

    /// Lepas handle ini, return sisa count setelah decrement.
    ///
    /// Pointee di-free saat return value 0.
    pub fn release(self) -> usize {
        match self.inner {
            Some(rc) => {
                let remaining = Rc::strong_count(&rc) - 1;
                drop(rc);
                remaining
            }
            None => 0,
        }
    }

    /// Borrow pointee. `None` untuk handle null.
    ///
    /// # Panics
    /// Panic jika pointee sedang di-borrow mutable lewat alias lain.
    #[inline]
    pub fn borrow(&self) -> Option<Borrowed<'_, T>> {
        self.inner.as_ref().map(|cell| cell.borrow())
    }

    /// Borrow pointee secara mutable. Perubahan terlihat dari semua alias.
    ///
    /// # Panics
    /// Panic jika pointee sedang di-borrow lewat alias lain.
    #[inline]
    pub fn borrow_mut(&self) -> Option<RefMut<'_, T>> {
        self.inner.as_ref().map(|cell| cell.borrow_mut())
    }

    /// Ganti isi pointee untuk semua alias, return value lama.
    pub fn replace(&self, value: T) -> Option<T> {
        self.inner.as_ref().map(|cell| cell.replace(value))
    }

    /// Address pointee, null pointer untuk handle null.
    #[inline(always)]
    pub fn as_ptr(&self) -> *const T {
        self.inner
            .as_ref()
            .map_or(ptr::null(), |cell| cell.as_ptr() as *const T)
    }

    #[inline(always)]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.inner, &other.inner) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }

    /// Ambil value keluar jika ini handle terakhir.
    pub fn try_unwrap(self) -> Result<T, Self> {
        match self.inner {
            Some(rc) => Rc::try_unwrap(rc)
                .map(RefCell::into_inner)
                .map_err(|rc| Self { inner: Some(rc) }),
            None => Err(Self::null()),
        }
    }
}

impl<T: Clone> Ref<T> {
    /// Handle baru ke clone logis dari pointee, storage terpisah.
    pub fn shallow_copy(&self) -> Self {
        match self.borrow() {
            Some(value) => Self::new(value.clone()),
            None => Self::null(),
        }
    }
}

impl<T: Copy> Ref<T> {
    /// Handle baru ke copy byte-for-byte dari memory image pointee.
    pub fn binary_copy(&self) -> Self {
        let Some(value) = self.borrow() else {
            return Self::null();
        };

        let mut image = MaybeUninit::<T>::uninit();

        // SAFETY: T: Copy, jadi image byte-for-byte adalah value yang valid
        // dan tidak ada Drop yang bisa double-free.
        let copied = unsafe {
            ptr::copy_nonoverlapping(
                &*value as *const T as *const u8,
                image.as_mut_ptr() as *mut u8,
                mem::size_of::<T>(),
            );
            image.assume_init()
        };

        Self::new(copied)
    }
}

impl<T> Clone for Ref<T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Default for Ref<T> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Eq for Ref<T> {}

impl<T> From<T> for Ref<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ref")
            .field("addr", &self.as_ptr())
            .field("count", &self.strong_count())
            .finish()
    }
}
