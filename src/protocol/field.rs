//! Field Kinds: tipe apa saja yang boleh di-pack/unpack
//!
//! Kategori yang tidak didukung (pointer, reference, function, unit, object
//! generik) tidak punya impl, jadi ditolak saat compile, bukan saat runtime.
//!
//! - [`Field`]: value ukuran tetap (arithmetic, enum, struct, union)
//! - [`Plain`]: struct/union yang di-copy sebagai memory image mentah
//! - [`Pack`] / [`Unpack`]: semua yang bisa jadi fragment bertag

use std::mem;
use std::ptr;

use super::metadata::{DataType, Metadata};
use crate::core::{Chunk, ChunkRef};
use crate::error::{Error, Result};

/// Value dengan ukuran encoded yang tetap.
///
/// `encode` selalu menerima buffer tepat `SIZE` bytes, dan `decode`
/// selalu dipanggil dengan slice tepat `SIZE` bytes.
pub trait Field: Sized {
    /// Tag yang ditulis ke metadata
    const DATA_TYPE: DataType;
    /// Ukuran payload dalam bytes
    const SIZE: usize;

    fn encode(&self, out: &mut [u8]);

    fn decode(bytes: &[u8]) -> Result<Self>;
}

/// Plain-old-data yang di-serialize sebagai memory image native.
///
/// # Safety
/// - Layout harus stabil (`#[repr(C)]`, `#[repr(C, packed)]`, `#[repr(transparent)]`)
/// - Tidak boleh ada padding byte
/// - Semua bit pattern harus valid untuk `Self`
pub unsafe trait Plain: Copy + 'static {
    /// `Struct` secara default; union override ke `DataType::Union`
    const DATA_TYPE: DataType = DataType::Struct;
}

impl<T: Plain> Field for T {
    const DATA_TYPE: DataType = <T as Plain>::DATA_TYPE;
    const SIZE: usize = mem::size_of::<T>();

    #[inline(always)]
    fn encode(&self, out: &mut [u8]) {
        // SAFETY: Plain menjamin tidak ada padding, semua byte initialized
        let image = unsafe {
            std::slice::from_raw_parts(self as *const T as *const u8, mem::size_of::<T>())
        };
        out.copy_from_slice(image);
    }

    #[inline(always)]
    fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != mem::size_of::<T>() {
            return Err(Error::Truncated {
                needed: mem::size_of::<T>(),
                available: bytes.len(),
            });
        }
        // SAFETY: panjang sudah dicek, Plain menjamin semua bit pattern valid.
        // Source bisa unaligned di tengah chunk.
        Ok(unsafe { ptr::read_unaligned(bytes.as_ptr() as *const T) })
    }
}

macro_rules! impl_arithmetic {
    ($($t:ty),* $(,)?) => {
        $(
            impl Field for $t {
                const DATA_TYPE: DataType = DataType::Arithmetic;
                const SIZE: usize = mem::size_of::<$t>();

                #[inline(always)]
                fn encode(&self, out: &mut [u8]) {
                    out.copy_from_slice(&self.to_le_bytes());
                }

                #[inline(always)]
                fn decode(bytes: &[u8]) -> Result<Self> {
                    let raw = bytes.try_into().map_err(|_| Error::Truncated {
                        needed: mem::size_of::<$t>(),
                        available: bytes.len(),
                    })?;
                    Ok(<$t>::from_le_bytes(raw))
                }
            }
        )*
    };
}

impl_arithmetic!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, f32, f64);

impl Field for bool {
    const DATA_TYPE: DataType = DataType::Arithmetic;
    const SIZE: usize = 1;

    #[inline(always)]
    fn encode(&self, out: &mut [u8]) {
        out[0] = u8::from(*self);
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        match bytes {
            [0] => Ok(false),
            [1] => Ok(true),
            _ => Err(Error::InvalidValue {
                data_type: DataType::Arithmetic,
                reason: "bool byte must be 0 or 1",
            }),
        }
    }
}

impl Field for char {
    const DATA_TYPE: DataType = DataType::Arithmetic;
    const SIZE: usize = 4;

    #[inline(always)]
    fn encode(&self, out: &mut [u8]) {
        out.copy_from_slice(&u32::from(*self).to_le_bytes());
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let scalar = u32::decode(bytes)?;
        char::from_u32(scalar).ok_or(Error::InvalidValue {
            data_type: DataType::Arithmetic,
            reason: "not a unicode scalar value",
        })
    }
}

/// Sumber fragment bertag untuk `Serializer::pack`
pub trait Pack {
    /// Metadata dan fragment payload untuk value ini
    fn fragment(&self) -> (Metadata, ChunkRef);
}

impl<T: Field> Pack for T {
    fn fragment(&self) -> (Metadata, ChunkRef) {
        let size = <T as Field>::SIZE;
        let mut chunk = Chunk::new(size);
        self.encode(chunk.as_bytes_mut());
        (Metadata::new(<T as Field>::DATA_TYPE, size), chunk.into_ref())
    }
}

impl Pack for str {
    /// Isi string + 1 byte terminator, string kosong tetap 1 byte
    fn fragment(&self) -> (Metadata, ChunkRef) {
        let size = self.len() + 1;
        let mut chunk = Chunk::new(size);
        chunk.as_bytes_mut()[..self.len()].copy_from_slice(self.as_bytes());
        (Metadata::new(DataType::String, size), chunk.into_ref())
    }
}

impl Pack for String {
    #[inline]
    fn fragment(&self) -> (Metadata, ChunkRef) {
        self.as_str().fragment()
    }
}

impl Pack for ChunkRef {
    /// Alias ke chunk caller; byte baru di-copy saat `combine`
    fn fragment(&self) -> (Metadata, ChunkRef) {
        let size = self.borrow().map_or(0, |c| c.size());
        (Metadata::new(DataType::Binary, size), self.ref_copy())
    }
}

impl Pack for Chunk {
    fn fragment(&self) -> (Metadata, ChunkRef) {
        (
            Metadata::new(DataType::Binary, self.size()),
            self.clone().into_ref(),
        )
    }
}

impl Pack for [u8] {
    fn fragment(&self) -> (Metadata, ChunkRef) {
        (
            Metadata::new(DataType::Binary, self.len()),
            Chunk::from_slice(self).into_ref(),
        )
    }
}

/// Target untuk `Serializer::unpack`
pub trait Unpack: Sized {
    const DATA_TYPE: DataType;
    /// `None` untuk field dengan ukuran variabel
    const SIZE: Option<usize>;

    /// Apakah metadata di depan queue cocok dengan tipe ini
    #[inline]
    fn accepts(md: &Metadata) -> bool {
        md.data_type == Self::DATA_TYPE && Self::SIZE.map_or(true, |size| size == md.size)
    }

    /// Decode tepat `md.size` bytes payload
    fn unpack_from(bytes: &[u8]) -> Result<Self>;
}

impl<T: Field> Unpack for T {
    const DATA_TYPE: DataType = <T as Field>::DATA_TYPE;
    const SIZE: Option<usize> = Some(<T as Field>::SIZE);

    #[inline(always)]
    fn unpack_from(bytes: &[u8]) -> Result<Self> {
        T::decode(bytes)
    }
}

impl Unpack for String {
    const DATA_TYPE: DataType = DataType::String;
    const SIZE: Option<usize> = None;

    fn accepts(md: &Metadata) -> bool {
        md.data_type == DataType::String && md.size > 0
    }

    fn unpack_from(bytes: &[u8]) -> Result<Self> {
        let Some((&0, content)) = bytes.split_last() else {
            return Err(Error::InvalidValue {
                data_type: DataType::String,
                reason: "missing terminator byte",
            });
        };

        String::from_utf8(content.to_vec()).map_err(|_| Error::InvalidValue {
            data_type: DataType::String,
            reason: "invalid utf-8",
        })
    }
}

impl Unpack for Chunk {
    const DATA_TYPE: DataType = DataType::Binary;
    const SIZE: Option<usize> = None;

    #[inline]
    fn unpack_from(bytes: &[u8]) -> Result<Self> {
        Ok(Chunk::from_slice(bytes))
    }
}

impl Unpack for ChunkRef {
    const DATA_TYPE: DataType = DataType::Binary;
    const SIZE: Option<usize> = None;

    #[inline]
    fn unpack_from(bytes: &[u8]) -> Result<Self> {
        Ok(Chunk::from_slice(bytes).into_ref())
    }
}

impl Unpack for Vec<u8> {
    const DATA_TYPE: DataType = DataType::Binary;
    const SIZE: Option<usize> = None;

    #[inline]
    fn unpack_from(bytes: &[u8]) -> Result<Self> {
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Point {
        x: f64,
        y: i64,
    }

    unsafe impl Plain for Point {}

    #[repr(C)]
    #[derive(Clone, Copy)]
    union Word {
        int: u32,
        float: f32,
    }

    unsafe impl Plain for Word {
        const DATA_TYPE: DataType = DataType::Union;
    }

    fn payload<T: Pack + ?Sized>(value: &T) -> (Metadata, Vec<u8>) {
        let (md, fragment) = value.fragment();
        let bytes = fragment.borrow().unwrap().as_bytes().to_vec();
        (md, bytes)
    }

    #[test]
    fn test_arithmetic_sizes() {
        assert_eq!(payload(&42i32).0, Metadata::new(DataType::Arithmetic, 4));
        assert_eq!(payload(&true).0, Metadata::new(DataType::Arithmetic, 1));
        assert_eq!(payload(&1.5f64).0, Metadata::new(DataType::Arithmetic, 8));
        assert_eq!(payload(&42i32).1, vec![42, 0, 0, 0]);
    }

    #[test]
    fn test_plain_struct_image() {
        let p = Point { x: 1.25, y: 1_048_576 };
        let (md, bytes) = payload(&p);

        assert_eq!(md, Metadata::new(DataType::Struct, 16));
        assert_eq!(Point::unpack_from(&bytes).unwrap(), p);
    }

    #[test]
    fn test_union_tag() {
        let w = Word { float: 1.0 };
        let (md, bytes) = payload(&w);

        assert_eq!(md.data_type, DataType::Union);
        let back = Word::unpack_from(&bytes).unwrap();
        assert_eq!(unsafe { back.int }, 1.0f32.to_bits());
    }

    #[test]
    fn test_string_terminator() {
        let (md, bytes) = payload("hi");
        assert_eq!(md, Metadata::new(DataType::String, 3));
        assert_eq!(bytes, b"hi\0");

        let (md, bytes) = payload("");
        assert_eq!(md.size, 1);
        assert_eq!(String::unpack_from(&bytes).unwrap(), "");
    }

    #[test]
    fn test_string_rejects_bad_payload() {
        assert!(String::unpack_from(b"hi").is_err());
        assert!(String::unpack_from(&[0xFF, 0]).is_err());
        assert!(!String::accepts(&Metadata::new(DataType::String, 0)));
    }

    #[test]
    fn test_bool_and_char_validation() {
        assert!(bool::unpack_from(&[2]).is_err());
        assert!(char::unpack_from(&0xD800u32.to_le_bytes()).is_err());
        assert_eq!(char::unpack_from(&u32::from('C').to_le_bytes()).unwrap(), 'C');
    }

    #[test]
    fn test_accepts_checks_type_and_size() {
        let md = Metadata::new(DataType::Arithmetic, 4);
        assert!(i32::accepts(&md));
        assert!(u32::accepts(&md));
        assert!(!i64::accepts(&md));
        assert!(!Point::accepts(&md));
        assert!(!String::accepts(&md));
    }

    #[test]
    fn test_binary_ref_is_aliased() {
        let chunk = Chunk::from_slice(&[1, 2, 3]).into_ref();
        let (md, fragment) = chunk.fragment();

        assert_eq!(md, Metadata::new(DataType::Binary, 3));
        assert_eq!(fragment, chunk);
        assert_eq!(chunk.strong_count(), 2);
    }
}
