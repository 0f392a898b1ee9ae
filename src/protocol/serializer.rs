//! Stateful Pack/Unpack Session
//!
//! Pack: setiap field jadi satu fragment di builder + satu metadata record.
//! `to_binary` prepend header (count, lalu array metadata) dan combine.
//!
//! Unpack: `from_binary` parse header ke queue metadata, setiap `unpack`
//! pop satu entry dari depan queue dan copy byte range yang sesuai.

use std::collections::VecDeque;
use std::mem;

use tracing::{debug, trace, warn};

use super::field::{Pack, Unpack};
use super::metadata::{decode_header, encode_count, encode_records, Metadata};
use crate::config::SerializerConfig;
use crate::core::{Chunk, ChunkBuilder, ChunkRef};
use crate::error::{Error, Result};

/// State serializer yang terlihat dari luar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Packing,
    Unpacking,
}

impl State {
    fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Packing => "packing",
            Self::Unpacking => "unpacking",
        }
    }
}

/// Data session, hanya valid di state yang bersangkutan
#[derive(Debug)]
enum Session {
    Idle,
    Packing {
        builder: ChunkBuilder,
        fields: Vec<Metadata>,
    },
    Unpacking {
        source: ChunkRef,
        fields: VecDeque<Metadata>,
        cursor: usize,
    },
}

/// Pack/unpack session. Tidak reentrant, satu thread.
///
/// ```
/// use serialize::Serializer;
///
/// let mut ser = Serializer::new();
/// ser.pack(&42i32)?.pack(&true)?.pack("hi")?;
/// let chunk = ser.to_binary()?;
///
/// let mut de = Serializer::new();
/// de.from_binary(&chunk)?;
/// assert_eq!(de.unpack::<i32>()?, 42);
/// assert!(de.unpack::<bool>()?);
/// assert_eq!(de.unpack::<String>()?, "hi");
/// # Ok::<(), serialize::Error>(())
/// ```
#[derive(Debug)]
pub struct Serializer {
    session: Session,
    config: SerializerConfig,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer {
    pub fn new() -> Self {
        Self::with_config(SerializerConfig::default())
    }

    pub fn with_config(config: SerializerConfig) -> Self {
        Self {
            session: Session::Idle,
            config,
        }
    }

    #[inline(always)]
    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> State {
        match self.session {
            Session::Idle => State::Idle,
            Session::Packing { .. } => State::Packing,
            Session::Unpacking { .. } => State::Unpacking,
        }
    }

    /// Buang session apapun yang sedang berjalan, kembali ke Idle.
    pub fn reset(&mut self) {
        if self.state() != State::Idle {
            debug!(state = self.state().as_str(), "session discarded");
        }
        self.session = Session::Idle;
    }

    /// Jumlah field yang sudah di-pack di session ini
    pub fn packed(&self) -> usize {
        match &self.session {
            Session::Packing { fields, .. } => fields.len(),
            _ => 0,
        }
    }

    /// Jumlah field yang belum di-unpack
    pub fn remaining(&self) -> usize {
        match &self.session {
            Session::Unpacking { fields, .. } => fields.len(),
            _ => 0,
        }
    }

    /// Metadata field berikutnya tanpa pop
    pub fn peek(&self) -> Option<Metadata> {
        match &self.session {
            Session::Unpacking { fields, .. } => fields.front().copied(),
            _ => None,
        }
    }

    fn invalid(&self, operation: &'static str) -> Error {
        Error::InvalidState {
            operation,
            state: self.state().as_str(),
        }
    }

    // ========================================================================
    // Pack path
    // ========================================================================

    /// Append satu field. Urutan panggilan = urutan serialisasi.
    pub fn pack<V: Pack + ?Sized>(&mut self, value: &V) -> Result<&mut Self> {
        match self.session {
            Session::Unpacking { .. } => return Err(self.invalid("pack")),
            Session::Idle => {
                debug!("pack session started");
                self.session = Session::Packing {
                    builder: ChunkBuilder::new(),
                    fields: Vec::new(),
                };
            }
            Session::Packing { .. } => {}
        }

        let (md, fragment) = value.fragment();

        if let Session::Packing { builder, fields } = &mut self.session {
            trace!(index = fields.len(), field = %md, "packed");
            builder.append(fragment);
            fields.push(md);
        }

        Ok(self)
    }

    /// Finalize: prepend header, combine semua fragment, reset ke Idle.
    ///
    /// Serializer Idle menghasilkan chunk dengan field count 0.
    pub fn to_binary(&mut self) -> Result<ChunkRef> {
        let (mut builder, mut fields) = match mem::replace(&mut self.session, Session::Idle) {
            Session::Packing { builder, fields } => (builder, fields),
            Session::Idle => (ChunkBuilder::new(), Vec::new()),
            unpacking @ Session::Unpacking { .. } => {
                self.session = unpacking;
                return Err(self.invalid("finalize"));
            }
        };

        // Fragment binary masih alias ke chunk caller; ukuran diambil ulang
        // saat finalize supaya header cocok dengan byte yang di-combine.
        for (md, size) in fields.iter_mut().zip(builder.sizes()) {
            if md.size != size {
                debug!(from = md.size, to = size, "aliased fragment resized before finalize");
                md.size = size;
            }
        }

        builder.prepend(encode_records(&fields).into_ref());
        builder.prepend(encode_count(fields.len()).into_ref());

        let chunk = builder.combine();
        debug!(
            fields = fields.len(),
            size = chunk.borrow().map_or(0, |c| c.size()),
            "pack session finished"
        );

        Ok(chunk)
    }

    // ========================================================================
    // Unpack path
    // ========================================================================

    /// Bind source chunk dan parse header-nya.
    ///
    /// Source di-share (tidak di-copy) sampai session selesai. Header yang
    /// rusak atau terpotong ditolak dan serializer tetap Idle.
    pub fn from_binary(&mut self, chunk: &ChunkRef) -> Result<&mut Self> {
        if self.state() != State::Idle {
            return Err(self.invalid("bind source"));
        }

        let header = {
            let source = chunk.borrow().ok_or(Error::NullHandle)?;
            let header = decode_header(source.as_bytes(), &self.config)?;

            let trailing = source.size() - header.payload_offset - header.payload_size;
            if trailing > 0 {
                debug!(trailing, "ignoring bytes after declared payload");
            }
            header
        };

        debug!(fields = header.fields.len(), "unpack session started");

        if header.fields.is_empty() {
            return Ok(self);
        }

        self.session = Session::Unpacking {
            source: chunk.ref_copy(),
            fields: header.fields,
            cursor: header.payload_offset,
        };

        Ok(self)
    }

    /// `from_binary` untuk raw byte slice (di-copy ke chunk baru).
    pub fn from_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self> {
        self.from_binary(&Chunk::from_slice(bytes).into_ref())
    }

    /// Pop field berikutnya sebagai `T`.
    ///
    /// Jika metadata di depan tidak cocok dengan `T`, return
    /// [`Error::TypeMismatch`] tanpa pop dan tanpa menggeser cursor.
    pub fn unpack<T: Unpack>(&mut self) -> Result<T> {
        match self.state() {
            State::Idle => return Err(Error::Exhausted),
            State::Packing => return Err(self.invalid("unpack")),
            State::Unpacking => {}
        }

        let Session::Unpacking {
            source,
            fields,
            cursor,
        } = &mut self.session
        else {
            return Err(Error::Exhausted);
        };

        let md = *fields.front().ok_or(Error::Exhausted)?;

        if !T::accepts(&md) {
            warn!(
                requested = ?T::DATA_TYPE,
                found = %md,
                "unpack type mismatch, field left in queue"
            );
            return Err(Error::TypeMismatch {
                expected: T::DATA_TYPE,
                expected_size: T::SIZE,
                found: md,
            });
        }

        let value = {
            let chunk = source.borrow().ok_or(Error::NullHandle)?;
            let bytes = chunk.as_bytes();

            let end = cursor.saturating_add(md.size);
            if end > bytes.len() {
                return Err(Error::Truncated {
                    needed: end,
                    available: bytes.len(),
                });
            }

            T::unpack_from(&bytes[*cursor..end])?
        };

        *cursor += md.size;
        fields.pop_front();
        trace!(field = %md, cursor = *cursor, "unpacked");

        if fields.is_empty() {
            debug!("unpack session finished");
            self.session = Session::Idle;
        }

        Ok(value)
    }

    /// Bentuk chainable dari `unpack`, menulis hasil ke `out`.
    pub fn unpack_into<T: Unpack>(&mut self, out: &mut T) -> Result<&mut Self> {
        *out = self.unpack()?;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::metadata::{COUNT_SIZE, RECORD_SIZE};
    use crate::protocol::DataType;

    #[test]
    fn test_pack_layout() {
        let mut ser = Serializer::new();
        ser.pack(&42i32).unwrap().pack(&true).unwrap().pack("hi").unwrap();
        assert_eq!(ser.state(), State::Packing);
        assert_eq!(ser.packed(), 3);

        let chunk = ser.to_binary().unwrap();
        assert_eq!(ser.state(), State::Idle);

        let chunk = chunk.borrow().unwrap();
        let bytes = chunk.as_bytes();
        let header_len = COUNT_SIZE + 3 * RECORD_SIZE;

        assert_eq!(bytes.len(), header_len + 4 + 1 + 3);
        assert_eq!(&bytes[..COUNT_SIZE], &3u64.to_le_bytes());
        assert_eq!(
            &bytes[COUNT_SIZE..COUNT_SIZE + RECORD_SIZE],
            &Metadata::new(DataType::Arithmetic, 4).to_bytes()
        );
        assert_eq!(
            &bytes[COUNT_SIZE + 2 * RECORD_SIZE..header_len],
            &Metadata::new(DataType::String, 3).to_bytes()
        );
        assert_eq!(&bytes[header_len..], &[42, 0, 0, 0, 1, b'h', b'i', 0]);
    }

    #[test]
    fn test_idle_to_binary_is_empty_header() {
        let mut ser = Serializer::new();
        let chunk = ser.to_binary().unwrap();
        assert_eq!(chunk.borrow().unwrap().as_bytes(), &0u64.to_le_bytes());

        let mut de = Serializer::new();
        de.from_binary(&chunk).unwrap();
        assert_eq!(de.state(), State::Idle);
        assert!(matches!(de.unpack::<i32>(), Err(Error::Exhausted)));
    }

    #[test]
    fn test_mismatch_does_not_consume() {
        let mut ser = Serializer::new();
        ser.pack(&7u16).unwrap().pack("next").unwrap();
        let chunk = ser.to_binary().unwrap();

        let mut de = Serializer::new();
        de.from_binary(&chunk).unwrap();

        let err = de.unpack::<u32>().unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                expected: DataType::Arithmetic,
                expected_size: Some(4),
                ..
            }
        ));
        assert!(de.unpack::<String>().is_err());
        assert_eq!(de.remaining(), 2);
        assert_eq!(de.peek(), Some(Metadata::new(DataType::Arithmetic, 2)));

        assert_eq!(de.unpack::<u16>().unwrap(), 7);
        assert_eq!(de.unpack::<String>().unwrap(), "next");
        assert_eq!(de.state(), State::Idle);
    }

    #[test]
    fn test_unpack_after_exhaustion_is_error() {
        let mut ser = Serializer::new();
        ser.pack(&1u8).unwrap();
        let chunk = ser.to_binary().unwrap();

        let mut de = Serializer::new();
        de.from_binary(&chunk).unwrap();
        assert_eq!(de.unpack::<u8>().unwrap(), 1);
        assert!(matches!(de.unpack::<u8>(), Err(Error::Exhausted)));
    }

    #[test]
    fn test_interleaving_is_rejected() {
        let mut ser = Serializer::new();
        ser.pack(&1u8).unwrap();

        let other = Serializer::new().to_binary().unwrap();
        assert!(matches!(
            ser.from_binary(&other),
            Err(Error::InvalidState { state: "packing", .. })
        ));
        assert!(matches!(
            ser.unpack::<u8>(),
            Err(Error::InvalidState { .. })
        ));

        let chunk = ser.to_binary().unwrap();
        let mut de = Serializer::new();
        de.from_binary(&chunk).unwrap();
        assert!(matches!(de.pack(&2u8), Err(Error::InvalidState { .. })));
        assert!(matches!(de.to_binary(), Err(Error::InvalidState { .. })));
        assert_eq!(de.state(), State::Unpacking);

        de.reset();
        assert_eq!(de.state(), State::Idle);
    }

    #[test]
    fn test_source_is_shared_until_finished() {
        let mut ser = Serializer::new();
        ser.pack(&1u8).unwrap().pack(&2u8).unwrap();
        let chunk = ser.to_binary().unwrap();

        let mut de = Serializer::new();
        de.from_binary(&chunk).unwrap();
        assert_eq!(chunk.strong_count(), 2);

        de.unpack::<u8>().unwrap();
        de.unpack::<u8>().unwrap();
        assert_eq!(chunk.strong_count(), 1);
    }

    #[test]
    fn test_truncated_source_stays_idle() {
        let mut ser = Serializer::new();
        ser.pack("truncated").unwrap();
        let chunk = ser.to_binary().unwrap();

        let bytes = chunk.borrow().unwrap().as_bytes().to_vec();
        let mut de = Serializer::new();
        let err = de.from_bytes(&bytes[..bytes.len() - 1]).unwrap_err();

        assert!(matches!(err, Error::Truncated { .. }));
        assert_eq!(de.state(), State::Idle);
    }

    #[test]
    fn test_null_source() {
        let mut de = Serializer::new();
        assert!(matches!(
            de.from_binary(&ChunkRef::null()),
            Err(Error::NullHandle)
        ));
    }

    #[test]
    fn test_zero_size_binary_at_tail() {
        let mut ser = Serializer::new();
        ser.pack("x").unwrap().pack(&Chunk::empty()).unwrap();
        let chunk = ser.to_binary().unwrap();

        let mut de = Serializer::new();
        de.from_binary(&chunk).unwrap();
        assert_eq!(de.unpack::<String>().unwrap(), "x");
        assert_eq!(de.state(), State::Unpacking);
        assert_eq!(de.unpack::<Chunk>().unwrap().size(), 0);
        assert_eq!(de.state(), State::Idle);
    }

    #[test]
    fn test_resized_alias_updates_header() {
        let blob = Chunk::from_slice(&[1, 2, 3]).into_ref();

        let mut ser = Serializer::new();
        ser.pack(&blob).unwrap().pack(&7u32).unwrap();
        blob.replace(Chunk::from_slice(&[9; 5]));
        let chunk = ser.to_binary().unwrap();

        let mut de = Serializer::new();
        de.from_binary(&chunk).unwrap();
        assert_eq!(de.peek(), Some(Metadata::new(DataType::Binary, 5)));
        assert_eq!(de.unpack::<Vec<u8>>().unwrap(), vec![9; 5]);
        assert_eq!(de.unpack::<u32>().unwrap(), 7);
        assert_eq!(de.state(), State::Idle);
    }

    #[test]
    fn test_config_limits_apply() {
        let mut ser = Serializer::new();
        ser.pack(&[0u8; 32][..]).unwrap();
        let chunk = ser.to_binary().unwrap();

        let mut de = Serializer::with_config(SerializerConfig {
            max_payload_size: 16,
            ..SerializerConfig::default()
        });
        assert!(matches!(
            de.from_binary(&chunk),
            Err(Error::LimitExceeded { limit: 16, actual: 32, .. })
        ));
    }
}
