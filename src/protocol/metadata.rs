//! Self-Describing Header Format
//!
//! Layout:
//! ┌─────────────────────────────────────────────────────┐
//! │ field_count: u64 LE (8 bytes)                       │
//! ├─────────────────────────────────────────────────────┤
//! │ field_count × { type: u32 LE, size: u64 LE }        │
//! ├─────────────────────────────────────────────────────┤
//! │ Payload field 0 .. field_count-1 (urutan pack)      │
//! └─────────────────────────────────────────────────────┘
//!
//! Integer header selalu little-endian dengan lebar tetap, jadi header
//! portable antar platform. Payload `Plain` tetap memakai layout native.

use std::collections::VecDeque;
use std::fmt;

use tracing::warn;

use crate::config::SerializerConfig;
use crate::core::Chunk;
use crate::error::{Error, Result};

/// Ukuran field count di awal header
pub const COUNT_SIZE: usize = 8;
/// Ukuran satu metadata record (tag u32 + size u64)
pub const RECORD_SIZE: usize = 12;

/// Kategori field yang didukung
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Binary blob (Chunk)
    Binary = 1,
    /// Integer, float, bool, char
    Arithmetic = 2,
    /// Enum dengan representasi tetap
    Enum = 3,
    /// Struct plain-old-data
    Struct = 4,
    /// Union plain-old-data
    Union = 5,
    /// UTF-8 string + 1 byte terminator
    String = 6,
}

impl DataType {
    #[inline(always)]
    pub fn from_u32(v: u32) -> Option<Self> {
        match v {
            1 => Some(Self::Binary),
            2 => Some(Self::Arithmetic),
            3 => Some(Self::Enum),
            4 => Some(Self::Struct),
            5 => Some(Self::Union),
            6 => Some(Self::String),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn as_u32(self) -> u32 {
        self as u32
    }
}

/// Descriptor satu field: tipe dan ukuran payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub data_type: DataType,
    pub size: usize,
}

impl Metadata {
    #[inline(always)]
    pub const fn new(data_type: DataType, size: usize) -> Self {
        Self { data_type, size }
    }

    /// Encode ke record 12 bytes
    #[inline]
    pub fn to_bytes(&self) -> [u8; RECORD_SIZE] {
        let mut out = [0u8; RECORD_SIZE];
        out[..4].copy_from_slice(&self.data_type.as_u32().to_le_bytes());
        out[4..].copy_from_slice(&(self.size as u64).to_le_bytes());
        out
    }

    /// Decode dari record 12 bytes
    pub fn from_bytes(buf: &[u8; RECORD_SIZE]) -> Result<Self> {
        let mut tag = [0u8; 4];
        tag.copy_from_slice(&buf[..4]);
        let mut size = [0u8; 8];
        size.copy_from_slice(&buf[4..]);

        let tag = u32::from_le_bytes(tag);
        let data_type = DataType::from_u32(tag).ok_or(Error::UnknownDataType(tag))?;
        // Size yang tidak muat di usize pasti ditolak oleh payload limit
        let size = usize::try_from(u64::from_le_bytes(size)).unwrap_or(usize::MAX);

        Ok(Self { data_type, size })
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({} bytes)", self.data_type, self.size)
    }
}

/// Header yang sudah di-parse dari source buffer
#[derive(Debug)]
pub struct Header {
    /// Metadata dalam urutan pack
    pub fields: VecDeque<Metadata>,
    /// Offset byte payload pertama
    pub payload_offset: usize,
    /// Total bytes payload yang dideklarasikan
    pub payload_size: usize,
}

/// Encode field count sebagai block pertama header
#[inline]
pub fn encode_count(count: usize) -> Chunk {
    Chunk::from_slice(&(count as u64).to_le_bytes())
}

/// Encode semua metadata record sebagai satu block
pub fn encode_records<'a, I>(fields: I) -> Chunk
where
    I: IntoIterator<Item = &'a Metadata>,
{
    let mut out = Vec::new();
    for md in fields {
        out.extend_from_slice(&md.to_bytes());
    }
    Chunk::from(out)
}

/// Parse header dan validasi bahwa semua payload yang dideklarasikan muat.
pub fn decode_header(buf: &[u8], config: &SerializerConfig) -> Result<Header> {
    if buf.len() < COUNT_SIZE {
        return Err(Error::Truncated {
            needed: COUNT_SIZE,
            available: buf.len(),
        });
    }

    let mut count = [0u8; COUNT_SIZE];
    count.copy_from_slice(&buf[..COUNT_SIZE]);
    let count = u64::from_le_bytes(count);

    let count = match usize::try_from(count) {
        Ok(count) if count <= config.max_fields => count,
        _ => {
            warn!(count, limit = config.max_fields, "header rejected: too many fields");
            return Err(Error::LimitExceeded {
                what: "field count",
                limit: config.max_fields,
                actual: usize::try_from(count).unwrap_or(usize::MAX),
            });
        }
    };

    let payload_offset = count
        .checked_mul(RECORD_SIZE)
        .and_then(|n| n.checked_add(COUNT_SIZE))
        .unwrap_or(usize::MAX);

    if payload_offset > buf.len() {
        return Err(Error::Truncated {
            needed: payload_offset,
            available: buf.len(),
        });
    }

    let mut fields = VecDeque::with_capacity(count);
    let mut payload_size = 0usize;

    for record in buf[COUNT_SIZE..payload_offset].chunks_exact(RECORD_SIZE) {
        let mut raw = [0u8; RECORD_SIZE];
        raw.copy_from_slice(record);
        let md = Metadata::from_bytes(&raw)?;

        payload_size = payload_size.saturating_add(md.size);
        fields.push_back(md);
    }

    if payload_size > config.max_payload_size {
        warn!(payload_size, limit = config.max_payload_size, "header rejected: payload too large");
        return Err(Error::LimitExceeded {
            what: "payload size",
            limit: config.max_payload_size,
            actual: payload_size,
        });
    }

    let available = buf.len() - payload_offset;
    if payload_size > available {
        return Err(Error::Truncated {
            needed: payload_offset.saturating_add(payload_size),
            available: buf.len(),
        });
    }

    Ok(Header {
        fields,
        payload_offset,
        payload_size,
    })
}
