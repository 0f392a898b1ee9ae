//! Protocol Layer: Type-Tagged Binary Encoding
//!
//! Prinsip desain:
//! - Self-describing: header berisi count + metadata setiap field
//! - Closed tag set: tipe yang tidak didukung ditolak saat compile
//! - Single copy: payload hanya di-copy saat combine dan saat unpack

mod field;
mod metadata;
mod serializer;

pub use field::{Field, Pack, Plain, Unpack};
pub use metadata::{decode_header, DataType, Header, Metadata, COUNT_SIZE, RECORD_SIZE};
pub use serializer::{Serializer, State};
