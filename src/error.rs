//! Error types untuk serializer dan storage layer.

use thiserror::Error;

use crate::protocol::{DataType, Metadata};

/// Semua kegagalan yang bisa terjadi saat pack/unpack.
#[derive(Debug, Error)]
pub enum Error {
    /// Operasi tidak valid untuk state session saat ini.
    #[error("cannot {operation} while serializer is {state}")]
    InvalidState {
        /// Operasi yang ditolak.
        operation: &'static str,
        /// State serializer saat operasi dipanggil.
        state: &'static str,
    },

    /// Unpack dipanggil setelah metadata queue habis.
    #[error("no packed fields left to unpack")]
    Exhausted,

    /// Field berikutnya tidak cocok dengan tipe yang diminta.
    ///
    /// Metadata tidak di-pop, jadi caller bisa retry dengan tipe yang benar.
    #[error("field mismatch: requested {expected:?} ({expected_size:?} bytes), found {found}")]
    TypeMismatch {
        /// Tipe yang diminta caller.
        expected: DataType,
        /// Ukuran yang diminta (None untuk field variable-size).
        expected_size: Option<usize>,
        /// Metadata yang ada di depan queue.
        found: Metadata,
    },

    /// Source buffer lebih pendek dari yang dideklarasikan header.
    #[error("truncated input: need {needed} bytes, only {available} available")]
    Truncated {
        /// Bytes yang dibutuhkan.
        needed: usize,
        /// Bytes yang tersedia.
        available: usize,
    },

    /// Tag tipe di header tidak dikenal.
    #[error("unknown data type tag {0}")]
    UnknownDataType(u32),

    /// Payload tidak bisa di-decode menjadi nilai yang valid.
    #[error("invalid {data_type:?} payload: {reason}")]
    InvalidValue {
        /// Tipe field.
        data_type: DataType,
        /// Penjelasan singkat.
        reason: &'static str,
    },

    /// Input melewati batas konfigurasi.
    #[error("{what} limit exceeded: {actual} > {limit}")]
    LimitExceeded {
        /// Batas yang dilanggar.
        what: &'static str,
        /// Nilai batas.
        limit: usize,
        /// Nilai aktual dari input.
        actual: usize,
    },

    /// Handle null di tempat yang membutuhkan data.
    #[error("null chunk handle")]
    NullHandle,

    /// I/O gagal di storage layer.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type untuk semua operasi crate ini.
pub type Result<T> = std::result::Result<T, Error>;
