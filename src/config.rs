//! Konfigurasi batas decode untuk input yang tidak dipercaya.

/// Default maksimum field per chunk
pub const DEFAULT_MAX_FIELDS: usize = 65_536;
/// Default maksimum total payload (64MB)
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 64 * 1024 * 1024;

/// Batas yang dicek `from_binary` sebelum alokasi apapun
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializerConfig {
    /// Maksimum field count di header
    pub max_fields: usize,
    /// Maksimum jumlah size semua field
    pub max_payload_size: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            max_fields: DEFAULT_MAX_FIELDS,
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
        }
    }
}

impl SerializerConfig {
    /// Tanpa batas, untuk chunk yang dibuat sendiri
    pub const fn unlimited() -> Self {
        Self {
            max_fields: usize::MAX,
            max_payload_size: usize::MAX,
        }
    }
}
