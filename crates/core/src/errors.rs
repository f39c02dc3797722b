use thiserror::Error;

/// Unified error type for the entire chartcast-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
///
/// Degenerate inputs (too few points, non-overlapping categories, parallel
/// lines) are not errors: they produce empty outputs. Only malformed
/// configuration and unreadable data surface here.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Configuration / Input ───────────────────────────────────────
    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Field not found in table: {0}")]
    FieldNotFound(String),

    #[error("Type mismatch in field '{field}': {message}")]
    TypeMismatch {
        field: String,
        message: String,
    },

    // ── Forecasting ─────────────────────────────────────────────────
    #[error("Forecast error ({provider}): {message}")]
    Forecast {
        provider: String,
        message: String,
    },

    #[error("No forecast provider available: {0}")]
    NoProvider(String),

    // ── Snapshot Storage ────────────────────────────────────────────
    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("Unsupported file version: {0}")]
    UnsupportedVersion(u16),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ── File I/O (native only) ──────────────────────────────────────
    #[error("File I/O error: {0}")]
    FileIO(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<bincode::Error> for CoreError {
    fn from(e: bincode::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Deserialization(e.to_string())
    }
}
