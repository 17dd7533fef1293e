//! Error types for the Satchel engine.

use thiserror::Error;

/// All possible errors from the Satchel engine.
///
/// Per-record failures during an export or restore are ordinary `Error`
/// values that the folds catch and accumulate as strings; they never
/// escape a top-level `build_archive` or `restore_archive` call.
#[derive(Debug, Error)]
pub enum Error {
    // Selection validation
    #[error("no record types selected")]
    EmptySelection,

    #[error("unknown or non-exportable record type: {0}")]
    UnknownRecordType(String),

    // Store lookups
    #[error("record type not found: {0}")]
    RecordTypeNotFound(String),

    #[error("record not found: {record_type}/{name}")]
    RecordNotFound { record_type: String, name: String },

    #[error("record already exists: {record_type}/{name}")]
    RecordAlreadyExists { record_type: String, name: String },

    #[error("record type already defined: {0}")]
    RecordTypeAlreadyExists(String),

    #[error("record has no name identifier")]
    MissingRecordName,

    // Schema blob validation
    #[error("invalid schema document: {0}")]
    InvalidSchema(String),

    // Fatal fetch failure during an archive build, scoped to a type
    #[error("data access failed for {record_type}: {message}")]
    DataAccess {
        record_type: String,
        message: String,
    },

    /// Store-level failure outside any one record type.
    #[error("store error: {0}")]
    Store(String),

    // Archive container problems
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    #[error("archive entry missing: {0}")]
    MissingEntry(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Wrap a store failure as a data-access error naming the record type.
    pub fn data_access(record_type: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::DataAccess {
            record_type: record_type.into(),
            message: err.to_string(),
        }
    }

    /// True when this error means the archive container itself is unusable.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidArchive(_) | Self::MissingEntry(_) | Self::Zip(_)
        )
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
