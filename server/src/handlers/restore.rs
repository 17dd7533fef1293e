//! Restore handler - unpacks an uploaded archive into the store.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use satchel_engine::{restore_archive, DoctypeSummary, RecordStore};
use serde::{Deserialize, Serialize};

/// Request body for a restore.
#[derive(Debug, Deserialize)]
pub struct RestoreRequest {
    /// Base64-encoded archive bytes
    pub file_content: String,
    /// Whether existing records are replaced instead of skipped
    #[serde(default)]
    pub overwrite: bool,
}

/// Response for a restore call.
///
/// Every outcome is a structured body: a summary when the archive was
/// processed (even with per-record errors inside), or a failure record
/// when the container itself was unusable.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RestoreResponse {
    Completed {
        success: bool,
        doctypes_processed: Vec<DoctypeSummary>,
        records_imported: u64,
        records_skipped: u64,
        errors: Vec<String>,
    },
    Failed {
        success: bool,
        error: String,
    },
}

impl RestoreResponse {
    fn failed(error: impl Into<String>) -> Self {
        Self::Failed {
            success: false,
            error: error.into(),
        }
    }
}

/// Restore an uploaded archive.
///
/// Never fails at the HTTP level: bad base64 and malformed containers
/// degrade to `{success: false, error}`.
pub async fn handle_restore<S>(store: &S, request: RestoreRequest) -> RestoreResponse
where
    S: RecordStore + ?Sized,
{
    let bytes = match BASE64.decode(&request.file_content) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("restore rejected: {}", e);
            return RestoreResponse::failed(format!("invalid base64 payload: {e}"));
        }
    };

    match restore_archive(store, &bytes, request.overwrite).await {
        Ok(summary) => RestoreResponse::Completed {
            success: true,
            doctypes_processed: summary.doctypes_processed,
            records_imported: summary.records_imported,
            records_skipped: summary.records_skipped,
            errors: summary.errors,
        },
        Err(e) => {
            tracing::error!("restore failed: {}", e);
            RestoreResponse::failed(e.to_string())
        }
    }
}
