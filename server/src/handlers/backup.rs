//! Backup handler - builds an archive and frames it for transport.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use satchel_engine::{build_archive, RecordStore, SourceContext};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default principal recorded when the request names none.
const ANONYMOUS_USER: &str = "anonymous";

/// Request body for a backup build.
#[derive(Debug, Deserialize)]
pub struct BackupRequest {
    /// Record type names to include
    pub doctypes: Vec<String>,
    /// Principal to record in the archive manifest
    #[serde(default)]
    pub requested_by: Option<String>,
}

/// Response for a backup build.
#[derive(Debug, Serialize)]
pub struct BackupResponse {
    pub success: bool,
    /// Suggested filename encoding the creation timestamp
    pub filename: String,
    /// Base64-encoded archive bytes
    pub content: String,
    /// Archive size in bytes, before encoding
    pub size: usize,
    /// Number of record types included
    pub doctype_count: usize,
}

/// Build an archive of the requested record types.
///
/// Validation failures (empty or unknown selection) and fatal fetch
/// failures surface as errors for the caller; the transport encoding of
/// the archive bytes happens here, not in the engine.
pub async fn handle_backup<S>(store: &S, site: &str, request: BackupRequest) -> Result<BackupResponse>
where
    S: RecordStore + ?Sized,
{
    let user = request
        .requested_by
        .as_deref()
        .unwrap_or(ANONYMOUS_USER);
    let ctx = SourceContext::new(site, user);

    let artifact = build_archive(store, &request.doctypes, &ctx).await?;

    Ok(BackupResponse {
        success: true,
        filename: artifact.filename.clone(),
        size: artifact.size(),
        doctype_count: artifact.doctype_count,
        content: BASE64.encode(&artifact.bytes),
    })
}
