//! Archive building.
//!
//! [`build_archive`] selects record types from a store and packages
//! their schemas and records into a zip archive. Schema and listing
//! fetches are fatal for the whole build; an individual record that
//! fails to load is logged and skipped so a bulk export never aborts
//! over one corrupt record.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use crate::archive::{ArchiveDocument, ArchiveManifest, DoctypeEntry};
use crate::store::RecordStore;
use crate::{error::Result, Error};

/// Identity and provenance for one archive build, passed explicitly so
/// the archiver stays free of ambient session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceContext {
    /// Source site identifier
    pub site: String,
    /// Principal requesting the build
    pub user: String,
    /// Creation timestamp stamped into the manifest and filename
    pub timestamp: DateTime<Utc>,
}

impl SourceContext {
    /// Create a context stamped with the current time.
    pub fn new(site: impl Into<String>, user: impl Into<String>) -> Self {
        Self::at(site, user, Utc::now())
    }

    /// Create a context with an explicit timestamp.
    pub fn at(site: impl Into<String>, user: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            site: site.into(),
            user: user.into(),
            timestamp,
        }
    }
}

/// A finished archive build: raw container bytes plus metadata about
/// them. Transport encoding is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupArtifact {
    /// Suggested filename encoding the creation timestamp
    pub filename: String,
    /// Number of record types included
    pub doctype_count: usize,
    /// Raw zip bytes
    pub bytes: Vec<u8>,
}

impl BackupArtifact {
    /// Byte length of the archive container.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Build an archive of the selected record types.
///
/// The selection must be non-empty and every name must be in the
/// store's selectable universe; duplicates collapse to one entry.
/// Reads only; per-record load failures go to the log channel.
pub async fn build_archive<S>(
    store: &S,
    selection: &[String],
    ctx: &SourceContext,
) -> Result<BackupArtifact>
where
    S: RecordStore + ?Sized,
{
    if selection.is_empty() {
        return Err(Error::EmptySelection);
    }

    let selectable: BTreeSet<String> = store
        .list_record_types()
        .await?
        .into_iter()
        .map(|t| t.name)
        .collect();

    for name in selection {
        if !selectable.contains(name) {
            return Err(Error::UnknownRecordType(name.clone()));
        }
    }

    let mut doctypes = BTreeMap::new();
    for name in selection {
        if doctypes.contains_key(name) {
            continue;
        }
        doctypes.insert(name.clone(), export_doctype(store, name).await?);
    }

    let metadata = ArchiveManifest {
        site: ctx.site.clone(),
        created_on: ctx.timestamp.to_rfc3339(),
        created_by: ctx.user.clone(),
        doctype_count: doctypes.len(),
    };
    let document = ArchiveDocument { doctypes, metadata };

    let bytes = document.to_zip_bytes()?;
    tracing::info!(
        doctype_count = document.doctypes.len(),
        record_total = document.record_total(),
        size = bytes.len(),
        "archive built"
    );

    Ok(BackupArtifact {
        filename: format!(
            "satchel_backup_{}.zip",
            ctx.timestamp.format("%Y%m%d_%H%M%S")
        ),
        doctype_count: document.doctypes.len(),
        bytes,
    })
}

/// Export one record type: schema, identifier list, then each record.
async fn export_doctype<S>(store: &S, name: &str) -> Result<DoctypeEntry>
where
    S: RecordStore + ?Sized,
{
    let schema = store
        .get_schema(name)
        .await
        .map_err(|e| Error::data_access(name, e))?;

    let record_names = store
        .list_records(name)
        .await
        .map_err(|e| Error::data_access(name, e))?;

    let mut records = Vec::with_capacity(record_names.len());
    for record_name in &record_names {
        match store.fetch_record(name, record_name).await {
            Ok(payload) => records.push(payload),
            Err(e) => {
                tracing::warn!(
                    record_type = %name,
                    record = %record_name,
                    error = %e,
                    "skipping record that failed to load"
                );
            }
        }
    }

    let record_count = records.len();
    Ok(DoctypeEntry {
        schema,
        records,
        record_count,
    })
}
