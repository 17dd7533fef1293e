//! Archive restoration.
//!
//! [`restore_archive`] unpacks an archive and replays it into a store.
//! Restoration is an explicit fold: per-record and per-type failures
//! accumulate into the returned [`RestoreSummary`] and never abort the
//! call. Only a structurally unusable container errors at the top
//! level.

use serde::{Deserialize, Serialize};

use crate::archive::{ArchiveDocument, DoctypeEntry};
use crate::store::RecordStore;
use crate::{error::Result, Error};

/// Per-type restoration breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctypeSummary {
    /// Record type name
    pub doctype: String,
    /// Records inserted
    pub imported: u64,
    /// Records left untouched because they already existed
    pub skipped: u64,
    /// Per-record error messages, scoped to this type
    pub errors: Vec<String>,
}

impl DoctypeSummary {
    fn new(doctype: &str) -> Self {
        Self {
            doctype: doctype.to_string(),
            ..Default::default()
        }
    }
}

/// Aggregate result of one restore call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreSummary {
    /// Breakdown per processed record type
    pub doctypes_processed: Vec<DoctypeSummary>,
    /// Total records inserted
    pub records_imported: u64,
    /// Total records skipped
    pub records_skipped: u64,
    /// Type-level failures (schema creation, listing problems)
    pub errors: Vec<String>,
}

enum RecordOutcome {
    Imported,
    Skipped,
}

/// Restore an archive into a store.
///
/// When `overwrite` is false an existing record with a matching name is
/// skipped and never touched; when true it is deleted and replaced.
/// The store's commit boundary is invoked after each created schema and
/// once after all types, so progress is durable progressively rather
/// than atomically.
pub async fn restore_archive<S>(store: &S, bytes: &[u8], overwrite: bool) -> Result<RestoreSummary>
where
    S: RecordStore + ?Sized,
{
    let document = ArchiveDocument::from_zip_bytes(bytes)?;

    let mut summary = RestoreSummary::default();
    for (type_name, entry) in &document.doctypes {
        match restore_doctype(store, type_name, entry, overwrite).await {
            Ok(per_type) => {
                summary.records_imported += per_type.imported;
                summary.records_skipped += per_type.skipped;
                summary.doctypes_processed.push(per_type);
            }
            Err(e) => {
                let message = format!("error processing record type {type_name}: {e}");
                tracing::error!(record_type = %type_name, error = %e, "record type restore failed");
                summary.errors.push(message);
            }
        }
    }

    store.commit().await?;

    tracing::info!(
        imported = summary.records_imported,
        skipped = summary.records_skipped,
        errors = summary.errors.len(),
        "archive restored"
    );
    Ok(summary)
}

/// Restore one record type: ensure its schema exists, then fold over
/// its records accumulating counts and error strings.
async fn restore_doctype<S>(
    store: &S,
    type_name: &str,
    entry: &DoctypeEntry,
    overwrite: bool,
) -> Result<DoctypeSummary>
where
    S: RecordStore + ?Sized,
{
    if !store.type_exists(type_name).await? {
        store.create_record_type(entry.schema.clone()).await?;
        store.commit().await?;
    }

    let mut acc = DoctypeSummary::new(type_name);
    for payload in &entry.records {
        match restore_record(store, type_name, payload, overwrite).await {
            Ok(RecordOutcome::Imported) => acc.imported += 1,
            Ok(RecordOutcome::Skipped) => acc.skipped += 1,
            Err(e) => {
                let record_name = payload
                    .get("name")
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or("<unnamed>");
                tracing::warn!(
                    record_type = %type_name,
                    record = %record_name,
                    error = %e,
                    "record import failed"
                );
                acc.errors
                    .push(format!("error importing record {record_name}: {e}"));
            }
        }
    }
    Ok(acc)
}

async fn restore_record<S>(
    store: &S,
    type_name: &str,
    payload: &serde_json::Value,
    overwrite: bool,
) -> Result<RecordOutcome>
where
    S: RecordStore + ?Sized,
{
    let record_name = payload
        .get("name")
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or(Error::MissingRecordName)?;

    if store.record_exists(type_name, record_name).await? {
        if !overwrite {
            return Ok(RecordOutcome::Skipped);
        }
        store.delete_record(type_name, record_name).await?;
    }

    store
        .insert_record(type_name, record_name, payload.clone())
        .await?;
    Ok(RecordOutcome::Imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveManifest, DoctypeEntry};
    use crate::store::MemoryStore;
    use serde_json::json;

    fn test_archive_bytes() -> Vec<u8> {
        let mut document = ArchiveDocument::new(ArchiveManifest {
            site: "demo.example".into(),
            created_on: "2026-01-15T08:30:00+00:00".into(),
            created_by: "admin".into(),
            doctype_count: 1,
        });
        document.doctypes.insert(
            "Customer".into(),
            DoctypeEntry {
                schema: json!({"name": "Customer", "module": "Selling"}),
                records: vec![
                    json!({"name": "CUST-0001", "territory": "EU"}),
                    json!({"name": "CUST-0002", "territory": "US"}),
                ],
                record_count: 2,
            },
        );
        document.to_zip_bytes().unwrap()
    }

    #[tokio::test]
    async fn restore_into_empty_store_creates_type() {
        let store = MemoryStore::new();
        let summary = restore_archive(&store, &test_archive_bytes(), false)
            .await
            .unwrap();

        assert_eq!(summary.records_imported, 2);
        assert_eq!(summary.records_skipped, 0);
        assert!(summary.errors.is_empty());
        assert!(store.type_exists("Customer").await.unwrap());
        assert!(store.record_exists("Customer", "CUST-0001").await.unwrap());
    }

    #[tokio::test]
    async fn second_restore_skips_everything() {
        let store = MemoryStore::new();
        let bytes = test_archive_bytes();
        restore_archive(&store, &bytes, false).await.unwrap();
        let summary = restore_archive(&store, &bytes, false).await.unwrap();

        assert_eq!(summary.records_imported, 0);
        assert_eq!(summary.records_skipped, 2);
        assert!(summary.errors.is_empty());
        assert_eq!(summary.doctypes_processed[0].skipped, 2);
    }

    #[tokio::test]
    async fn overwrite_replaces_existing() {
        let store = MemoryStore::new();
        store.register_type("Customer", "Selling", json!({"name": "Customer"}));
        store
            .insert_record("Customer", "CUST-0001", json!({"name": "CUST-0001", "territory": "APAC"}))
            .await
            .unwrap();

        let summary = restore_archive(&store, &test_archive_bytes(), true)
            .await
            .unwrap();

        assert_eq!(summary.records_imported, 2);
        assert_eq!(summary.records_skipped, 0);
        let payload = store.fetch_record("Customer", "CUST-0001").await.unwrap();
        assert_eq!(payload["territory"], "EU");
    }

    #[tokio::test]
    async fn nameless_record_is_per_record_error() {
        let mut document = ArchiveDocument::new(ArchiveManifest {
            site: "s".into(),
            created_on: "t".into(),
            created_by: "u".into(),
            doctype_count: 1,
        });
        document.doctypes.insert(
            "Customer".into(),
            DoctypeEntry {
                schema: json!({"name": "Customer"}),
                records: vec![
                    json!({"territory": "EU"}),
                    json!({"name": "CUST-0002"}),
                ],
                record_count: 2,
            },
        );
        let bytes = document.to_zip_bytes().unwrap();

        let store = MemoryStore::new();
        let summary = restore_archive(&store, &bytes, false).await.unwrap();

        assert_eq!(summary.records_imported, 1);
        assert_eq!(summary.doctypes_processed[0].errors.len(), 1);
        assert!(summary.doctypes_processed[0].errors[0].contains("<unnamed>"));
    }

    #[tokio::test]
    async fn bad_schema_blob_isolates_type() {
        let mut document = ArchiveDocument::new(ArchiveManifest {
            site: "s".into(),
            created_on: "t".into(),
            created_by: "u".into(),
            doctype_count: 2,
        });
        // Schema blob without a name cannot create the missing type
        document.doctypes.insert(
            "Broken".into(),
            DoctypeEntry {
                schema: json!({"module": "Core"}),
                records: vec![json!({"name": "B-0001"})],
                record_count: 1,
            },
        );
        document.doctypes.insert(
            "Customer".into(),
            DoctypeEntry {
                schema: json!({"name": "Customer"}),
                records: vec![json!({"name": "CUST-0001"})],
                record_count: 1,
            },
        );
        let bytes = document.to_zip_bytes().unwrap();

        let store = MemoryStore::new();
        let summary = restore_archive(&store, &bytes, false).await.unwrap();

        // Broken failed at the type level, Customer went through
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains("Broken"));
        assert_eq!(summary.records_imported, 1);
        assert_eq!(summary.doctypes_processed.len(), 1);
        assert!(store.record_exists("Customer", "CUST-0001").await.unwrap());
        assert!(!store.type_exists("Broken").await.unwrap());
    }

    #[tokio::test]
    async fn malformed_bytes_error_structurally() {
        let store = MemoryStore::new();
        let result = restore_archive(&store, b"not a zip at all", false).await;
        assert!(matches!(result, Err(e) if e.is_structural()));
    }

    #[tokio::test]
    async fn commit_after_each_created_schema_and_at_end() {
        let mut document = ArchiveDocument::new(ArchiveManifest {
            site: "s".into(),
            created_on: "t".into(),
            created_by: "u".into(),
            doctype_count: 2,
        });
        for name in ["Customer", "Item"] {
            document.doctypes.insert(
                name.into(),
                DoctypeEntry {
                    schema: json!({"name": name}),
                    records: vec![],
                    record_count: 0,
                },
            );
        }
        let bytes = document.to_zip_bytes().unwrap();

        let store = MemoryStore::new();
        restore_archive(&store, &bytes, false).await.unwrap();

        // One commit per created schema plus the final one
        assert_eq!(store.commits(), 3);
    }
}
