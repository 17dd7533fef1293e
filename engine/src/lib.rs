//! # Satchel Engine
//!
//! A selective schema+data archiver with conflict-aware restore.
//!
//! This crate provides the core logic for exporting a chosen subset of
//! a store's record types into a portable zip archive and replaying
//! such an archive into another store. It is framework-independent:
//! every read and write goes through the [`RecordStore`] trait, so the
//! engine can run against a database, an in-memory store, or anything
//! else that implements the seam.
//!
//! ## Design Principles
//!
//! - **Schema-agnostic**: record payloads and schema blobs are opaque
//!   JSON values, passed through verbatim
//! - **Explicit context**: identity and provenance arrive as a
//!   [`SourceContext`] parameter, never from ambient state
//! - **Maximal forward progress**: one corrupt record never aborts a
//!   bulk export or restore; failures accumulate into the result
//! - **No transport framing**: archives are raw bytes here; text-safe
//!   encoding belongs to the host boundary
//!
//! ## Core Concepts
//!
//! ### Record types and records
//!
//! A record type is a named schema owned by a module grouping. A record
//! is one JSON payload whose `name` key identifies it within its type.
//! The selectable universe excludes nested (child-table-like) types,
//! singletons, and the store's own meta-type.
//!
//! ### Archives
//!
//! An archive is a zip with two entries: `backup.json`, the canonical
//! [`ArchiveDocument`] mapping each type to its schema, records and
//! record count plus an [`ArchiveManifest`]; and `README.txt`, a
//! human-readable manifest.
//!
//! ### Restoration
//!
//! [`restore_archive`] processes each archived type independently:
//! missing types are recreated from their archived schema (validated
//! through [`SchemaHead`] first), existing records are skipped or
//! overwritten per the conflict policy, and every failure lands in the
//! returned [`RestoreSummary`] rather than aborting the call.
//!
//! ## Quick Start
//!
//! ```rust
//! use satchel_engine::{
//!     build_archive, restore_archive, MemoryStore, RecordStore, SourceContext,
//! };
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! // 1. A store with a type and a record
//! let store = MemoryStore::new();
//! store.register_type("Customer", "Selling", json!({"name": "Customer"}));
//! store
//!     .insert_record("Customer", "CUST-0001", json!({"name": "CUST-0001"}))
//!     .await
//!     .unwrap();
//!
//! // 2. Build an archive of the selection
//! let ctx = SourceContext::new("demo.example", "admin");
//! let artifact = build_archive(&store, &["Customer".to_string()], &ctx)
//!     .await
//!     .unwrap();
//! assert_eq!(artifact.doctype_count, 1);
//!
//! // 3. Restore it elsewhere
//! let target = MemoryStore::new();
//! let summary = restore_archive(&target, &artifact.bytes, false)
//!     .await
//!     .unwrap();
//! assert_eq!(summary.records_imported, 1);
//! # });
//! ```

pub mod archive;
pub mod error;
pub mod export;
pub mod import;
pub mod store;

// Re-export main types at crate root
pub use archive::{
    ArchiveDocument, ArchiveManifest, DoctypeEntry, DOCUMENT_ENTRY, MANIFEST_ENTRY,
};
pub use error::Error;
pub use export::{build_archive, BackupArtifact, SourceContext};
pub use import::{restore_archive, DoctypeSummary, RestoreSummary};
pub use store::{MemoryStore, RecordStore, RecordType, SchemaHead, META_TYPE};

/// Type aliases for clarity
pub type TypeName = String;
pub type RecordName = String;
