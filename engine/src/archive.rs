//! Archive container format.
//!
//! An archive is a zip with exactly two named entries: the canonical
//! JSON document (`backup.json`) holding every exported type's schema
//! and records, and a generated human-readable manifest (`README.txt`).

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use serde::{Deserialize, Serialize};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::{error::Result, Error, TypeName};

/// Name of the canonical document entry.
pub const DOCUMENT_ENTRY: &str = "backup.json";
/// Name of the manifest text entry.
pub const MANIFEST_ENTRY: &str = "README.txt";

/// Metadata describing one archive, serialized under the document's
/// `metadata` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveManifest {
    /// Source site identifier
    pub site: String,
    /// Creation timestamp, RFC 3339 text
    pub created_on: String,
    /// Creating principal
    pub created_by: String,
    /// Number of record types in the archive
    pub doctype_count: usize,
}

/// One record type's worth of archived data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctypeEntry {
    /// Opaque schema blob, passed through verbatim
    pub schema: serde_json::Value,
    /// Record payloads in archive order
    pub records: Vec<serde_json::Value>,
    /// Count of records, equals `records.len()` when produced here
    pub record_count: usize,
}

/// The full structured backup document.
///
/// `doctypes` is a `BTreeMap` so keys are unique and serialization is
/// deterministic regardless of selection order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArchiveDocument {
    pub doctypes: BTreeMap<TypeName, DoctypeEntry>,
    pub metadata: ArchiveManifest,
}

impl ArchiveDocument {
    /// Create an empty document with the given manifest.
    pub fn new(metadata: ArchiveManifest) -> Self {
        Self {
            doctypes: BTreeMap::new(),
            metadata,
        }
    }

    /// Total record count across all types.
    pub fn record_total(&self) -> usize {
        self.doctypes.values().map(|e| e.records.len()).sum()
    }

    /// Render the human-readable manifest text bundled next to the
    /// document.
    pub fn manifest_text(&self) -> String {
        let mut text = format!(
            "Satchel Backup\n\
             ==============\n\
             Site: {}\n\
             Created: {}\n\
             Created By: {}\n\
             Record types: {}\n\n\
             Included:\n",
            self.metadata.site,
            self.metadata.created_on,
            self.metadata.created_by,
            self.metadata.doctype_count,
        );
        for name in self.doctypes.keys() {
            text.push_str("- ");
            text.push_str(name);
            text.push('\n');
        }
        text
    }

    /// Package the document and its manifest into zip bytes.
    pub fn to_zip_bytes(&self) -> Result<Vec<u8>> {
        let buf = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(buf);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let document = serde_json::to_string_pretty(self)?;
        zip.start_file(DOCUMENT_ENTRY, options)?;
        zip.write_all(document.as_bytes())?;

        zip.start_file(MANIFEST_ENTRY, options)?;
        zip.write_all(self.manifest_text().as_bytes())?;

        let finished = zip.finish()?;
        Ok(finished.into_inner())
    }

    /// Unpack a document from archive bytes.
    ///
    /// Anything short of a well-formed zip carrying a valid
    /// `backup.json` entry is a structural error.
    pub fn from_zip_bytes(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::InvalidArchive(e.to_string()))?;

        let mut entry = match archive.by_name(DOCUMENT_ENTRY) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(Error::MissingEntry(DOCUMENT_ENTRY.to_string()))
            }
            Err(e) => return Err(Error::InvalidArchive(e.to_string())),
        };

        let mut document = String::new();
        entry
            .read_to_string(&mut document)
            .map_err(|e| Error::InvalidArchive(e.to_string()))?;

        serde_json::from_str(&document).map_err(|e| Error::InvalidArchive(e.to_string()))
    }
}
