//! The record store seam.
//!
//! Everything Satchel knows about persistent data goes through the
//! [`RecordStore`] trait: the archiver only reads from it, the restorer
//! writes through it. [`MemoryStore`] is the reference implementation,
//! used by tests, benches and embedders that have no database.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{error::Result, Error, RecordName, TypeName};

/// Reserved name of the store's own meta-type (the type that describes
/// record types). It is never selectable and can never be created from
/// an archived schema blob.
pub const META_TYPE: &str = "RecordType";

/// Descriptor for a selectable record type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordType {
    /// Unique type name
    pub name: TypeName,
    /// Owning module grouping
    pub module: String,
}

impl RecordType {
    /// Create a new descriptor.
    pub fn new(name: impl Into<TypeName>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
        }
    }
}

/// The validated head of an otherwise-opaque schema blob.
///
/// Archived schemas are passed through verbatim, but before a store
/// creates a type from one it must at least carry a usable head: a JSON
/// object with a non-empty string `name`. `module` and the exclusion
/// flags are optional and default to empty/false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaHead {
    pub name: TypeName,
    pub module: String,
    /// Child-table-like type, never selectable on its own
    pub is_nested: bool,
    /// Singleton type, never selectable
    pub is_singleton: bool,
}

impl SchemaHead {
    /// Validate a schema blob and extract its head.
    pub fn from_blob(blob: &serde_json::Value) -> Result<Self> {
        let obj = blob
            .as_object()
            .ok_or_else(|| Error::InvalidSchema("schema must be a JSON object".into()))?;

        let name = obj
            .get("name")
            .and_then(serde_json::Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::InvalidSchema("schema has no name".into()))?;

        if name == META_TYPE {
            return Err(Error::InvalidSchema(format!(
                "'{META_TYPE}' is a reserved type name"
            )));
        }

        let module = obj
            .get("module")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();

        let flag = |key: &str| {
            obj.get(key)
                .and_then(serde_json::Value::as_bool)
                .unwrap_or(false)
        };

        Ok(Self {
            name: name.to_string(),
            module: module.to_string(),
            is_nested: flag("is_nested"),
            is_singleton: flag("is_singleton"),
        })
    }

    /// Whether this type belongs to the selectable universe.
    pub fn is_selectable(&self) -> bool {
        !self.is_nested && !self.is_singleton
    }
}

/// The external data store the archiver and restorer collaborate with.
///
/// Implementations own the selectable universe: `list_record_types`
/// must exclude nested and singleton types and the meta-type itself.
/// Mutating calls take effect immediately; `commit` marks a durability
/// boundary for stores that buffer writes (a no-op elsewhere).
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All selectable record types, ordered by (module, name).
    async fn list_record_types(&self) -> Result<Vec<RecordType>>;

    /// Whether a record type of this name exists (selectable or not).
    async fn type_exists(&self, record_type: &str) -> Result<bool>;

    /// The schema blob for a record type.
    async fn get_schema(&self, record_type: &str) -> Result<serde_json::Value>;

    /// The full identifier list for a record type, unbounded.
    async fn list_records(&self, record_type: &str) -> Result<Vec<RecordName>>;

    /// Fetch one record's payload.
    async fn fetch_record(&self, record_type: &str, name: &str) -> Result<serde_json::Value>;

    /// Whether a record with this name exists within the type.
    async fn record_exists(&self, record_type: &str, name: &str) -> Result<bool>;

    /// Insert a new record. Fails if the name is already taken.
    async fn insert_record(
        &self,
        record_type: &str,
        name: &str,
        payload: serde_json::Value,
    ) -> Result<()>;

    /// Delete a record.
    async fn delete_record(&self, record_type: &str, name: &str) -> Result<()>;

    /// Create a record type from an archived schema blob.
    async fn create_record_type(&self, schema: serde_json::Value) -> Result<()>;

    /// Durability boundary.
    async fn commit(&self) -> Result<()>;
}

struct StoredType {
    head: SchemaHead,
    schema: serde_json::Value,
    records: BTreeMap<RecordName, serde_json::Value>,
}

#[derive(Default)]
struct Inner {
    types: BTreeMap<TypeName, StoredType>,
    commits: u64,
}

/// In-memory [`RecordStore`].
///
/// Deterministic iteration order (`BTreeMap`), interior mutability so
/// the trait's `&self` mutators work behind shared references.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a selectable type with the given schema blob.
    pub fn register_type(
        &self,
        name: impl Into<TypeName>,
        module: impl Into<String>,
        schema: serde_json::Value,
    ) {
        let name = name.into();
        let module = module.into();
        self.define_type(
            SchemaHead {
                name,
                module,
                is_nested: false,
                is_singleton: false,
            },
            schema,
        );
    }

    /// Register a type with explicit exclusion flags.
    pub fn define_type(&self, head: SchemaHead, schema: serde_json::Value) {
        let mut inner = self.write_inner().expect("store lock");
        inner.types.insert(
            head.name.clone(),
            StoredType {
                head,
                schema,
                records: BTreeMap::new(),
            },
        );
    }

    /// Number of `commit` calls made against this store.
    pub fn commits(&self) -> u64 {
        self.read_inner().map(|i| i.commits).unwrap_or(0)
    }

    fn read_inner(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|_| Error::Store("store lock poisoned".into()))
    }

    fn write_inner(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|_| Error::Store("store lock poisoned".into()))
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list_record_types(&self) -> Result<Vec<RecordType>> {
        let inner = self.read_inner()?;
        let mut types: Vec<RecordType> = inner
            .types
            .values()
            .filter(|t| t.head.is_selectable() && t.head.name != META_TYPE)
            .map(|t| RecordType::new(&t.head.name, &t.head.module))
            .collect();
        types.sort_by(|a, b| (&a.module, &a.name).cmp(&(&b.module, &b.name)));
        Ok(types)
    }

    async fn type_exists(&self, record_type: &str) -> Result<bool> {
        Ok(self.read_inner()?.types.contains_key(record_type))
    }

    async fn get_schema(&self, record_type: &str) -> Result<serde_json::Value> {
        let inner = self.read_inner()?;
        inner
            .types
            .get(record_type)
            .map(|t| t.schema.clone())
            .ok_or_else(|| Error::RecordTypeNotFound(record_type.to_string()))
    }

    async fn list_records(&self, record_type: &str) -> Result<Vec<RecordName>> {
        let inner = self.read_inner()?;
        let stored = inner
            .types
            .get(record_type)
            .ok_or_else(|| Error::RecordTypeNotFound(record_type.to_string()))?;
        Ok(stored.records.keys().cloned().collect())
    }

    async fn fetch_record(&self, record_type: &str, name: &str) -> Result<serde_json::Value> {
        let inner = self.read_inner()?;
        let stored = inner
            .types
            .get(record_type)
            .ok_or_else(|| Error::RecordTypeNotFound(record_type.to_string()))?;
        stored
            .records
            .get(name)
            .cloned()
            .ok_or_else(|| Error::RecordNotFound {
                record_type: record_type.to_string(),
                name: name.to_string(),
            })
    }

    async fn record_exists(&self, record_type: &str, name: &str) -> Result<bool> {
        let inner = self.read_inner()?;
        Ok(inner
            .types
            .get(record_type)
            .is_some_and(|t| t.records.contains_key(name)))
    }

    async fn insert_record(
        &self,
        record_type: &str,
        name: &str,
        payload: serde_json::Value,
    ) -> Result<()> {
        let mut inner = self.write_inner()?;
        let stored = inner
            .types
            .get_mut(record_type)
            .ok_or_else(|| Error::RecordTypeNotFound(record_type.to_string()))?;
        if stored.records.contains_key(name) {
            return Err(Error::RecordAlreadyExists {
                record_type: record_type.to_string(),
                name: name.to_string(),
            });
        }
        stored.records.insert(name.to_string(), payload);
        Ok(())
    }

    async fn delete_record(&self, record_type: &str, name: &str) -> Result<()> {
        let mut inner = self.write_inner()?;
        let stored = inner
            .types
            .get_mut(record_type)
            .ok_or_else(|| Error::RecordTypeNotFound(record_type.to_string()))?;
        stored
            .records
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::RecordNotFound {
                record_type: record_type.to_string(),
                name: name.to_string(),
            })
    }

    async fn create_record_type(&self, schema: serde_json::Value) -> Result<()> {
        let head = SchemaHead::from_blob(&schema)?;
        let mut inner = self.write_inner()?;
        if inner.types.contains_key(&head.name) {
            return Err(Error::RecordTypeAlreadyExists(head.name));
        }
        inner.types.insert(
            head.name.clone(),
            StoredType {
                head,
                schema,
                records: BTreeMap::new(),
            },
        );
        Ok(())
    }

    async fn commit(&self) -> Result<()> {
        self.write_inner()?.commits += 1;
        Ok(())
    }
}
