//! Catalog handlers - list selectable record types and modules.

use std::collections::BTreeMap;

use satchel_engine::{RecordStore, RecordType};
use serde::Serialize;

use crate::error::Result;

/// Response for the record type listing.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    /// All selectable record types, ordered by (module, name)
    pub doctypes: Vec<RecordType>,
    /// The same types grouped by module
    pub modules: BTreeMap<String, Vec<RecordType>>,
}

/// List the selectable record types, flat and grouped by module.
pub async fn handle_list_doctypes<S>(store: &S) -> Result<CatalogResponse>
where
    S: RecordStore + ?Sized,
{
    let doctypes = store.list_record_types().await?;

    let mut modules: BTreeMap<String, Vec<RecordType>> = BTreeMap::new();
    for doctype in &doctypes {
        modules
            .entry(doctype.module.clone())
            .or_default()
            .push(doctype.clone());
    }

    Ok(CatalogResponse { doctypes, modules })
}

/// List the sorted distinct module names.
pub async fn handle_list_modules<S>(store: &S) -> Result<Vec<String>>
where
    S: RecordStore + ?Sized,
{
    let mut modules: Vec<String> = store
        .list_record_types()
        .await?
        .into_iter()
        .map(|t| t.module)
        .collect();
    modules.sort();
    modules.dedup();
    Ok(modules)
}
