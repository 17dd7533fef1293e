//! PostgreSQL-backed record store.

use async_trait::async_trait;
use satchel_engine::{Error, RecordStore, RecordType, SchemaHead, META_TYPE};
use sqlx::{PgPool, Row};

/// [`RecordStore`] implementation over the `record_types` and `records`
/// tables.
///
/// Every statement runs in autocommit mode, so the engine's `commit`
/// boundary is a no-op here; durability is per statement.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A record type row from the database.
#[derive(Debug)]
struct TypeRow {
    name: String,
    module: String,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for TypeRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(TypeRow {
            name: row.try_get("name")?,
            module: row.try_get("module")?,
        })
    }
}

/// Map a SQL failure into the engine's store error.
fn store_err(e: sqlx::Error) -> Error {
    Error::Store(e.to_string())
}

/// Check if a SQL error is a unique constraint violation.
fn is_unique_violation(e: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = e {
        // PostgreSQL unique violation code is "23505"
        db_err.code().map(|c| c == "23505").unwrap_or(false)
    } else {
        false
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn list_record_types(&self) -> Result<Vec<RecordType>, Error> {
        let rows = sqlx::query_as::<_, TypeRow>(
            r#"
            SELECT name, module
            FROM record_types
            WHERE NOT is_nested AND NOT is_singleton AND name <> $1
            ORDER BY module, name
            "#,
        )
        .bind(META_TYPE)
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(rows
            .into_iter()
            .map(|r| RecordType::new(r.name, r.module))
            .collect())
    }

    async fn type_exists(&self, record_type: &str) -> Result<bool, Error> {
        let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM record_types WHERE name = $1)")
            .bind(record_type)
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;
        row.try_get(0).map_err(store_err)
    }

    async fn get_schema(&self, record_type: &str) -> Result<serde_json::Value, Error> {
        let row = sqlx::query("SELECT schema FROM record_types WHERE name = $1")
            .bind(record_type)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;

        match row {
            Some(row) => row.try_get("schema").map_err(store_err),
            None => Err(Error::RecordTypeNotFound(record_type.to_string())),
        }
    }

    async fn list_records(&self, record_type: &str) -> Result<Vec<String>, Error> {
        if !self.type_exists(record_type).await? {
            return Err(Error::RecordTypeNotFound(record_type.to_string()));
        }

        let rows = sqlx::query("SELECT name FROM records WHERE record_type = $1 ORDER BY name")
            .bind(record_type)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;

        rows.into_iter()
            .map(|row| row.try_get("name").map_err(store_err))
            .collect()
    }

    async fn fetch_record(&self, record_type: &str, name: &str) -> Result<serde_json::Value, Error> {
        let row = sqlx::query("SELECT payload FROM records WHERE record_type = $1 AND name = $2")
            .bind(record_type)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;

        match row {
            Some(row) => row.try_get("payload").map_err(store_err),
            None => Err(Error::RecordNotFound {
                record_type: record_type.to_string(),
                name: name.to_string(),
            }),
        }
    }

    async fn record_exists(&self, record_type: &str, name: &str) -> Result<bool, Error> {
        let row = sqlx::query(
            "SELECT EXISTS(SELECT 1 FROM records WHERE record_type = $1 AND name = $2)",
        )
        .bind(record_type)
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(store_err)?;
        row.try_get(0).map_err(store_err)
    }

    async fn insert_record(
        &self,
        record_type: &str,
        name: &str,
        payload: serde_json::Value,
    ) -> Result<(), Error> {
        sqlx::query("INSERT INTO records (record_type, name, payload) VALUES ($1, $2, $3)")
            .bind(record_type)
            .bind(name)
            .bind(&payload)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    Error::RecordAlreadyExists {
                        record_type: record_type.to_string(),
                        name: name.to_string(),
                    }
                } else {
                    store_err(e)
                }
            })?;
        Ok(())
    }

    async fn delete_record(&self, record_type: &str, name: &str) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM records WHERE record_type = $1 AND name = $2")
            .bind(record_type)
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;

        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound {
                record_type: record_type.to_string(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    async fn create_record_type(&self, schema: serde_json::Value) -> Result<(), Error> {
        let head = SchemaHead::from_blob(&schema)?;

        sqlx::query(
            r#"
            INSERT INTO record_types (name, module, is_nested, is_singleton, schema)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&head.name)
        .bind(&head.module)
        .bind(head.is_nested)
        .bind(head.is_singleton)
        .bind(&schema)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                Error::RecordTypeAlreadyExists(head.name.clone())
            } else {
                store_err(e)
            }
        })?;
        Ok(())
    }

    async fn commit(&self) -> Result<(), Error> {
        Ok(())
    }
}
