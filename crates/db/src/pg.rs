//! Postgres-backed document store.
//!
//! All collections share the `documents` table, keyed by
//! `(collection, id)` with the entity body in a JSONB `data` column.
//! Merge writes use the JSONB `||` operator, so only top-level keys are
//! merged.

use async_trait::async_trait;
use creogen_core::store::{BatchWrite, DocumentStore, FieldFilter, FilterOp, StoreError};
use creogen_core::types::DocId;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::StoreConfig;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        data JSONB NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (collection, id)
    )";

const CREATE_DATA_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS documents_data_idx ON documents USING GIN (data)";

const UPSERT_REPLACE: &str = "INSERT INTO documents (collection, id, data)
     VALUES ($1, $2, $3)
     ON CONFLICT (collection, id)
     DO UPDATE SET data = EXCLUDED.data, updated_at = now()";

const UPSERT_MERGE: &str = "INSERT INTO documents (collection, id, data)
     VALUES ($1, $2, $3)
     ON CONFLICT (collection, id)
     DO UPDATE SET data = documents.data || EXCLUDED.data, updated_at = now()";

const DELETE: &str = "DELETE FROM documents WHERE collection = $1 AND id = $2";

/// Document store over a Postgres connection pool.
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Open a pool and make sure the `documents` table exists.
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        for statement in [CREATE_TABLE, CREATE_DATA_INDEX] {
            sqlx::query(statement)
                .execute(&pool)
                .await
                .map_err(|e| StoreError::Connection(format!("schema bootstrap failed: {e}")))?;
        }

        tracing::info!(
            max_connections = config.max_connections,
            "Document store connected"
        );

        Ok(Self { pool })
    }

    /// Wrap an existing pool. The `documents` table must already exist.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn upsert_sql(merge: bool) -> &'static str {
    if merge {
        UPSERT_MERGE
    } else {
        UPSERT_REPLACE
    }
}

fn comparison(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Eq => "=",
        FilterOp::Ne => "<>",
        FilterOp::Lt => "<",
        FilterOp::Le => "<=",
        FilterOp::Gt => ">",
        FilterOp::Ge => ">=",
        FilterOp::In | FilterOp::ArrayContains => "@>",
    }
}

/// Append ` AND <predicate>` for one filter. Field names are bound as
/// parameters, never interpolated.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &FieldFilter) {
    qb.push(" AND ");
    match filter.op {
        FilterOp::In => {
            qb.push_bind(Json(filter.value.clone()))
                .push(" @> (data -> ")
                .push_bind(filter.field.clone())
                .push(")");
        }
        FilterOp::ArrayContains => {
            qb.push("(data -> ")
                .push_bind(filter.field.clone())
                .push(") @> ")
                .push_bind(Json(Value::Array(vec![filter.value.clone()])));
        }
        FilterOp::Lt | FilterOp::Le | FilterOp::Gt | FilterOp::Ge => {
            // jsonb orders across types; only numbers against numbers and
            // strings against strings may match.
            let value = Json(filter.value.clone());
            qb.push("jsonb_typeof(data -> ")
                .push_bind(filter.field.clone())
                .push(") IN ('number', 'string') AND jsonb_typeof(data -> ")
                .push_bind(filter.field.clone())
                .push(") = jsonb_typeof(")
                .push_bind(value.clone())
                .push(") AND (data -> ")
                .push_bind(filter.field.clone())
                .push(") ")
                .push(comparison(filter.op))
                .push(" ")
                .push_bind(value);
        }
        op => {
            qb.push("(data -> ")
                .push_bind(filter.field.clone())
                .push(") ")
                .push(comparison(op))
                .push(" ")
                .push_bind(Json(filter.value.clone()));
        }
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn set(
        &self,
        collection: &str,
        id: &str,
        data: Value,
        merge: bool,
    ) -> Result<(), StoreError> {
        sqlx::query(upsert_sql(merge))
            .bind(collection)
            .bind(id)
            .bind(Json(data))
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::operation(collection, "set", e))?;
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Value>, StoreError> {
        let row = sqlx::query_scalar::<_, Json<Value>>(
            "SELECT data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::operation(collection, "get", e))?;
        Ok(row.map(|Json(data)| data))
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> Result<Vec<(DocId, Value)>, StoreError> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT id, data FROM documents WHERE collection = ");
        qb.push_bind(collection.to_string());
        for filter in filters {
            push_filter(&mut qb, filter);
        }
        qb.push(" ORDER BY created_at, id");

        let rows: Vec<(String, Json<Value>)> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::operation(collection, "query", e))?;

        tracing::debug!(collection, filters = filters.len(), rows = rows.len(), "Queried documents");
        Ok(rows.into_iter().map(|(id, Json(data))| (id, data)).collect())
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        sqlx::query(DELETE)
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::operation(collection, "delete", e))?;
        Ok(())
    }

    async fn write_batch(&self, writes: Vec<BatchWrite>) -> Result<(), StoreError> {
        if writes.is_empty() {
            return Ok(());
        }
        let count = writes.len();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::operation("*", "batch", e))?;

        for write in writes {
            match write {
                BatchWrite::Set {
                    collection,
                    id,
                    data,
                    merge,
                } => {
                    sqlx::query(upsert_sql(merge))
                        .bind(&collection)
                        .bind(&id)
                        .bind(Json(data))
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| StoreError::operation(&collection, "batch set", e))?;
                }
                BatchWrite::Delete { collection, id } => {
                    sqlx::query(DELETE)
                        .bind(&collection)
                        .bind(&id)
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| StoreError::operation(&collection, "batch delete", e))?;
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::operation("*", "batch commit", e))?;

        tracing::debug!(writes = count, "Committed document batch");
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Document store closed");
    }
}
