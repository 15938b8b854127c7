//! PostgreSQL implementation of the generic collection store.
//!
//! Statements are assembled from registry constants only: the table name,
//! the column list, and the ordering clause all come from the
//! [`CollectionSpec`], never from request input. Submitted values travel
//! through a single `jsonb` bind and are projected onto typed columns with
//! `jsonb_populate_record`, so Postgres performs the type coercion and the
//! statement shape is independent of the payload.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::collections::{CollectionSpec, ListQuery, Record};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::CollectionStore;

use super::db_error;

/// PostgreSQL implementation of [`CollectionStore`].
#[derive(Clone)]
pub struct PostgresCollectionStore {
    pool: PgPool,
}

impl PostgresCollectionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CollectionStore for PostgresCollectionStore {
    async fn list(
        &self,
        spec: &CollectionSpec,
        query: &ListQuery,
    ) -> Result<Vec<Record>, DomainError> {
        let order = order_clause(spec);

        let rows: Vec<Value> = if let Some(category) = &query.category {
            let sql = format!(
                "SELECT to_jsonb(t.*) FROM {} t WHERE t.category = $1 \
                 ORDER BY {} LIMIT $2 OFFSET $3",
                spec.name, order
            );
            sqlx::query_scalar(&sql)
                .bind(category)
                .bind(query.limit)
                .bind(query.offset)
                .fetch_all(&self.pool)
                .await
        } else {
            let sql = format!(
                "SELECT to_jsonb(t.*) FROM {} t ORDER BY {} LIMIT $1 OFFSET $2",
                spec.name, order
            );
            sqlx::query_scalar(&sql)
                .bind(query.limit)
                .bind(query.offset)
                .fetch_all(&self.pool)
                .await
        }
        .map_err(|e| db_error("Failed to list collection", e))?;

        rows.into_iter().map(value_to_record).collect()
    }

    async fn find_by_id(
        &self,
        spec: &CollectionSpec,
        id: Uuid,
    ) -> Result<Option<Record>, DomainError> {
        let sql = format!("SELECT to_jsonb(t.*) FROM {} t WHERE t.id = $1", spec.name);

        let row: Option<Value> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to fetch record", e))?;

        row.map(value_to_record).transpose()
    }

    async fn insert(&self, spec: &CollectionSpec, record: &Record) -> Result<Record, DomainError> {
        let columns = static_columns(spec, record)?;
        let column_list = columns.join(", ");

        // Exactly the submitted columns are written; everything else takes
        // its database default (id, timestamps).
        let sql = format!(
            "INSERT INTO {table} ({cols}) \
             SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $1) \
             RETURNING to_jsonb({table}.*)",
            table = spec.name,
            cols = column_list,
        );

        let row: Value = sqlx::query_scalar(&sql)
            .bind(Value::Object(record.clone()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| db_error("Failed to insert record", e))?;

        value_to_record(row)
    }

    async fn update(
        &self,
        spec: &CollectionSpec,
        id: Uuid,
        changes: &Record,
    ) -> Result<Option<Record>, DomainError> {
        let columns = static_columns(spec, changes)?;
        let column_list = columns.join(", ");

        let sql = format!(
            "UPDATE {table} SET ({cols}) = \
             (SELECT {cols} FROM jsonb_populate_record(NULL::{table}, $2)) \
             WHERE id = $1 \
             RETURNING to_jsonb({table}.*)",
            table = spec.name,
            cols = column_list,
        );

        let row: Option<Value> = sqlx::query_scalar(&sql)
            .bind(id)
            .bind(Value::Object(changes.clone()))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to update record", e))?;

        row.map(value_to_record).transpose()
    }
}

/// Vendor listings rank by rating before recency; unrated vendors sort last.
/// Every other collection lists newest first.
fn order_clause(spec: &CollectionSpec) -> &'static str {
    if spec.vendor_ordering {
        "t.rating DESC NULLS LAST, t.created_at DESC"
    } else {
        "t.created_at DESC"
    }
}

/// Resolves each submitted key to the registry's own `&'static str` for that
/// column. The application layer validates writability before calling the
/// store; this re-resolution guarantees that no caller-owned string ever
/// reaches the statement text.
fn static_columns(
    spec: &CollectionSpec,
    record: &Record,
) -> Result<Vec<&'static str>, DomainError> {
    record
        .keys()
        .map(|key| {
            spec.writable_columns
                .iter()
                .find(|c| *c == key)
                .copied()
                .ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::UnknownColumn,
                        format!("Column not writable in {}: {}", spec.name, key),
                    )
                })
        })
        .collect()
}

fn value_to_record(value: Value) -> Result<Record, DomainError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Expected a JSON object row, got: {}", other),
        )),
    }
}
