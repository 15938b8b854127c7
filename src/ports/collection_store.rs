//! Port for the generic, registry-scoped collection store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::collections::{CollectionSpec, ListQuery, Record};
use crate::domain::foundation::DomainError;

/// Parameterized store operations over allow-listed collections.
///
/// Implementations receive a [`CollectionSpec`] rather than a raw name: by
/// the time a call reaches the store, the collection has already been
/// resolved against the registry and every identifier in the statement is a
/// registry constant.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// Lists records under the collection's defined ordering.
    async fn list(
        &self,
        spec: &CollectionSpec,
        query: &ListQuery,
    ) -> Result<Vec<Record>, DomainError>;

    /// Fetches a single record by primary key.
    async fn find_by_id(
        &self,
        spec: &CollectionSpec,
        id: Uuid,
    ) -> Result<Option<Record>, DomainError>;

    /// Inserts a record with exactly the submitted columns and returns the
    /// fully materialized row (generated id, defaults included).
    async fn insert(&self, spec: &CollectionSpec, record: &Record) -> Result<Record, DomainError>;

    /// Applies a column-wise update and returns the updated row, or `None`
    /// if no record with that id exists.
    async fn update(
        &self,
        spec: &CollectionSpec,
        id: Uuid,
        changes: &Record,
    ) -> Result<Option<Record>, DomainError>;
}
