//! Collection gateway service: list/create/update over allow-listed
//! collections, with ownership injection and row-level checks.

use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::domain::collections::{
    collection_spec, CollectionSpec, ListQuery, Record, VENDOR_COLLECTION,
};
use crate::domain::foundation::{AuthenticatedUser, DomainError, ErrorCode};
use crate::ports::CollectionStore;

/// Orchestrates gateway operations against the collection store.
#[derive(Clone)]
pub struct CollectionService {
    store: Arc<dyn CollectionStore>,
}

impl CollectionService {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    fn resolve(name: &str) -> Result<&'static CollectionSpec, DomainError> {
        collection_spec(name).ok_or_else(|| {
            DomainError::new(
                ErrorCode::UnknownCollection,
                format!("Collection '{}' is not exposed through the gateway", name),
            )
        })
    }

    /// Lists records. Public: no authentication is required for reads.
    pub async fn list(&self, name: &str, mut query: ListQuery) -> Result<Vec<Record>, DomainError> {
        let spec = Self::resolve(name)?;
        if !spec.operations.list {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                format!("Collection '{}' is not listable", name),
            ));
        }
        // Collections without a category column ignore the filter rather
        // than failing the read.
        if !spec.category_filter {
            query.category = None;
        }
        self.store.list(spec, &query).await
    }

    /// Lists the vendor catalog with the mandated quality-then-recency
    /// ordering. Stable alias independent of the generic route.
    pub async fn list_vendors(&self, query: ListQuery) -> Result<Vec<Record>, DomainError> {
        self.list(VENDOR_COLLECTION, query).await
    }

    /// Creates a record, injecting the caller as owner where the collection
    /// has an ownership rule. A submitted owner differing from the caller is
    /// rejected outright.
    pub async fn create(
        &self,
        name: &str,
        mut record: Record,
        caller: &AuthenticatedUser,
    ) -> Result<Record, DomainError> {
        let spec = Self::resolve(name)?;
        if !spec.operations.create {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                format!("Collection '{}' does not accept writes", name),
            ));
        }
        if record.is_empty() {
            return Err(DomainError::new(
                ErrorCode::EmptyRecord,
                "Create requires at least one field",
            ));
        }
        validate_writable(spec, &record)?;

        if let Some(owner) = spec.owner_column {
            apply_owner_rule(&mut record, owner, caller)?;
        }

        self.store.insert(spec, &record).await
    }

    /// Updates a record by id. The caller must own the target row when the
    /// collection has an ownership rule; the `id` key is never part of the
    /// assignment set.
    pub async fn update(
        &self,
        name: &str,
        id: Uuid,
        mut changes: Record,
        caller: &AuthenticatedUser,
    ) -> Result<Record, DomainError> {
        let spec = Self::resolve(name)?;
        if !spec.operations.update {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                format!("Collection '{}' does not accept writes", name),
            ));
        }
        changes.remove("id");
        if changes.is_empty() {
            return Err(DomainError::new(
                ErrorCode::EmptyRecord,
                "Update requires at least one field besides id",
            ));
        }
        validate_writable(spec, &changes)?;

        let existing = self
            .store
            .find_by_id(spec, id)
            .await?
            .ok_or_else(record_not_found)?;

        if let Some(owner) = spec.owner_column {
            let caller_id = caller.id.to_string();
            let row_owner = existing.get(owner).and_then(Value::as_str);
            if row_owner != Some(caller_id.as_str()) {
                return Err(DomainError::new(
                    ErrorCode::Forbidden,
                    "Caller does not own the target record",
                ));
            }
            // Ownership cannot be transferred through the gateway.
            if let Some(submitted) = changes.get(owner).and_then(Value::as_str) {
                if submitted != caller_id {
                    return Err(DomainError::new(
                        ErrorCode::Forbidden,
                        "Owner column cannot be reassigned",
                    ));
                }
            }
        }

        self.store
            .update(spec, id, &changes)
            .await?
            .ok_or_else(record_not_found)
    }
}

fn record_not_found() -> DomainError {
    DomainError::new(ErrorCode::RecordNotFound, "No record with that id")
}

/// Rejects any submitted key outside the collection's writable set.
fn validate_writable(spec: &CollectionSpec, record: &Record) -> Result<(), DomainError> {
    for key in record.keys() {
        if !spec.is_writable(key) {
            return Err(DomainError::new(
                ErrorCode::UnknownColumn,
                format!("Column '{}' is not writable on '{}'", key, spec.name),
            )
            .with_detail("column", key.clone()));
        }
    }
    Ok(())
}

/// Injects the caller as owner when absent/empty, rejects a mismatch.
fn apply_owner_rule(
    record: &mut Record,
    owner_column: &str,
    caller: &AuthenticatedUser,
) -> Result<(), DomainError> {
    let caller_id = caller.id.to_string();
    match record.get(owner_column) {
        None | Some(Value::Null) => {
            record.insert(owner_column.to_string(), Value::String(caller_id));
        }
        Some(Value::String(s)) if s.is_empty() => {
            record.insert(owner_column.to_string(), Value::String(caller_id));
        }
        Some(Value::String(s)) if *s == caller_id => {}
        Some(_) => {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Owner column must match the authenticated caller",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::domain::foundation::{UserId, UserRole};

    /// In-memory collection store keyed by collection name.
    struct MockStore {
        tables: Mutex<HashMap<String, Vec<Record>>>,
    }

    impl MockStore {
        fn new() -> Self {
            Self {
                tables: Mutex::new(HashMap::new()),
            }
        }

        fn seed(&self, collection: &str, rows: Vec<Value>) {
            let mut tables = self.tables.lock().unwrap();
            tables.insert(
                collection.to_string(),
                rows.into_iter()
                    .map(|v| v.as_object().unwrap().clone())
                    .collect(),
            );
        }

        fn rows(&self, collection: &str) -> Vec<Record> {
            self.tables
                .lock()
                .unwrap()
                .get(collection)
                .cloned()
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl CollectionStore for MockStore {
        async fn list(
            &self,
            spec: &CollectionSpec,
            query: &ListQuery,
        ) -> Result<Vec<Record>, DomainError> {
            let rows = self.rows(spec.name);
            let filtered: Vec<Record> = rows
                .into_iter()
                .filter(|r| match &query.category {
                    Some(c) => r.get("category").and_then(Value::as_str) == Some(c.as_str()),
                    None => true,
                })
                .collect();
            Ok(filtered
                .into_iter()
                .skip(query.offset as usize)
                .take(query.limit as usize)
                .collect())
        }

        async fn find_by_id(
            &self,
            spec: &CollectionSpec,
            id: Uuid,
        ) -> Result<Option<Record>, DomainError> {
            Ok(self
                .rows(spec.name)
                .into_iter()
                .find(|r| r.get("id").and_then(Value::as_str) == Some(id.to_string().as_str())))
        }

        async fn insert(
            &self,
            spec: &CollectionSpec,
            record: &Record,
        ) -> Result<Record, DomainError> {
            let mut stored = record.clone();
            stored.insert("id".into(), json!(Uuid::new_v4().to_string()));
            let mut tables = self.tables.lock().unwrap();
            tables
                .entry(spec.name.to_string())
                .or_default()
                .push(stored.clone());
            Ok(stored)
        }

        async fn update(
            &self,
            spec: &CollectionSpec,
            id: Uuid,
            changes: &Record,
        ) -> Result<Option<Record>, DomainError> {
            let mut tables = self.tables.lock().unwrap();
            let rows = tables.entry(spec.name.to_string()).or_default();
            for row in rows.iter_mut() {
                if row.get("id").and_then(Value::as_str) == Some(id.to_string().as_str()) {
                    for (k, v) in changes {
                        row.insert(k.clone(), v.clone());
                    }
                    return Ok(Some(row.clone()));
                }
            }
            Ok(None)
        }
    }

    fn caller() -> AuthenticatedUser {
        AuthenticatedUser::new(UserId::new(), "couple@example.com", UserRole::Couple)
    }

    fn service() -> (Arc<MockStore>, CollectionService) {
        let store = Arc::new(MockStore::new());
        (store.clone(), CollectionService::new(store))
    }

    #[tokio::test]
    async fn unknown_collection_is_rejected_before_any_store_call() {
        let (_, svc) = service();
        let err = svc.list("secrets", ListQuery::default()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownCollection);
    }

    #[tokio::test]
    async fn list_returns_empty_for_empty_collection() {
        let (_, svc) = service();
        let rows = svc.list("reviews", ListQuery::default()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn list_respects_limit_and_offset() {
        let (store, svc) = service();
        store.seed(
            "reviews",
            (0..10)
                .map(|i| json!({"id": Uuid::new_v4().to_string(), "rating": i}))
                .collect(),
        );
        let rows = svc
            .list("reviews", ListQuery::new(Some(3), Some(4), None))
            .await
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["rating"], 4);
    }

    #[tokio::test]
    async fn category_filter_is_ignored_for_unfiltered_collections() {
        let (store, svc) = service();
        store.seed("reviews", vec![json!({"id": Uuid::new_v4().to_string()})]);
        let rows = svc
            .list(
                "reviews",
                ListQuery::new(None, None, Some("florist".into())),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn create_injects_caller_as_owner_when_absent() {
        let (_, svc) = service();
        let user = caller();
        let created = svc
            .create(
                "reviews",
                json!({"vendor_id": Uuid::new_v4().to_string(), "rating": 5})
                    .as_object()
                    .unwrap()
                    .clone(),
                &user,
            )
            .await
            .unwrap();
        assert_eq!(created["user_id"], json!(user.id.to_string()));
        assert!(created.contains_key("id"));
    }

    #[tokio::test]
    async fn create_accepts_owner_matching_the_caller() {
        let (_, svc) = service();
        let user = caller();
        let created = svc
            .create(
                "reviews",
                json!({"user_id": user.id.to_string(), "rating": 4})
                    .as_object()
                    .unwrap()
                    .clone(),
                &user,
            )
            .await
            .unwrap();
        assert_eq!(created["user_id"], json!(user.id.to_string()));
    }

    #[tokio::test]
    async fn create_rejects_a_foreign_owner_id() {
        let (store, svc) = service();
        let err = svc
            .create(
                "reviews",
                json!({"user_id": Uuid::new_v4().to_string(), "rating": 1})
                    .as_object()
                    .unwrap()
                    .clone(),
                &caller(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        assert!(store.rows("reviews").is_empty());
    }

    #[tokio::test]
    async fn create_rejects_empty_record() {
        let (_, svc) = service();
        let err = svc
            .create("reviews", Record::new(), &caller())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyRecord);
    }

    #[tokio::test]
    async fn create_rejects_unknown_columns() {
        let (_, svc) = service();
        let err = svc
            .create(
                "reviews",
                json!({"rating": 5, "is_admin": true})
                    .as_object()
                    .unwrap()
                    .clone(),
                &caller(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::UnknownColumn);
    }

    #[tokio::test]
    async fn create_is_forbidden_on_list_only_collections() {
        let (_, svc) = service();
        let err = svc
            .create(
                "vendors",
                json!({"rating": 5}).as_object().unwrap().clone(),
                &caller(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }

    #[tokio::test]
    async fn update_strips_id_and_applies_changes() {
        let (store, svc) = service();
        let user = caller();
        let id = Uuid::new_v4();
        store.seed(
            "reviews",
            vec![json!({
                "id": id.to_string(),
                "user_id": user.id.to_string(),
                "rating": 2
            })],
        );
        let changes = json!({"id": "spoofed", "rating": 5})
            .as_object()
            .unwrap()
            .clone();
        let updated = svc.update("reviews", id, changes, &user).await.unwrap();
        assert_eq!(updated["rating"], 5);
        assert_eq!(updated["id"], json!(id.to_string()));
    }

    #[tokio::test]
    async fn update_missing_record_is_not_found() {
        let (_, svc) = service();
        let err = svc
            .update(
                "reviews",
                Uuid::new_v4(),
                json!({"rating": 3}).as_object().unwrap().clone(),
                &caller(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::RecordNotFound);
    }

    #[tokio::test]
    async fn update_by_a_non_owner_is_forbidden() {
        let (store, svc) = service();
        let id = Uuid::new_v4();
        store.seed(
            "reviews",
            vec![json!({
                "id": id.to_string(),
                "user_id": Uuid::new_v4().to_string(),
                "rating": 2
            })],
        );
        let err = svc
            .update(
                "reviews",
                id,
                json!({"rating": 5}).as_object().unwrap().clone(),
                &caller(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
        // Nothing was mutated
        assert_eq!(store.rows("reviews")[0]["rating"], 2);
    }

    #[tokio::test]
    async fn update_cannot_reassign_the_owner_column() {
        let (store, svc) = service();
        let user = caller();
        let id = Uuid::new_v4();
        store.seed(
            "reviews",
            vec![json!({
                "id": id.to_string(),
                "user_id": user.id.to_string(),
                "rating": 2
            })],
        );
        let err = svc
            .update(
                "reviews",
                id,
                json!({"user_id": Uuid::new_v4().to_string()})
                    .as_object()
                    .unwrap()
                    .clone(),
                &user,
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Forbidden);
    }
}
