//! Collection gateway domain: the allow-list registry and query types.

mod registry;

pub use registry::{
    collection_spec, owner_column_for, CollectionSpec, Operations, VENDOR_COLLECTION,
};

use serde_json::{Map, Value};

/// An opaque record flowing through the gateway: column name to JSON value.
pub type Record = Map<String, Value>;

/// Default page size for collection listings.
pub const DEFAULT_LIMIT: i64 = 50;

/// Hard cap on a requested page size.
pub const MAX_LIMIT: i64 = 200;

/// Normalized paging/filter parameters for a List operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: i64,
    pub offset: i64,
    pub category: Option<String>,
}

impl ListQuery {
    /// Builds a query from raw request parameters, applying defaults and
    /// clamping the limit to `1..=MAX_LIMIT`.
    pub fn new(limit: Option<i64>, offset: Option<i64>, category: Option<String>) -> Self {
        Self {
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: offset.unwrap_or(0).max(0),
            category: category.filter(|c| !c.is_empty()),
        }
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}
