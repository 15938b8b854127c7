//! DTOs for the collection gateway endpoints.

use serde::Deserialize;

use crate::domain::collections::ListQuery;

/// Query parameters accepted by List operations.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub category: Option<String>,
}

/// Query parameters accepted by Update operations. The target id may also
/// arrive in the request body instead.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateParams {
    pub id: Option<String>,
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        ListQuery::new(params.limit, params.offset, params.category)
    }
}
