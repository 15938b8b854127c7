//! PostgreSQL implementation of VendorDirectory.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, UserId, VendorId};
use crate::ports::VendorDirectory;

use super::db_error;

/// PostgreSQL implementation of [`VendorDirectory`].
#[derive(Clone)]
pub struct PostgresVendorDirectory {
    pool: PgPool,
}

impl PostgresVendorDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VendorDirectory for PostgresVendorDirectory {
    async fn vendor_id_for_user(&self, user: UserId) -> Result<Option<VendorId>, DomainError> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM vendors WHERE user_id = $1")
            .bind(*user.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| db_error("Failed to resolve vendor profile", e))?;

        Ok(row.map(|(id,)| VendorId::from_uuid(id)))
    }
}
