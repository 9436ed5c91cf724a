//! Identity reveal repository.

use std::sync::Arc;

use crate::entities::{
    IdentityReveal,
    identity_reveal::{self, RevealStatus},
};
use candor_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr, prelude::DateTimeWithTimeZone, sea_query::Expr,
};

/// Identity reveal repository for database operations.
#[derive(Clone)]
pub struct IdentityRevealRepository {
    db: Arc<DatabaseConnection>,
}

impl IdentityRevealRepository {
    /// Create a new identity reveal repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a reveal by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<identity_reveal::Model>> {
        IdentityReveal::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a reveal by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<identity_reveal::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Identity reveal not found: {id}")))
    }

    /// Create a new pending reveal.
    ///
    /// The at-most-one-pending-reveal-per-connection invariant is enforced
    /// by a partial unique index; the loser of a concurrent duplicate
    /// request observes `Conflict` here.
    pub async fn create_pending(
        &self,
        model: identity_reveal::ActiveModel,
    ) -> AppResult<identity_reveal::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict(
                    "A reveal request is already pending for this connection".to_string(),
                )
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Move a pending reveal to a terminal status.
    ///
    /// Conditional update guarded by `status = 'pending'`; returns rows
    /// affected. Zero means a concurrent decision already landed.
    pub async fn decide(&self, id: &str, status: RevealStatus) -> AppResult<u64> {
        let result = IdentityReveal::update_many()
            .col_expr(identity_reveal::Column::Status, Expr::value(status))
            .col_expr(
                identity_reveal::Column::UpdatedAt,
                Expr::value(DateTimeWithTimeZone::from(chrono::Utc::now())),
            )
            .filter(identity_reveal::Column::Id.eq(id))
            .filter(identity_reveal::Column::Status.eq(RevealStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Get the reveal history for a connection (newest first).
    pub async fn find_by_connection(
        &self,
        connection_id: &str,
        limit: u64,
    ) -> AppResult<Vec<identity_reveal::Model>> {
        IdentityReveal::find()
            .filter(identity_reveal::Column::ConnectionId.eq(connection_id))
            .order_by_desc(identity_reveal::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
