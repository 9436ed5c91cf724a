//! Connection repository.

use std::sync::Arc;

use crate::entities::{
    Connection,
    connection::{self, ConnectionStatus},
};
use candor_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, SqlErr, prelude::DateTimeWithTimeZone, sea_query::Expr,
};

/// Connection repository for database operations.
#[derive(Clone)]
pub struct ConnectionRepository {
    db: Arc<DatabaseConnection>,
}

impl ConnectionRepository {
    /// Create a new connection repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a connection by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<connection::Model>> {
        Connection::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a connection by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<connection::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Connection not found: {id}")))
    }

    /// Create a new pending connection.
    ///
    /// The one-active-connection-per-`(post, sender)` invariant is enforced
    /// by a partial unique index, so two concurrent opens from the same
    /// sender cannot both succeed; the loser gets `Conflict` here rather
    /// than a read-then-write race.
    pub async fn create_pending(
        &self,
        model: connection::ActiveModel,
    ) -> AppResult<connection::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict(
                    "An active connection already exists for this post".to_string(),
                )
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Move a pending connection to a terminal status.
    ///
    /// Conditional update guarded by `status = 'pending'`; returns the number
    /// of rows affected. Zero means a concurrent decision already landed.
    pub async fn decide(&self, id: &str, status: ConnectionStatus) -> AppResult<u64> {
        let result = Connection::update_many()
            .col_expr(connection::Column::Status, Expr::value(status))
            .col_expr(
                connection::Column::UpdatedAt,
                Expr::value(DateTimeWithTimeZone::from(chrono::Utc::now())),
            )
            .filter(connection::Column::Id.eq(id))
            .filter(connection::Column::Status.eq(ConnectionStatus::Pending))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Set `identity_revealed` to true.
    ///
    /// Monotonic: there is no operation that sets it back, and setting it
    /// twice is a harmless no-op.
    pub async fn mark_identity_revealed(&self, id: &str) -> AppResult<()> {
        Connection::update_many()
            .col_expr(connection::Column::IdentityRevealed, Expr::value(true))
            .col_expr(
                connection::Column::UpdatedAt,
                Expr::value(DateTimeWithTimeZone::from(chrono::Utc::now())),
            )
            .filter(connection::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Get connections sent by a participant (paginated, newest first).
    pub async fn find_sent(
        &self,
        sender_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<connection::Model>> {
        let mut query = Connection::find()
            .filter(connection::Column::SenderId.eq(sender_id))
            .order_by_desc(connection::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(connection::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get connections received by a participant (paginated, newest first).
    pub async fn find_received(
        &self,
        receiver_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<connection::Model>> {
        let mut query = Connection::find()
            .filter(connection::Column::ReceiverId.eq(receiver_id))
            .order_by_desc(connection::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(connection::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
