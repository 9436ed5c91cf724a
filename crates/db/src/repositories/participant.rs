//! Participant repository.

use std::sync::Arc;

use crate::entities::{Participant, participant};
use candor_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, SqlErr,
};

/// Participant repository for database operations.
#[derive(Clone)]
pub struct ParticipantRepository {
    db: Arc<DatabaseConnection>,
}

impl ParticipantRepository {
    /// Create a new participant repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a participant by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<participant::Model>> {
        Participant::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a participant by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<participant::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ParticipantNotFound(id.to_string()))
    }

    /// Find a participant by token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<participant::Model>> {
        Participant::find()
            .filter(participant::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new participant.
    ///
    /// Handle uniqueness is enforced by the unique index; a violation maps
    /// to `Conflict` so concurrent registrations cannot both succeed.
    pub async fn create(&self, model: participant::ActiveModel) -> AppResult<participant::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Handle already taken".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }
}
