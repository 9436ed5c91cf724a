//! Engagement repository.

use std::sync::Arc;

use crate::entities::{
    Engagement,
    engagement::{self, EngagementKind},
};
use candor_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    sea_query::OnConflict,
};

/// Engagement repository for database operations.
///
/// The `(post_id, participant_id, kind)` tuple is the unit of mutual
/// exclusion: insertion goes through `ON CONFLICT DO NOTHING` against the
/// unique index and removal through a keyed conditional delete, so
/// concurrent duplicate toggles from the same participant cannot double
/// count.
#[derive(Clone)]
pub struct EngagementRepository {
    db: Arc<DatabaseConnection>,
}

impl EngagementRepository {
    /// Create a new engagement repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Insert a record unless the key already exists.
    ///
    /// Returns `true` if the row was inserted, `false` if a concurrent or
    /// earlier insert already holds the key.
    pub async fn insert_ignore(&self, model: engagement::ActiveModel) -> AppResult<bool> {
        let result = Engagement::insert(model)
            .on_conflict(
                OnConflict::columns([
                    engagement::Column::PostId,
                    engagement::Column::ParticipantId,
                    engagement::Column::Kind,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(self.db.as_ref())
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Delete a record by key.
    ///
    /// Returns `true` if a row was deleted, `false` if there was nothing to
    /// delete (e.g. a concurrent toggle got there first).
    pub async fn delete_by_key(
        &self,
        post_id: &str,
        participant_id: &str,
        kind: EngagementKind,
    ) -> AppResult<bool> {
        let result = Engagement::delete_many()
            .filter(engagement::Column::PostId.eq(post_id))
            .filter(engagement::Column::ParticipantId.eq(participant_id))
            .filter(engagement::Column::Kind.eq(kind))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    /// Check whether a record exists for the key.
    pub async fn exists(
        &self,
        post_id: &str,
        participant_id: &str,
        kind: EngagementKind,
    ) -> AppResult<bool> {
        let found = Engagement::find()
            .filter(engagement::Column::PostId.eq(post_id))
            .filter(engagement::Column::ParticipantId.eq(participant_id))
            .filter(engagement::Column::Kind.eq(kind))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(found.is_some())
    }

    /// Count records of one kind on a post.
    ///
    /// Counts are always derived from row existence; there is no separate
    /// stored counter to drift from it.
    pub async fn count_by_post(&self, post_id: &str, kind: EngagementKind) -> AppResult<u64> {
        Engagement::find()
            .filter(engagement::Column::PostId.eq(post_id))
            .filter(engagement::Column::Kind.eq(kind))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
