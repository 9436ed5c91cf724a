//! Referral post repository.

use std::sync::Arc;

use crate::entities::{
    ReferralPost,
    referral_post::{self, PostStatus},
};
use candor_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, sea_query::Expr,
};

/// Referral post repository for database operations.
#[derive(Clone)]
pub struct ReferralPostRepository {
    db: Arc<DatabaseConnection>,
}

impl ReferralPostRepository {
    /// Create a new referral post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<referral_post::Model>> {
        ReferralPost::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<referral_post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: referral_post::ActiveModel) -> AppResult<referral_post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get open posts (paginated).
    pub async fn find_open(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<referral_post::Model>> {
        let mut query = ReferralPost::find()
            .filter(referral_post::Column::Status.eq(PostStatus::Open))
            .order_by_desc(referral_post::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(referral_post::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get posts authored by a participant (paginated).
    pub async fn find_by_author(
        &self,
        author_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<referral_post::Model>> {
        let mut query = ReferralPost::find()
            .filter(referral_post::Column::AuthorId.eq(author_id))
            .order_by_desc(referral_post::Column::Id);

        if let Some(id) = until_id {
            query = query.filter(referral_post::Column::Id.lt(id));
        }

        query
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Close a post. Conditional on the post still being open so that a
    /// double-close is observable as zero rows affected.
    pub async fn close(&self, id: &str) -> AppResult<u64> {
        let result = ReferralPost::update_many()
            .col_expr(
                referral_post::Column::Status,
                Expr::value(PostStatus::Closed),
            )
            .col_expr(
                referral_post::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(
                    chrono::Utc::now(),
                )),
            )
            .filter(referral_post::Column::Id.eq(id))
            .filter(referral_post::Column::Status.eq(PostStatus::Open))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Take one available slot on an offering post.
    ///
    /// Atomic decrement guarded by `available_slots > 0`; zero rows affected
    /// means the slots were exhausted by a concurrent taker.
    pub async fn take_slot(&self, id: &str) -> AppResult<u64> {
        let result = ReferralPost::update_many()
            .col_expr(
                referral_post::Column::AvailableSlots,
                Expr::col(referral_post::Column::AvailableSlots).sub(1),
            )
            .filter(referral_post::Column::Id.eq(id))
            .filter(referral_post::Column::AvailableSlots.gt(0))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }
}
