//! Referral post service.
//!
//! The minimal author surface the connection protocol anchors to: posts are
//! created, listed while open, and closed by their author. Offering posts
//! may carry slot accounting.

use candor_common::{AppError, AppResult, IdGenerator};
use candor_db::{
    entities::referral_post::{self, PostStatus, PostType},
    repositories::ReferralPostRepository,
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Input for creating a referral post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 120, message = "Title must be 1-120 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 4000, message = "Body must be 1-4000 characters"))]
    pub body: String,
    pub post_type: PostType,
    #[validate(range(min = 1, max = 50, message = "Slots must be 1-50"))]
    pub total_slots: Option<i32>,
}

/// Referral post service for business logic.
#[derive(Clone)]
pub struct ReferralPostService {
    post_repo: ReferralPostRepository,
    id_gen: IdGenerator,
}

impl ReferralPostService {
    /// Create a new referral post service.
    #[must_use]
    pub const fn new(post_repo: ReferralPostRepository) -> Self {
        Self {
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a post. Slot accounting starts full.
    pub async fn create(
        &self,
        author_id: &str,
        input: CreatePostInput,
    ) -> AppResult<referral_post::Model> {
        input.validate()?;

        let model = referral_post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author_id.to_string()),
            title: Set(input.title.trim().to_string()),
            body: Set(input.body.trim().to_string()),
            post_type: Set(input.post_type),
            status: Set(PostStatus::Open),
            total_slots: Set(input.total_slots),
            available_slots: Set(input.total_slots),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        self.post_repo.create(model).await
    }

    /// Get a post by id.
    pub async fn get(&self, post_id: &str) -> AppResult<referral_post::Model> {
        self.post_repo.get_by_id(post_id).await
    }

    /// List open posts, newest first.
    pub async fn list_open(
        &self,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<referral_post::Model>> {
        self.post_repo.find_open(limit, until_id).await
    }

    /// List a participant's own posts, newest first.
    pub async fn list_by_author(
        &self,
        author_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<referral_post::Model>> {
        self.post_repo.find_by_author(author_id, limit, until_id).await
    }

    /// Close a post. Author only, idempotent.
    ///
    /// The status flip is conditional on the post still being open; a
    /// repeat close affects zero rows and simply returns the closed post.
    pub async fn close(&self, post_id: &str, actor_id: &str) -> AppResult<referral_post::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != actor_id {
            return Err(AppError::Forbidden(
                "Only the author may close a post".to_string(),
            ));
        }

        self.post_repo.close(post_id).await?;

        let mut closed = post;
        closed.status = PostStatus::Closed;
        Ok(closed)
    }

    /// Consume one referral slot. Author only.
    ///
    /// Guarded decrement; exhausted slots surface as `InvalidState` rather
    /// than a negative count.
    pub async fn take_slot(&self, post_id: &str, actor_id: &str) -> AppResult<()> {
        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != actor_id {
            return Err(AppError::Forbidden(
                "Only the author may take a slot".to_string(),
            ));
        }
        if post.total_slots.is_none() {
            return Err(AppError::InvalidState(
                "This post has no slot accounting".to_string(),
            ));
        }

        let rows = self.post_repo.take_slot(post_id).await?;
        if rows == 0 {
            return Err(AppError::InvalidState("No slots remaining".to_string()));
        }
        Ok(())
    }
}
