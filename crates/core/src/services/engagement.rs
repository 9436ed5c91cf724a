//! Engagement service.
//!
//! Idempotent like/bookmark toggles on referral posts. The ledger row is
//! the single source of truth; counts are always derived from it.

use candor_common::{AppResult, IdGenerator};
use candor_db::{
    entities::engagement::{self, EngagementKind},
    repositories::{EngagementRepository, ReferralPostRepository},
};
use sea_orm::Set;
use serde::Serialize;

/// Outcome of a toggle: the participant's state afterwards and the fresh
/// per-post count for that kind.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementToggle {
    pub active: bool,
    pub count: u64,
}

/// A participant's engagement state on one post, with the post totals.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementStatus {
    pub liked: bool,
    pub bookmarked: bool,
    pub like_count: u64,
    pub bookmark_count: u64,
}

/// Engagement service for business logic.
#[derive(Clone)]
pub struct EngagementService {
    engagement_repo: EngagementRepository,
    post_repo: ReferralPostRepository,
    id_gen: IdGenerator,
}

impl EngagementService {
    /// Create a new engagement service.
    #[must_use]
    pub const fn new(
        engagement_repo: EngagementRepository,
        post_repo: ReferralPostRepository,
    ) -> Self {
        Self {
            engagement_repo,
            post_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Flip a participant's like or bookmark on a post.
    ///
    /// Delete-else-insert against the unique `(post, participant, kind)`
    /// key. Two racing toggles resolve to one state change each: the
    /// delete loser falls through to the insert, and an insert conflict
    /// means a concurrent call already put the row there.
    pub async fn toggle(
        &self,
        post_id: &str,
        participant_id: &str,
        kind: EngagementKind,
    ) -> AppResult<EngagementToggle> {
        let post = self.post_repo.get_by_id(post_id).await?;

        let active = if self
            .engagement_repo
            .delete_by_key(&post.id, participant_id, kind)
            .await?
        {
            false
        } else {
            let model = engagement::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post.id.clone()),
                participant_id: Set(participant_id.to_string()),
                kind: Set(kind),
                created_at: Set(chrono::Utc::now().into()),
            };

            // Conflict means another toggle inserted first; either way the
            // row is present now.
            let _inserted = self.engagement_repo.insert_ignore(model).await?;
            true
        };

        let count = self.engagement_repo.count_by_post(&post.id, kind).await?;

        Ok(EngagementToggle { active, count })
    }

    /// A participant's engagement on a post, plus the post's totals.
    pub async fn status(&self, post_id: &str, participant_id: &str) -> AppResult<EngagementStatus> {
        let liked = self
            .engagement_repo
            .exists(post_id, participant_id, EngagementKind::Like)
            .await?;
        let bookmarked = self
            .engagement_repo
            .exists(post_id, participant_id, EngagementKind::Bookmark)
            .await?;
        let like_count = self
            .engagement_repo
            .count_by_post(post_id, EngagementKind::Like)
            .await?;
        let bookmark_count = self
            .engagement_repo
            .count_by_post(post_id, EngagementKind::Bookmark)
            .await?;

        Ok(EngagementStatus {
            liked,
            bookmarked,
            like_count,
            bookmark_count,
        })
    }
}
