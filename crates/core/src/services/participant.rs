//! Participant service.
//!
//! Registration and the bearer-token auth seam the API middleware sits on.
//! Real names stay hidden behind the handle until a connection has gone
//! through a mutual identity reveal.

use candor_common::{AppError, AppResult, IdGenerator};
use candor_db::{
    entities::{connection, participant},
    repositories::ParticipantRepository,
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for registering a participant.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 3, max = 32, message = "Handle must be 3-32 characters"))]
    pub handle: String,
    #[validate(length(min = 1, max = 8, message = "Avatar glyph must be 1-8 characters"))]
    pub avatar_glyph: String,
    #[validate(length(max = 120, message = "Real name must be at most 120 characters"))]
    pub real_name: Option<String>,
}

/// What a connection party is allowed to see of their counterpart.
///
/// `real_name` is present only when the parent connection has
/// `identity_revealed` set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CounterpartView {
    pub id: String,
    pub handle: String,
    pub avatar_glyph: String,
    pub real_name: Option<String>,
}

/// Participant service for business logic.
#[derive(Clone)]
pub struct ParticipantService {
    participant_repo: ParticipantRepository,
    id_gen: IdGenerator,
}

impl ParticipantService {
    /// Create a new participant service.
    #[must_use]
    pub const fn new(participant_repo: ParticipantRepository) -> Self {
        Self {
            participant_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a participant and issue their bearer token.
    ///
    /// Handle uniqueness is settled by the unique index; a taken handle
    /// comes back as `Conflict`.
    pub async fn register(&self, input: RegisterInput) -> AppResult<participant::Model> {
        input.validate()?;

        let model = participant::ActiveModel {
            id: Set(self.id_gen.generate()),
            handle: Set(input.handle.trim().to_string()),
            avatar_glyph: Set(input.avatar_glyph),
            real_name: Set(input
                .real_name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())),
            token: Set(Some(self.id_gen.generate_token())),
            created_at: Set(chrono::Utc::now().into()),
        };

        self.participant_repo.create(model).await
    }

    /// Get a participant by id.
    pub async fn get(&self, participant_id: &str) -> AppResult<participant::Model> {
        self.participant_repo.get_by_id(participant_id).await
    }

    /// Resolve a bearer token to its participant.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<participant::Model> {
        self.participant_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Project the viewer's counterpart on a connection.
    ///
    /// The real name is included only once the connection's
    /// `identity_revealed` flag is set; before that the counterpart is
    /// handle and glyph only.
    pub async fn counterpart_view(
        &self,
        connection: &connection::Model,
        viewer_id: &str,
    ) -> AppResult<CounterpartView> {
        let Some(counterpart_id) = connection.counterpart_of(viewer_id) else {
            return Err(AppError::NotFound(format!(
                "Connection not found: {}",
                connection.id
            )));
        };

        let counterpart = self.participant_repo.get_by_id(counterpart_id).await?;

        Ok(CounterpartView {
            id: counterpart.id,
            handle: counterpart.handle,
            avatar_glyph: counterpart.avatar_glyph,
            real_name: if connection.identity_revealed {
                counterpart.real_name
            } else {
                None
            },
        })
    }
}
