//! Participant endpoints.

use axum::{Json, Router, extract::State, routing::post};
use candor_common::AppResult;
use candor_core::RegisterInput;
use candor_db::entities::participant::Model as ParticipantModel;
use serde::Serialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Participant response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantResponse {
    pub id: String,
    pub handle: String,
    pub avatar_glyph: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_name: Option<String>,
    pub created_at: String,
}

impl From<ParticipantModel> for ParticipantResponse {
    fn from(p: ParticipantModel) -> Self {
        Self {
            id: p.id,
            handle: p.handle,
            avatar_glyph: p.avatar_glyph,
            real_name: p.real_name,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Registration response: the profile plus the freshly issued token.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub participant: ParticipantResponse,
    pub token: String,
}

/// Register a participant. Public route.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<ApiResponse<RegisterResponse>> {
    let participant = state.participant_service.register(input).await?;
    let token = participant.token.clone().unwrap_or_default();

    Ok(ApiResponse::ok(RegisterResponse {
        participant: participant.into(),
        token,
    }))
}

/// The caller's own profile.
async fn me(AuthUser(participant): AuthUser) -> AppResult<ApiResponse<ParticipantResponse>> {
    Ok(ApiResponse::ok(participant.into()))
}

/// Create the participants router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/me", post(me))
}
