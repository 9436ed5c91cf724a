//! Identity reveal endpoints.

use axum::{Json, Router, extract::State, routing::post};
use candor_common::AppResult;
use candor_core::RevealDecision;
use candor_db::entities::identity_reveal::{Model as RevealModel, RevealStatus};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Request reveal request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRevealRequest {
    pub connection_id: String,
}

/// Respond to reveal request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondRevealRequest {
    pub reveal_id: String,
    pub decision: RevealDecision,
}

/// Show reveals request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRevealsRequest {
    pub connection_id: String,
}

/// Reveal response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealResponse {
    pub id: String,
    pub connection_id: String,
    pub requester_id: String,
    pub responder_id: String,
    pub status: String,
    pub created_at: String,
}

impl From<RevealModel> for RevealResponse {
    fn from(r: RevealModel) -> Self {
        Self {
            id: r.id,
            connection_id: r.connection_id,
            requester_id: r.requester_id,
            responder_id: r.responder_id,
            status: status_to_string(&r.status),
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

fn status_to_string(status: &RevealStatus) -> String {
    match status {
        RevealStatus::Pending => "pending".to_string(),
        RevealStatus::Accepted => "accepted".to_string(),
        RevealStatus::Declined => "declined".to_string(),
    }
}

/// Ask the counterpart on a connection to reveal identities.
async fn request(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RequestRevealRequest>,
) -> AppResult<ApiResponse<RevealResponse>> {
    let reveal = state
        .reveal_service
        .request(&req.connection_id, &participant.id)
        .await?;

    Ok(ApiResponse::ok(reveal.into()))
}

/// Accept or decline a pending reveal request.
async fn respond(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RespondRevealRequest>,
) -> AppResult<ApiResponse<RevealResponse>> {
    let reveal = state
        .reveal_service
        .respond(&req.reveal_id, &participant.id, req.decision)
        .await?;

    Ok(ApiResponse::ok(reveal.into()))
}

/// Show the reveal history for a connection.
async fn show(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowRevealsRequest>,
) -> AppResult<ApiResponse<Vec<RevealResponse>>> {
    let reveals = state
        .reveal_service
        .get_for_connection(&req.connection_id, &participant.id)
        .await?;

    Ok(ApiResponse::ok(reveals.into_iter().map(Into::into).collect()))
}

/// Create the reveals router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/request", post(request))
        .route("/respond", post(respond))
        .route("/show", post(show))
}
