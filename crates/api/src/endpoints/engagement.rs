//! Engagement endpoints.

use axum::{Json, Router, extract::State, routing::post};
use candor_common::AppResult;
use candor_core::{EngagementStatus, EngagementToggle};
use candor_db::entities::engagement::EngagementKind;
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Engagement kind selector.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindSelector {
    Like,
    Bookmark,
}

impl KindSelector {
    const fn to_kind(self) -> EngagementKind {
        match self {
            Self::Like => EngagementKind::Like,
            Self::Bookmark => EngagementKind::Bookmark,
        }
    }
}

/// Toggle engagement request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleRequest {
    pub post_id: String,
    pub kind: KindSelector,
}

/// Engagement status request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequest {
    pub post_id: String,
}

/// Flip the caller's like or bookmark on a post.
async fn toggle(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ToggleRequest>,
) -> AppResult<ApiResponse<EngagementToggle>> {
    let result = state
        .engagement_service
        .toggle(&req.post_id, &participant.id, req.kind.to_kind())
        .await?;

    Ok(ApiResponse::ok(result))
}

/// The caller's engagement on a post plus the post totals.
async fn status(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<StatusRequest>,
) -> AppResult<ApiResponse<EngagementStatus>> {
    let result = state
        .engagement_service
        .status(&req.post_id, &participant.id)
        .await?;

    Ok(ApiResponse::ok(result))
}

/// Create the engagement router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/toggle", post(toggle))
        .route("/status", post(status))
}
