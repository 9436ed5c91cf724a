//! Connection endpoints.

use axum::{Json, Router, extract::State, routing::post};
use candor_common::AppResult;
use candor_core::{ConnectionDecision, CounterpartView};
use candor_db::entities::connection::{ConnectionStatus, Model as ConnectionModel};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Create connection request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConnectionRequest {
    pub post_id: String,
    pub message: Option<String>,
}

/// Respond to connection request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondConnectionRequest {
    pub connection_id: String,
    pub decision: ConnectionDecision,
}

/// List direction.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

/// List connections request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListConnectionsRequest {
    pub direction: Direction,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
}

const fn default_limit() -> u64 {
    10
}

/// Show connection request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowConnectionRequest {
    pub connection_id: String,
}

/// Connection response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionResponse {
    pub id: String,
    pub referral_post_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub identity_revealed: bool,
    pub created_at: String,
}

impl From<ConnectionModel> for ConnectionResponse {
    fn from(c: ConnectionModel) -> Self {
        Self {
            id: c.id,
            referral_post_id: c.referral_post_id,
            sender_id: c.sender_id,
            receiver_id: c.receiver_id,
            status: status_to_string(&c.status),
            message: c.message,
            identity_revealed: c.identity_revealed,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

fn status_to_string(status: &ConnectionStatus) -> String {
    match status {
        ConnectionStatus::Pending => "pending".to_string(),
        ConnectionStatus::Accepted => "accepted".to_string(),
        ConnectionStatus::Rejected => "rejected".to_string(),
    }
}

/// Connection detail with the viewer's counterpart projection.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDetailResponse {
    pub connection: ConnectionResponse,
    pub counterpart: CounterpartView,
}

/// Open a connection against a referral post.
async fn create(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateConnectionRequest>,
) -> AppResult<ApiResponse<ConnectionResponse>> {
    let connection = state
        .connection_service
        .open(&req.post_id, &participant.id, req.message.as_deref())
        .await?;

    Ok(ApiResponse::ok(connection.into()))
}

/// Accept or reject a pending connection.
async fn respond(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<RespondConnectionRequest>,
) -> AppResult<ApiResponse<ConnectionResponse>> {
    let connection = state
        .connection_service
        .respond(&req.connection_id, &participant.id, req.decision)
        .await?;

    Ok(ApiResponse::ok(connection.into()))
}

/// List the caller's connections in one direction.
async fn list(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListConnectionsRequest>,
) -> AppResult<ApiResponse<Vec<ConnectionResponse>>> {
    let limit = req.limit.min(100);
    let connections = match req.direction {
        Direction::Sent => {
            state
                .connection_service
                .list_sent(&participant.id, limit, req.until_id.as_deref())
                .await?
        }
        Direction::Received => {
            state
                .connection_service
                .list_received(&participant.id, limit, req.until_id.as_deref())
                .await?
        }
    };

    Ok(ApiResponse::ok(
        connections.into_iter().map(Into::into).collect(),
    ))
}

/// Show one connection with the counterpart as the caller may see them.
async fn show(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowConnectionRequest>,
) -> AppResult<ApiResponse<ConnectionDetailResponse>> {
    let connection = state
        .connection_service
        .get(&req.connection_id, &participant.id)
        .await?;
    let counterpart = state
        .participant_service
        .counterpart_view(&connection, &participant.id)
        .await?;

    Ok(ApiResponse::ok(ConnectionDetailResponse {
        connection: connection.into(),
        counterpart,
    }))
}

/// Create the connections router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/respond", post(respond))
        .route("/list", post(list))
        .route("/show", post(show))
}
