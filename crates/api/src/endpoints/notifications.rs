//! Notifications endpoints.

use axum::{Json, Router, extract::State, routing::post};
use candor_common::AppResult;
use candor_db::entities::notification::{Model as NotificationModel, NotificationType};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// List notifications request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotificationsRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
    #[serde(default)]
    pub unread_only: bool,
}

const fn default_limit() -> u64 {
    10
}

/// Single-notification request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationIdRequest {
    pub notification_id: String,
}

/// Notification response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_type: Option<String>,
    pub is_read: bool,
    pub action_taken: bool,
    pub created_at: String,
}

impl From<NotificationModel> for NotificationResponse {
    fn from(n: NotificationModel) -> Self {
        Self {
            id: n.id,
            notification_type: notification_type_to_string(&n.notification_type),
            title: n.title,
            message: n.message,
            actor_id: n.actor_id,
            deep_link: n.deep_link,
            reference_id: n.reference_id,
            reference_type: n.reference_type,
            is_read: n.is_read,
            action_taken: n.action_taken,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

fn notification_type_to_string(t: &NotificationType) -> String {
    match t {
        NotificationType::Follow => "follow".to_string(),
        NotificationType::ForumPost => "forum_post".to_string(),
        NotificationType::ForumComment => "forum_comment".to_string(),
        NotificationType::ForumLike => "forum_like".to_string(),
        NotificationType::NookPost => "nook_post".to_string(),
        NotificationType::ReferralConnection => "referral_connection".to_string(),
        NotificationType::IdentityReveal => "identity_reveal".to_string(),
        NotificationType::MentorshipRequest => "mentorship_request".to_string(),
        NotificationType::MentorshipAccepted => "mentorship_accepted".to_string(),
        NotificationType::ReferralComment => "referral_comment".to_string(),
    }
}

/// Unread count response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCountResponse {
    pub count: u64,
}

/// List the caller's notifications.
async fn list(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListNotificationsRequest>,
) -> AppResult<ApiResponse<Vec<NotificationResponse>>> {
    let notifications = state
        .notification_service
        .list(
            &participant.id,
            req.limit.min(100),
            req.until_id.as_deref(),
            req.unread_only,
        )
        .await?;

    Ok(ApiResponse::ok(
        notifications.into_iter().map(Into::into).collect(),
    ))
}

/// Count the caller's unread notifications.
async fn unread_count(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UnreadCountResponse>> {
    let count = state.notification_service.unread_count(&participant.id).await?;
    Ok(ApiResponse::ok(UnreadCountResponse { count }))
}

/// Mark one notification as read.
async fn mark_read(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NotificationIdRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .notification_service
        .mark_read(&participant.id, &req.notification_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Mark all of the caller's notifications as read.
async fn mark_all_read(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<()>> {
    state.notification_service.mark_all_read(&participant.id).await?;
    Ok(ApiResponse::ok(()))
}

/// Mark a notification as read and acted upon.
async fn mark_action_taken(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NotificationIdRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .notification_service
        .mark_action_taken(&participant.id, &req.notification_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Delete one notification.
async fn delete(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<NotificationIdRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .notification_service
        .delete(&participant.id, &req.notification_id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Delete all of the caller's notifications.
async fn delete_all(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<()>> {
    state.notification_service.delete_all(&participant.id).await?;
    Ok(ApiResponse::ok(()))
}

/// Create the notifications router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/list", post(list))
        .route("/unread-count", post(unread_count))
        .route("/mark-read", post(mark_read))
        .route("/mark-all-read", post(mark_all_read))
        .route("/mark-action-taken", post(mark_action_taken))
        .route("/delete", post(delete))
        .route("/delete-all", post(delete_all))
}
