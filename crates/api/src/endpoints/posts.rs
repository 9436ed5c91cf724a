//! Referral post endpoints.

use axum::{Json, Router, extract::State, routing::post};
use candor_common::AppResult;
use candor_core::CreatePostInput;
use candor_db::entities::referral_post::{Model as PostModel, PostStatus, PostType};
use serde::{Deserialize, Serialize};

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Show post request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowPostRequest {
    pub post_id: String,
}

/// List posts request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsRequest {
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub until_id: Option<String>,
    /// Restrict to the caller's own posts (any status).
    #[serde(default)]
    pub mine: bool,
}

const fn default_limit() -> u64 {
    10
}

/// Post response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub author_id: String,
    pub title: String,
    pub body: String,
    pub post_type: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_slots: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_slots: Option<i32>,
    pub created_at: String,
}

impl From<PostModel> for PostResponse {
    fn from(p: PostModel) -> Self {
        Self {
            id: p.id,
            author_id: p.author_id,
            title: p.title,
            body: p.body,
            post_type: match p.post_type {
                PostType::Seeking => "seeking".to_string(),
                PostType::Offering => "offering".to_string(),
            },
            status: match p.status {
                PostStatus::Open => "open".to_string(),
                PostStatus::Closed => "closed".to_string(),
            },
            total_slots: p.total_slots,
            available_slots: p.available_slots,
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Create a referral post.
async fn create(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePostInput>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.create(&participant.id, input).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Show one post.
async fn show(
    AuthUser(_participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowPostRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state.post_service.get(&req.post_id).await?;
    Ok(ApiResponse::ok(post.into()))
}

/// List open posts, or the caller's own.
async fn list(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ListPostsRequest>,
) -> AppResult<ApiResponse<Vec<PostResponse>>> {
    let limit = req.limit.min(100);
    let posts = if req.mine {
        state
            .post_service
            .list_by_author(&participant.id, limit, req.until_id.as_deref())
            .await?
    } else {
        state
            .post_service
            .list_open(limit, req.until_id.as_deref())
            .await?
    };

    Ok(ApiResponse::ok(posts.into_iter().map(Into::into).collect()))
}

/// Close a post. Author only.
async fn close(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowPostRequest>,
) -> AppResult<ApiResponse<PostResponse>> {
    let post = state
        .post_service
        .close(&req.post_id, &participant.id)
        .await?;
    Ok(ApiResponse::ok(post.into()))
}

/// Consume one referral slot. Author only.
async fn take_slot(
    AuthUser(participant): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ShowPostRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .post_service
        .take_slot(&req.post_id, &participant.id)
        .await?;
    Ok(ApiResponse::ok(()))
}

/// Create the posts router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/show", post(show))
        .route("/list", post(list))
        .route("/close", post(close))
        .route("/take-slot", post(take_slot))
}
