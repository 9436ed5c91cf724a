//! API integration tests.
//!
//! Drive the router end to end over a mock database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router, middleware,
    body::Body,
    http::{Request, StatusCode},
};
use candor_api::{middleware::AppState, router as api_router};
use candor_core::{
    ConnectionService, EngagementService, IdentityRevealService, NotificationService,
    ParticipantService, ReferralPostService,
};
use candor_db::entities::participant;
use candor_db::repositories::{
    ConnectionRepository, EngagementRepository, IdentityRevealRepository, NotificationRepository,
    ParticipantRepository, ReferralPostRepository,
};
use chrono::Utc;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use std::sync::Arc;
use tower::ServiceExt;

fn test_participant(id: &str) -> participant::Model {
    participant::Model {
        id: id.to_string(),
        handle: "quiet-falcon".to_string(),
        avatar_glyph: "🦉".to_string(),
        real_name: None,
        token: Some("token1".to_string()),
        created_at: Utc::now().into(),
    }
}

/// Build app state over the given mock connection.
fn create_state(db: DatabaseConnection) -> AppState {
    let db = Arc::new(db);

    let participant_repo = ParticipantRepository::new(Arc::clone(&db));
    let post_repo = ReferralPostRepository::new(Arc::clone(&db));
    let connection_repo = ConnectionRepository::new(Arc::clone(&db));
    let reveal_repo = IdentityRevealRepository::new(Arc::clone(&db));
    let engagement_repo = EngagementRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));

    let notification_service = NotificationService::new(notification_repo);

    let mut connection_service =
        ConnectionService::new(connection_repo.clone(), post_repo.clone());
    connection_service.set_notifications(notification_service.clone());

    let mut reveal_service = IdentityRevealService::new(reveal_repo, connection_repo);
    reveal_service.set_notifications(notification_service.clone());

    AppState {
        participant_service: ParticipantService::new(participant_repo),
        post_service: ReferralPostService::new(post_repo.clone()),
        connection_service,
        reveal_service,
        engagement_service: EngagementService::new(engagement_repo, post_repo),
        notification_service,
    }
}

/// Router with the auth middleware layered, as the server wires it.
fn create_router(db: DatabaseConnection) -> Router {
    let state = create_state(db);
    api_router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            candor_api::middleware::auth_middleware,
        ))
        .with_state(state)
}

#[tokio::test]
async fn test_protected_route_requires_auth() {
    let app = create_router(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/connections/list")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"direction":"sent"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let app = create_router(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .method("POST")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_with_invalid_json_returns_error() {
    let app = create_router(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/participants/register")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from("invalid json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_register_is_public() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_participant("p1")]])
        .into_connection();
    let app = create_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/participants/register")
                .method("POST")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"handle":"quiet-falcon","avatarGlyph":"🦉"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_bearer_token_resolves_participant() {
    // One query for the token lookup in the middleware.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([[test_participant("p1")]])
        .into_connection();
    let app = create_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/participants/me")
                .method("POST")
                .header("Content-Type", "application/json")
                .header("Authorization", "Bearer token1")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_bad_token_is_unauthorized() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<participant::Model>::new()])
        .into_connection();
    let app = create_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/participants/me")
                .method("POST")
                .header("Content-Type", "application/json")
                .header("Authorization", "Bearer wrong")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
