//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use candor_core::{
    ConnectionService, EngagementService, IdentityRevealService, NotificationService,
    ParticipantService, ReferralPostService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub participant_service: ParticipantService,
    pub post_service: ReferralPostService,
    pub connection_service: ConnectionService,
    pub reveal_service: IdentityRevealService,
    pub engagement_service: EngagementService,
    pub notification_service: NotificationService,
}

/// Authentication middleware.
///
/// Resolves a `Bearer` token into a participant and stashes it in request
/// extensions. Routes that require auth pick it up via the `AuthUser`
/// extractor; routes that don't simply never look.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(participant) = state.participant_service.authenticate_by_token(token).await
    {
        req.extensions_mut().insert(participant);
    }

    next.run(req).await
}
