//! API endpoints.

mod connections;
mod engagement;
mod notifications;
mod participants;
mod posts;
mod reveals;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/participants", participants::router())
        .nest("/posts", posts::router())
        .nest("/connections", connections::router())
        .nest("/reveals", reveals::router())
        .nest("/engagement", engagement::router())
        .nest("/notifications", notifications::router())
}
