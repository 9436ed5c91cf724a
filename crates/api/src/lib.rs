//! HTTP API layer for candor.
//!
//! POST-only JSON endpoints over the connection protocol:
//!
//! - **Endpoints**: connections, reveals, engagement, notifications, posts,
//!   participants
//! - **Extractors**: bearer-token authentication
//! - **Middleware**: token resolution into request extensions
//!
//! Built on Axum 0.8. Actor identity always comes from the authenticated
//! participant, never from a request body.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
