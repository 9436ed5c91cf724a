//! Candor server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use candor_api::{middleware::AppState, router as api_router};
use candor_common::Config;
use candor_core::{
    ConnectionService, EngagementService, EventPublisherService, IdentityRevealService,
    NoOpEventPublisher, NotificationService, ParticipantService, ReferralPostService,
};
use candor_db::repositories::{
    ConnectionRepository, EngagementRepository, IdentityRevealRepository, NotificationRepository,
    ParticipantRepository, ReferralPostRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "candor=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting candor server...");

    let config = Config::load()?;

    let db = candor_db::init(&config).await?;
    info!("Connected to database");

    candor_db::migrate(&db).await?;
    info!("Migrations completed");

    // Repositories
    let db = Arc::new(db);
    let participant_repo = ParticipantRepository::new(Arc::clone(&db));
    let post_repo = ReferralPostRepository::new(Arc::clone(&db));
    let connection_repo = ConnectionRepository::new(Arc::clone(&db));
    let reveal_repo = IdentityRevealRepository::new(Arc::clone(&db));
    let engagement_repo = EngagementRepository::new(Arc::clone(&db));
    let notification_repo = NotificationRepository::new(Arc::clone(&db));

    // Services. Real-time delivery is a seam only; the no-op publisher
    // stands in until a deployment brings its own transport.
    let event_publisher: EventPublisherService = Arc::new(NoOpEventPublisher);

    let mut notification_service = NotificationService::new(notification_repo);
    notification_service.set_event_publisher(event_publisher.clone());

    let mut connection_service =
        ConnectionService::new(connection_repo.clone(), post_repo.clone());
    connection_service.set_notifications(notification_service.clone());
    connection_service.set_event_publisher(event_publisher.clone());

    let mut reveal_service = IdentityRevealService::new(reveal_repo, connection_repo);
    reveal_service.set_notifications(notification_service.clone());
    reveal_service.set_event_publisher(event_publisher);

    let state = AppState {
        participant_service: ParticipantService::new(participant_repo),
        post_service: ReferralPostService::new(post_repo.clone()),
        connection_service,
        reveal_service,
        engagement_service: EngagementService::new(engagement_repo, post_repo),
        notification_service,
    };

    let app = Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            candor_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
