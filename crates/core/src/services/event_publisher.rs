//! Event publisher service.
//!
//! Provides an abstraction for publishing real-time events. No transport is
//! wired in by default; [`NoOpEventPublisher`] is used unless a deployment
//! supplies its own implementation.

use async_trait::async_trait;
use candor_common::AppResult;
use std::sync::Arc;

/// Event types for real-time updates.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// A connection request was opened against a referral post.
    ConnectionOpened {
        id: String,
        post_id: String,
        sender_id: String,
        receiver_id: String,
    },
    /// A pending connection was accepted or rejected by its receiver.
    ConnectionDecided {
        id: String,
        receiver_id: String,
        accepted: bool,
    },
    /// An identity-reveal request was opened on a connection.
    RevealRequested {
        id: String,
        connection_id: String,
        requester_id: String,
        responder_id: String,
    },
    /// A pending reveal was accepted or declined by its responder.
    RevealDecided {
        id: String,
        connection_id: String,
        responder_id: String,
        accepted: bool,
    },
    /// A new notification was created.
    Notification {
        id: String,
        recipient_id: String,
        notification_type: String,
        actor_id: Option<String>,
    },
}

/// Trait for publishing real-time events.
///
/// Lets the core services announce state changes without depending on any
/// particular delivery mechanism.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish one event to the transport.
    async fn publish(&self, event: StreamEvent) -> AppResult<()>;
}

/// A no-op implementation of `EventPublisher` for testing or when real-time
/// events are disabled.
#[derive(Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisher for NoOpEventPublisher {
    async fn publish(&self, _event: StreamEvent) -> AppResult<()> {
        Ok(())
    }
}

/// Shared handle to an event publisher implementation.
pub type EventPublisherService = Arc<dyn EventPublisher>;
