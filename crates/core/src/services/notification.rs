//! Notification dispatcher.
//!
//! Owns recipient resolution for every protocol transition: callers hand the
//! dispatcher the parties involved and the dispatcher decides who gets the
//! row. Persistence is best-effort relative to the primary state change;
//! callers log failures and move on.

use crate::services::event_publisher::{EventPublisherService, StreamEvent};
use candor_common::{AppError, AppResult, IdGenerator};
use candor_db::{
    entities::notification::{self, NotificationType},
    repositories::NotificationRepository,
};
use sea_orm::{ActiveEnum, Set};

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    event_publisher: Option<EventPublisherService>,
    id_gen: IdGenerator,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(notification_repo: NotificationRepository) -> Self {
        Self {
            notification_repo,
            event_publisher: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the event publisher.
    pub fn set_event_publisher(&mut self, event_publisher: EventPublisherService) {
        self.event_publisher = Some(event_publisher);
    }

    /// Notify a post author that someone opened a connection on their post.
    pub async fn notify_connection_opened(
        &self,
        author_id: &str,
        sender_id: &str,
        connection_id: &str,
        post_title: &str,
    ) -> AppResult<notification::Model> {
        self.dispatch(
            author_id,
            Some(sender_id),
            NotificationType::ReferralConnection,
            "New connection request",
            &format!("Someone wants to connect on \"{post_title}\""),
            Some(format!("/connections/{connection_id}")),
            Some(connection_id),
            Some("connection"),
        )
        .await
    }

    /// Notify a connection sender that the receiver decided their request.
    pub async fn notify_connection_decided(
        &self,
        sender_id: &str,
        receiver_id: &str,
        connection_id: &str,
        accepted: bool,
    ) -> AppResult<notification::Model> {
        let (title, message) = if accepted {
            (
                "Connection accepted",
                "Your connection request was accepted",
            )
        } else {
            (
                "Connection declined",
                "Your connection request was declined",
            )
        };

        self.dispatch(
            sender_id,
            Some(receiver_id),
            NotificationType::ReferralConnection,
            title,
            message,
            Some(format!("/connections/{connection_id}")),
            Some(connection_id),
            Some("connection"),
        )
        .await
    }

    /// Notify the responder of a new identity-reveal request.
    pub async fn notify_reveal_requested(
        &self,
        responder_id: &str,
        requester_id: &str,
        reveal_id: &str,
        connection_id: &str,
    ) -> AppResult<notification::Model> {
        self.dispatch(
            responder_id,
            Some(requester_id),
            NotificationType::IdentityReveal,
            "Identity reveal requested",
            "Your connection wants to exchange real identities",
            Some(format!("/connections/{connection_id}")),
            Some(reveal_id),
            Some("identity_reveal"),
        )
        .await
    }

    /// Notify the original requester that the responder decided their reveal.
    pub async fn notify_reveal_decided(
        &self,
        requester_id: &str,
        responder_id: &str,
        reveal_id: &str,
        connection_id: &str,
        accepted: bool,
    ) -> AppResult<notification::Model> {
        let (title, message) = if accepted {
            (
                "Identities revealed",
                "Your identity reveal request was accepted",
            )
        } else {
            (
                "Identity reveal declined",
                "Your identity reveal request was declined",
            )
        };

        self.dispatch(
            requester_id,
            Some(responder_id),
            NotificationType::IdentityReveal,
            title,
            message,
            Some(format!("/connections/{connection_id}")),
            Some(reveal_id),
            Some("identity_reveal"),
        )
        .await
    }

    /// Persist one notification row and publish the matching stream event.
    #[allow(clippy::too_many_arguments)]
    async fn dispatch(
        &self,
        recipient_id: &str,
        actor_id: Option<&str>,
        notification_type: NotificationType,
        title: &str,
        message: &str,
        deep_link: Option<String>,
        reference_id: Option<&str>,
        reference_type: Option<&str>,
    ) -> AppResult<notification::Model> {
        let notification_id = self.id_gen.generate();
        let model = notification::ActiveModel {
            id: Set(notification_id.clone()),
            recipient_id: Set(recipient_id.to_string()),
            actor_id: Set(actor_id.map(std::string::ToString::to_string)),
            notification_type: Set(notification_type.clone()),
            title: Set(title.to_string()),
            message: Set(message.to_string()),
            deep_link: Set(deep_link),
            reference_id: Set(reference_id.map(std::string::ToString::to_string)),
            reference_type: Set(reference_type.map(std::string::ToString::to_string)),
            is_read: Set(false),
            action_taken: Set(false),
            created_at: Set(chrono::Utc::now().into()),
        };

        let notification = self.notification_repo.create(model).await?;

        if let Some(ref event_publisher) = self.event_publisher
            && let Err(e) = event_publisher
                .publish(StreamEvent::Notification {
                    id: notification_id,
                    recipient_id: recipient_id.to_string(),
                    notification_type: notification_type.to_value(),
                    actor_id: actor_id.map(std::string::ToString::to_string),
                })
                .await
        {
            tracing::warn!(error = %e, "Failed to publish notification event");
        }

        Ok(notification)
    }

    /// Get notifications for a participant.
    pub async fn list(
        &self,
        recipient_id: &str,
        limit: u64,
        until_id: Option<&str>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        self.notification_repo
            .find_by_recipient(recipient_id, limit, until_id, unread_only)
            .await
    }

    /// Count unread notifications for a participant.
    pub async fn unread_count(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(recipient_id).await
    }

    /// Mark a notification as read. Recipient only.
    pub async fn mark_read(&self, recipient_id: &str, notification_id: &str) -> AppResult<()> {
        self.get_owned(recipient_id, notification_id).await?;
        self.notification_repo.mark_as_read(notification_id).await
    }

    /// Mark a notification as read and acted upon. Recipient only.
    pub async fn mark_action_taken(
        &self,
        recipient_id: &str,
        notification_id: &str,
    ) -> AppResult<()> {
        self.get_owned(recipient_id, notification_id).await?;
        self.notification_repo
            .mark_action_taken(notification_id)
            .await
    }

    /// Mark all notifications as read for a participant.
    pub async fn mark_all_read(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(recipient_id).await
    }

    /// Delete a notification. Recipient only.
    pub async fn delete(&self, recipient_id: &str, notification_id: &str) -> AppResult<()> {
        self.get_owned(recipient_id, notification_id).await?;
        self.notification_repo.delete(notification_id).await
    }

    /// Delete all notifications for a participant.
    pub async fn delete_all(&self, recipient_id: &str) -> AppResult<u64> {
        self.notification_repo
            .delete_all_for_recipient(recipient_id)
            .await
    }

    /// Load a notification, hiding rows that belong to someone else.
    async fn get_owned(
        &self,
        recipient_id: &str,
        notification_id: &str,
    ) -> AppResult<notification::Model> {
        let notification = self
            .notification_repo
            .find_by_id(notification_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        // A foreign recipient gets the same answer as a missing row.
        if notification.recipient_id != recipient_id {
            return Err(AppError::NotFound("Notification not found".to_string()));
        }

        Ok(notification)
    }
}
