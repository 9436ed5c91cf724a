//! Identity reveal service.
//!
//! The mutual-consent handshake layered on top of an accepted connection.
//! Either party may ask; only the other party may answer; identities are
//! exposed only once the answer is an accept.

use crate::services::event_publisher::{EventPublisherService, StreamEvent};
use crate::services::notification::NotificationService;
use candor_common::{AppError, AppResult, IdGenerator};
use candor_db::{
    entities::{
        connection::ConnectionStatus,
        identity_reveal::{self, RevealStatus},
    },
    repositories::{ConnectionRepository, IdentityRevealRepository},
};
use sea_orm::Set;
use serde::Deserialize;

/// The responder's verdict on a pending reveal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevealDecision {
    Accept,
    Decline,
}

impl RevealDecision {
    const fn as_status(self) -> RevealStatus {
        match self {
            Self::Accept => RevealStatus::Accepted,
            Self::Decline => RevealStatus::Declined,
        }
    }
}

/// Identity reveal service for business logic.
#[derive(Clone)]
pub struct IdentityRevealService {
    reveal_repo: IdentityRevealRepository,
    connection_repo: ConnectionRepository,
    notifications: Option<NotificationService>,
    event_publisher: Option<EventPublisherService>,
    id_gen: IdGenerator,
}

impl IdentityRevealService {
    /// Create a new identity reveal service.
    #[must_use]
    pub const fn new(
        reveal_repo: IdentityRevealRepository,
        connection_repo: ConnectionRepository,
    ) -> Self {
        Self {
            reveal_repo,
            connection_repo,
            notifications: None,
            event_publisher: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the notification dispatcher.
    pub fn set_notifications(&mut self, notifications: NotificationService) {
        self.notifications = Some(notifications);
    }

    /// Set the event publisher.
    pub fn set_event_publisher(&mut self, event_publisher: EventPublisherService) {
        self.event_publisher = Some(event_publisher);
    }

    /// Ask the counterpart on an accepted connection to reveal identities.
    ///
    /// The responder is always derived from the connection row, never taken
    /// from the caller. At most one pending reveal may exist per connection;
    /// the partial unique index turns a duplicate ask into `InvalidState`.
    pub async fn request(
        &self,
        connection_id: &str,
        requester_id: &str,
    ) -> AppResult<identity_reveal::Model> {
        let connection = self.connection_repo.get_by_id(connection_id).await?;

        let Some(responder_id) = connection.counterpart_of(requester_id) else {
            return Err(AppError::Forbidden(
                "Only a party to the connection may request a reveal".to_string(),
            ));
        };
        let responder_id = responder_id.to_string();

        if connection.status != ConnectionStatus::Accepted {
            return Err(AppError::InvalidState(
                "Identity reveal requires an accepted connection".to_string(),
            ));
        }
        if connection.identity_revealed {
            return Err(AppError::InvalidState(
                "Identities are already revealed on this connection".to_string(),
            ));
        }

        let model = identity_reveal::ActiveModel {
            id: Set(self.id_gen.generate()),
            connection_id: Set(connection_id.to_string()),
            requester_id: Set(requester_id.to_string()),
            responder_id: Set(responder_id.clone()),
            status: Set(RevealStatus::Pending),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        // A pending reveal already covers both parties; a second ask, from
        // either side, is a protocol misuse rather than a retryable conflict.
        let reveal = match self.reveal_repo.create_pending(model).await {
            Err(AppError::Conflict(message)) => return Err(AppError::InvalidState(message)),
            other => other?,
        };

        if let Some(ref notifications) = self.notifications
            && let Err(e) = notifications
                .notify_reveal_requested(&responder_id, requester_id, &reveal.id, connection_id)
                .await
        {
            tracing::warn!(error = %e, reveal_id = %reveal.id, "Failed to dispatch reveal notification");
        }

        if let Some(ref event_publisher) = self.event_publisher
            && let Err(e) = event_publisher
                .publish(StreamEvent::RevealRequested {
                    id: reveal.id.clone(),
                    connection_id: connection_id.to_string(),
                    requester_id: requester_id.to_string(),
                    responder_id: responder_id.clone(),
                })
                .await
        {
            tracing::warn!(error = %e, "Failed to publish reveal requested event");
        }

        Ok(reveal)
    }

    /// Accept or decline a pending reveal. Responder only.
    ///
    /// On accept the parent connection's `identity_revealed` flag is set;
    /// the flag is monotonic and never cleared again.
    pub async fn respond(
        &self,
        reveal_id: &str,
        actor_id: &str,
        decision: RevealDecision,
    ) -> AppResult<identity_reveal::Model> {
        let reveal = self.reveal_repo.get_by_id(reveal_id).await?;

        // The requester answering their own ask is Forbidden, same as an
        // outsider.
        if reveal.responder_id != actor_id {
            return Err(AppError::Forbidden(
                "Only the responder may decide a reveal request".to_string(),
            ));
        }
        if reveal.status != RevealStatus::Pending {
            return Err(AppError::InvalidState(
                "This reveal request has already been decided".to_string(),
            ));
        }

        let status = decision.as_status();
        let rows = self.reveal_repo.decide(reveal_id, status.clone()).await?;
        if rows == 0 {
            return Err(AppError::InvalidState(
                "This reveal request has already been decided".to_string(),
            ));
        }

        let accepted = decision == RevealDecision::Accept;
        if accepted {
            self.connection_repo
                .mark_identity_revealed(&reveal.connection_id)
                .await?;
        }

        if let Some(ref notifications) = self.notifications
            && let Err(e) = notifications
                .notify_reveal_decided(
                    &reveal.requester_id,
                    &reveal.responder_id,
                    reveal_id,
                    &reveal.connection_id,
                    accepted,
                )
                .await
        {
            tracing::warn!(error = %e, reveal_id, "Failed to dispatch reveal decision notification");
        }

        if let Some(ref event_publisher) = self.event_publisher
            && let Err(e) = event_publisher
                .publish(StreamEvent::RevealDecided {
                    id: reveal_id.to_string(),
                    connection_id: reveal.connection_id.clone(),
                    responder_id: actor_id.to_string(),
                    accepted,
                })
                .await
        {
            tracing::warn!(error = %e, "Failed to publish reveal decided event");
        }

        let mut decided = reveal;
        decided.status = status;
        decided.updated_at = Some(chrono::Utc::now().into());
        Ok(decided)
    }

    /// Get the reveal history for a connection, newest first. Parties only.
    pub async fn get_for_connection(
        &self,
        connection_id: &str,
        actor_id: &str,
    ) -> AppResult<Vec<identity_reveal::Model>> {
        let connection = self.connection_repo.get_by_id(connection_id).await?;
        if !connection.is_party(actor_id) {
            return Err(AppError::NotFound(format!(
                "Connection not found: {connection_id}"
            )));
        }

        self.reveal_repo.find_by_connection(connection_id, 50).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use candor_db::entities::connection;
    use candor_db::repositories::NotificationRepository;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr};
    use std::sync::Arc;

    fn test_connection(status: ConnectionStatus, revealed: bool) -> connection::Model {
        connection::Model {
            id: "c1".to_string(),
            referral_post_id: "post1".to_string(),
            sender_id: "sender1".to_string(),
            receiver_id: "author1".to_string(),
            status,
            message: None,
            identity_revealed: revealed,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_reveal(id: &str, status: RevealStatus) -> identity_reveal::Model {
        identity_reveal::Model {
            id: id.to_string(),
            connection_id: "c1".to_string(),
            requester_id: "sender1".to_string(),
            responder_id: "author1".to_string(),
            status,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> IdentityRevealService {
        IdentityRevealService::new(
            IdentityRevealRepository::new(db.clone()),
            ConnectionRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_request_derives_responder_from_connection() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_connection(ConnectionStatus::Accepted, false)]])
                .append_query_results([[test_reveal("r1", RevealStatus::Pending)]])
                .into_connection(),
        );

        // The receiver asks, so the sender must answer.
        let reveal = service(db).request("c1", "author1").await.unwrap();

        assert_eq!(reveal.status, RevealStatus::Pending);
    }

    #[tokio::test]
    async fn test_request_rejects_non_party() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_connection(ConnectionStatus::Accepted, false)]])
                .into_connection(),
        );

        let result = service(db).request("c1", "outsider").await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_request_requires_accepted_connection() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_connection(ConnectionStatus::Pending, false)]])
                .into_connection(),
        );

        let result = service(db).request("c1", "sender1").await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_request_rejects_already_revealed() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_connection(ConnectionStatus::Accepted, true)]])
                .into_connection(),
        );

        let result = service(db).request("c1", "sender1").await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_request_survives_notification_failure() {
        // The notification insert fails but the already-committed reveal
        // is still returned.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_connection(ConnectionStatus::Accepted, false)]])
                .append_query_results([[test_reveal("r1", RevealStatus::Pending)]])
                .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                    "notification insert failed".to_string(),
                ))])
                .into_connection(),
        );

        let mut service = service(db.clone());
        service.set_notifications(NotificationService::new(NotificationRepository::new(db)));

        let reveal = service.request("c1", "sender1").await.unwrap();

        assert_eq!(reveal.status, RevealStatus::Pending);
    }

    #[tokio::test]
    async fn test_respond_rejects_requester_deciding_own_request() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_reveal("r1", RevealStatus::Pending)]])
                .into_connection(),
        );

        let result = service(db)
            .respond("r1", "sender1", RevealDecision::Accept)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_respond_accept_marks_connection_revealed() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_reveal("r1", RevealStatus::Pending)]])
                .append_exec_results([
                    // the guarded status update, then the revealed flag
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let reveal = service(db)
            .respond("r1", "author1", RevealDecision::Accept)
            .await
            .unwrap();

        assert_eq!(reveal.status, RevealStatus::Accepted);
    }

    #[tokio::test]
    async fn test_respond_decline_leaves_connection_alone() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_reveal("r1", RevealStatus::Pending)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let reveal = service(db)
            .respond("r1", "author1", RevealDecision::Decline)
            .await
            .unwrap();

        assert_eq!(reveal.status, RevealStatus::Declined);
    }

    #[tokio::test]
    async fn test_respond_detects_lost_race() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_reveal("r1", RevealStatus::Pending)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let result = service(db)
            .respond("r1", "author1", RevealDecision::Accept)
            .await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }
}
