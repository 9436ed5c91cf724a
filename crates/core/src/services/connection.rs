//! Connection service.
//!
//! The connection state machine: a participant opens a pending connection
//! against someone else's referral post, and only the post author decides
//! it. Accepted and rejected are terminal.

use crate::services::event_publisher::{EventPublisherService, StreamEvent};
use crate::services::notification::NotificationService;
use candor_common::{AppError, AppResult, IdGenerator};
use candor_db::{
    entities::{
        connection::{self, ConnectionStatus},
        referral_post::PostStatus,
    },
    repositories::{ConnectionRepository, ReferralPostRepository},
};
use sea_orm::Set;
use serde::Deserialize;

/// Maximum length of the optional intro message, in characters.
const MAX_MESSAGE_CHARS: usize = 500;

/// The receiver's verdict on a pending connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionDecision {
    Accept,
    Reject,
}

impl ConnectionDecision {
    const fn as_status(self) -> ConnectionStatus {
        match self {
            Self::Accept => ConnectionStatus::Accepted,
            Self::Reject => ConnectionStatus::Rejected,
        }
    }
}

/// Connection service for business logic.
#[derive(Clone)]
pub struct ConnectionService {
    connection_repo: ConnectionRepository,
    post_repo: ReferralPostRepository,
    notifications: Option<NotificationService>,
    event_publisher: Option<EventPublisherService>,
    id_gen: IdGenerator,
}

impl ConnectionService {
    /// Create a new connection service.
    #[must_use]
    pub const fn new(connection_repo: ConnectionRepository, post_repo: ReferralPostRepository) -> Self {
        Self {
            connection_repo,
            post_repo,
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

    /// Open a pending connection against a referral post.
    ///
    /// The author of the post becomes the receiver. At most one active
    /// (pending or accepted) connection may exist per `(post, sender)`;
    /// a duplicate open surfaces as `Conflict` from the atomic insert.
    pub async fn open(
        &self,
        post_id: &str,
        sender_id: &str,
        message: Option<&str>,
    ) -> AppResult<connection::Model> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if post.status != PostStatus::Open {
            return Err(AppError::InvalidState(
                "This post is no longer open".to_string(),
            ));
        }
        if post.author_id == sender_id {
            return Err(AppError::Forbidden(
                "Cannot connect to your own post".to_string(),
            ));
        }

        let message = normalize_message(message)?;

        let model = connection::ActiveModel {
            id: Set(self.id_gen.generate()),
            referral_post_id: Set(post.id.clone()),
            sender_id: Set(sender_id.to_string()),
            receiver_id: Set(post.author_id.clone()),
            status: Set(ConnectionStatus::Pending),
            message: Set(message),
            identity_revealed: Set(false),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let connection = self.connection_repo.create_pending(model).await?;

        if let Some(ref notifications) = self.notifications
            && let Err(e) = notifications
                .notify_connection_opened(&post.author_id, sender_id, &connection.id, &post.title)
                .await
        {
            tracing::warn!(error = %e, connection_id = %connection.id, "Failed to dispatch connection notification");
        }

        if let Some(ref event_publisher) = self.event_publisher
            && let Err(e) = event_publisher
                .publish(StreamEvent::ConnectionOpened {
                    id: connection.id.clone(),
                    post_id: post_id.to_string(),
                    sender_id: sender_id.to_string(),
                    receiver_id: post.author_id.clone(),
                })
                .await
        {
            tracing::warn!(error = %e, "Failed to publish connection opened event");
        }

        Ok(connection)
    }

    /// Accept or reject a pending connection. Receiver only.
    pub async fn respond(
        &self,
        connection_id: &str,
        actor_id: &str,
        decision: ConnectionDecision,
    ) -> AppResult<connection::Model> {
        let connection = self.connection_repo.get_by_id(connection_id).await?;

        // The sender cannot decide their own request, and outsiders cannot
        // decide at all. Both read as Forbidden; the client message is
        // neutralized either way.
        if connection.receiver_id != actor_id {
            return Err(AppError::Forbidden(
                "Only the receiver may decide a connection".to_string(),
            ));
        }
        if connection.status != ConnectionStatus::Pending {
            return Err(AppError::InvalidState(
                "This connection has already been decided".to_string(),
            ));
        }

        let status = decision.as_status();
        let rows = self
            .connection_repo
            .decide(connection_id, status.clone())
            .await?;
        if rows == 0 {
            // A concurrent decision won the guarded update.
            return Err(AppError::InvalidState(
                "This connection has already been decided".to_string(),
            ));
        }

        let accepted = decision == ConnectionDecision::Accept;

        if let Some(ref notifications) = self.notifications
            && let Err(e) = notifications
                .notify_connection_decided(
                    &connection.sender_id,
                    &connection.receiver_id,
                    connection_id,
                    accepted,
                )
                .await
        {
            tracing::warn!(error = %e, connection_id, "Failed to dispatch decision notification");
        }

        if let Some(ref event_publisher) = self.event_publisher
            && let Err(e) = event_publisher
                .publish(StreamEvent::ConnectionDecided {
                    id: connection_id.to_string(),
                    receiver_id: connection.receiver_id.clone(),
                    accepted,
                })
                .await
        {
            tracing::warn!(error = %e, "Failed to publish connection decided event");
        }

        let mut decided = connection;
        decided.status = status;
        decided.updated_at = Some(chrono::Utc::now().into());
        Ok(decided)
    }

    /// Get a single connection. Parties only.
    ///
    /// Non-parties get the same `NotFound` as a missing row so connection
    /// ids cannot be probed.
    pub async fn get(&self, connection_id: &str, actor_id: &str) -> AppResult<connection::Model> {
        let connection = self.connection_repo.get_by_id(connection_id).await?;
        if !connection.is_party(actor_id) {
            return Err(AppError::NotFound(format!(
                "Connection not found: {connection_id}"
            )));
        }
        Ok(connection)
    }

    /// List connections the participant has sent, newest first.
    pub async fn list_sent(
        &self,
        participant_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<connection::Model>> {
        self.connection_repo
            .find_sent(participant_id, limit, until_id)
            .await
    }

    /// List connections the participant has received, newest first.
    pub async fn list_received(
        &self,
        participant_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<connection::Model>> {
        self.connection_repo
            .find_received(participant_id, limit, until_id)
            .await
    }
}

/// Trim the intro message, dropping it entirely when blank.
fn normalize_message(message: Option<&str>) -> AppResult<Option<String>> {
    match message.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) if trimmed.chars().count() > MAX_MESSAGE_CHARS => Err(AppError::Validation(
            "Message must be at most 500 characters".to_string(),
        )),
        Some(trimmed) => Ok(Some(trimmed.to_string())),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::event_publisher::EventPublisher;
    use candor_db::entities::referral_post::{self, PostType};
    use candor_db::repositories::NotificationRepository;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct RecordingPublisher {
        events: Mutex<Vec<StreamEvent>>,
    }

    #[async_trait::async_trait]
    impl EventPublisher for RecordingPublisher {
        async fn publish(&self, event: StreamEvent) -> AppResult<()> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    fn test_post(id: &str, author_id: &str, status: PostStatus) -> referral_post::Model {
        referral_post::Model {
            id: id.to_string(),
            author_id: author_id.to_string(),
            title: "Referral at Acme".to_string(),
            body: "Senior role, happy to refer".to_string(),
            post_type: PostType::Offering,
            status,
            total_slots: Some(3),
            available_slots: Some(3),
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn test_connection(id: &str, status: ConnectionStatus) -> connection::Model {
        connection::Model {
            id: id.to_string(),
            referral_post_id: "post1".to_string(),
            sender_id: "sender1".to_string(),
            receiver_id: "author1".to_string(),
            status,
            message: None,
            identity_revealed: false,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service(db: Arc<sea_orm::DatabaseConnection>) -> ConnectionService {
        ConnectionService::new(
            ConnectionRepository::new(db.clone()),
            ReferralPostRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_open_rejects_own_post() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_post("post1", "author1", PostStatus::Open)]])
                .into_connection(),
        );

        let result = service(db).open("post1", "author1", None).await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_open_rejects_closed_post() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_post("post1", "author1", PostStatus::Closed)]])
                .into_connection(),
        );

        let result = service(db).open("post1", "sender1", None).await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_open_rejects_oversized_message() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_post("post1", "author1", PostStatus::Open)]])
                .into_connection(),
        );

        let long = "x".repeat(501);
        let result = service(db).open("post1", "sender1", Some(&long)).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_open_creates_pending_connection() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_post("post1", "author1", PostStatus::Open)]])
                .append_query_results([[test_connection("c1", ConnectionStatus::Pending)]])
                .into_connection(),
        );

        let connection = service(db).open("post1", "sender1", Some("  hi  ")).await.unwrap();

        assert_eq!(connection.status, ConnectionStatus::Pending);
        assert_eq!(connection.receiver_id, "author1");
    }

    #[tokio::test]
    async fn test_open_survives_notification_failure() {
        // The notification insert fails but the already-committed
        // connection is still returned.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_post("post1", "author1", PostStatus::Open)]])
                .append_query_results([[test_connection("c1", ConnectionStatus::Pending)]])
                .append_query_errors([DbErr::Query(RuntimeErr::Internal(
                    "notification insert failed".to_string(),
                ))])
                .into_connection(),
        );

        let mut service = service(db.clone());
        service.set_notifications(NotificationService::new(NotificationRepository::new(db)));

        let connection = service.open("post1", "sender1", None).await.unwrap();

        assert_eq!(connection.status, ConnectionStatus::Pending);
    }

    #[tokio::test]
    async fn test_open_publishes_stream_event() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_post("post1", "author1", PostStatus::Open)]])
                .append_query_results([[test_connection("c1", ConnectionStatus::Pending)]])
                .into_connection(),
        );

        let publisher = Arc::new(RecordingPublisher::default());
        let mut service = service(db);
        service.set_event_publisher(publisher.clone());

        service.open("post1", "sender1", None).await.unwrap();

        let events = publisher.events.lock().unwrap();
        assert!(matches!(
            events.as_slice(),
            [StreamEvent::ConnectionOpened { receiver_id, .. }] if receiver_id == "author1"
        ));
    }

    #[tokio::test]
    async fn test_respond_requires_receiver() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_connection("c1", ConnectionStatus::Pending)]])
                .into_connection(),
        );

        // The sender trying to accept their own request.
        let result = service(db)
            .respond("c1", "sender1", ConnectionDecision::Accept)
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_respond_rejects_already_decided() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_connection("c1", ConnectionStatus::Accepted)]])
                .into_connection(),
        );

        let result = service(db)
            .respond("c1", "author1", ConnectionDecision::Reject)
            .await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_respond_detects_lost_race() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_connection("c1", ConnectionStatus::Pending)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let result = service(db)
            .respond("c1", "author1", ConnectionDecision::Accept)
            .await;

        assert!(matches!(result, Err(AppError::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_respond_accepts() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_connection("c1", ConnectionStatus::Pending)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let connection = service(db)
            .respond("c1", "author1", ConnectionDecision::Accept)
            .await
            .unwrap();

        assert_eq!(connection.status, ConnectionStatus::Accepted);
    }

    #[tokio::test]
    async fn test_get_hides_connection_from_non_party() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_connection("c1", ConnectionStatus::Pending)]])
                .into_connection(),
        );

        let result = service(db).get("c1", "outsider").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_normalize_message() {
        assert_eq!(normalize_message(None).unwrap(), None);
        assert_eq!(normalize_message(Some("   ")).unwrap(), None);
        assert_eq!(
            normalize_message(Some("  hello  ")).unwrap(),
            Some("hello".to_string())
        );
        assert!(normalize_message(Some(&"x".repeat(501))).is_err());
    }
}
