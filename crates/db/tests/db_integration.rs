//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `candor_test`)
//!   `TEST_DB_PASSWORD` (default: `candor_test`)
//!   `TEST_DB_NAME` (default: `candor_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use candor_common::{AppError, IdGenerator};
use candor_db::entities::{
    connection::{self, ConnectionStatus},
    identity_reveal::{self, RevealStatus},
    participant,
    referral_post::{self, PostStatus, PostType},
};
use candor_db::migrations::Migrator;
use candor_db::repositories::{
    ConnectionRepository, IdentityRevealRepository, ParticipantRepository, ReferralPostRepository,
};
use candor_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::{ConnectionTrait, DatabaseBackend, Set, Statement};
use sea_orm_migration::MigratorTrait;

async fn seed_participant(repo: &ParticipantRepository, ids: &IdGenerator) -> participant::Model {
    let id = ids.generate();
    repo.create(participant::ActiveModel {
        id: Set(id.clone()),
        handle: Set(id),
        avatar_glyph: Set("🦉".to_string()),
        real_name: Set(None),
        token: Set(Some(ids.generate_token())),
        created_at: Set(chrono::Utc::now().into()),
    })
    .await
    .expect("Failed to seed participant")
}

async fn seed_post(
    repo: &ReferralPostRepository,
    ids: &IdGenerator,
    author_id: &str,
) -> referral_post::Model {
    repo.create(referral_post::ActiveModel {
        id: Set(ids.generate()),
        author_id: Set(author_id.to_string()),
        title: Set("Referral at Acme".to_string()),
        body: Set("Senior role, happy to refer".to_string()),
        post_type: Set(PostType::Offering),
        status: Set(PostStatus::Open),
        total_slots: Set(Some(3)),
        available_slots: Set(Some(3)),
        created_at: Set(chrono::Utc::now().into()),
        updated_at: Set(None),
    })
    .await
    .expect("Failed to seed post")
}

fn pending_connection(
    ids: &IdGenerator,
    post_id: &str,
    sender_id: &str,
    receiver_id: &str,
) -> connection::ActiveModel {
    connection::ActiveModel {
        id: Set(ids.generate()),
        referral_post_id: Set(post_id.to_string()),
        sender_id: Set(sender_id.to_string()),
        receiver_id: Set(receiver_id.to_string()),
        status: Set(ConnectionStatus::Pending),
        message: Set(None),
        identity_revealed: Set(false),
        created_at: Set(chrono::Utc::now().into()),
        updated_at: Set(None),
    }
}

fn pending_reveal(
    ids: &IdGenerator,
    connection_id: &str,
    requester_id: &str,
    responder_id: &str,
) -> identity_reveal::ActiveModel {
    identity_reveal::ActiveModel {
        id: Set(ids.generate()),
        connection_id: Set(connection_id.to_string()),
        requester_id: Set(requester_id.to_string()),
        responder_id: Set(responder_id.to_string()),
        status: Set(RevealStatus::Pending),
        created_at: Set(chrono::Utc::now().into()),
        updated_at: Set(None),
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_migrations_apply_cleanly() {
    let db = TestDatabase::new().await.expect("Failed to connect");

    Migrator::up(db.connection(), None)
        .await
        .expect("Migrations failed");

    // The one-active-connection-per-pair guard must exist after migration
    let index = db
        .connection()
        .query_one(Statement::from_string(
            DatabaseBackend::Postgres,
            "SELECT indexname FROM pg_indexes \
             WHERE indexname = 'idx_connection_active_pair'"
                .to_string(),
        ))
        .await
        .expect("Index query failed");

    assert!(index.is_some(), "Partial unique index missing");

    db.cleanup().await.expect("Cleanup failed");
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_active_connection_is_conflict() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    Migrator::up(db.connection(), None)
        .await
        .expect("Migrations failed");

    let ids = IdGenerator::new();
    let participants = ParticipantRepository::new(db.shared());
    let posts = ReferralPostRepository::new(db.shared());
    let connections = ConnectionRepository::new(db.shared());

    let author = seed_participant(&participants, &ids).await;
    let sender = seed_participant(&participants, &ids).await;
    let post = seed_post(&posts, &ids, &author.id).await;

    connections
        .create_pending(pending_connection(&ids, &post.id, &sender.id, &author.id))
        .await
        .expect("First open must succeed");

    // Second open from the same sender hits the partial unique index
    let second = connections
        .create_pending(pending_connection(&ids, &post.id, &sender.id, &author.id))
        .await;

    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_duplicate_pending_reveal_is_conflict() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    Migrator::up(db.connection(), None)
        .await
        .expect("Migrations failed");

    let ids = IdGenerator::new();
    let participants = ParticipantRepository::new(db.shared());
    let posts = ReferralPostRepository::new(db.shared());
    let connections = ConnectionRepository::new(db.shared());
    let reveals = IdentityRevealRepository::new(db.shared());

    let author = seed_participant(&participants, &ids).await;
    let sender = seed_participant(&participants, &ids).await;
    let post = seed_post(&posts, &ids, &author.id).await;
    let connection = connections
        .create_pending(pending_connection(&ids, &post.id, &sender.id, &author.id))
        .await
        .expect("Open must succeed");
    connections
        .decide(&connection.id, ConnectionStatus::Accepted)
        .await
        .expect("Accept must succeed");

    reveals
        .create_pending(pending_reveal(&ids, &connection.id, &sender.id, &author.id))
        .await
        .expect("First reveal request must succeed");

    // A second ask, even from the other party, violates the partial index
    let second = reveals
        .create_pending(pending_reveal(&ids, &connection.id, &author.id, &sender.id))
        .await;

    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_cleanup() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    let result = db.cleanup().await;
    assert!(result.is_ok(), "Cleanup failed: {:?}", result.err());
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_database_url_format() {
    let config = TestDbConfig {
        host: "testhost".to_string(),
        port: 5432,
        username: "testuser".to_string(),
        password: "testpass".to_string(),
        database: "testdb".to_string(),
    };

    let url = config.database_url();
    assert!(url.starts_with("postgres://"));
    assert!(url.contains("testhost"));
    assert!(url.contains("5432"));
    assert!(url.contains("testuser"));
    assert!(url.contains("testdb"));
}
