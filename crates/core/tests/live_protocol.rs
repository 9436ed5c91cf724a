//! Protocol flow tests against a live database.
//!
//! These cover the invariants that only the real unique indexes can
//! enforce: the duplicate-open conflict and the single-pending-reveal
//! rule. `MockDatabase` cannot synthesize unique violations, so the
//! in-module service tests stop short of these paths.
//!
//! Requires a running `PostgreSQL` instance, same setup as the candor-db
//! integration tests. Run with:
//! `cargo test -p candor-core --test live_protocol -- --ignored`

#![allow(clippy::unwrap_used, clippy::expect_used)]

use candor_common::AppError;
use candor_core::{
    ConnectionDecision, ConnectionService, CreatePostInput, IdentityRevealService,
    ParticipantService, ReferralPostService, RegisterInput,
};
use candor_db::entities::referral_post::PostType;
use candor_db::repositories::{
    ConnectionRepository, IdentityRevealRepository, ParticipantRepository, ReferralPostRepository,
};
use candor_db::test_utils::TestDatabase;

struct Harness {
    participants: ParticipantService,
    posts: ReferralPostService,
    connections: ConnectionService,
    reveals: IdentityRevealService,
}

async fn harness() -> Harness {
    let db = TestDatabase::new().await.expect("Failed to connect");
    candor_db::migrate(db.connection())
        .await
        .expect("Migrations failed");

    Harness {
        participants: ParticipantService::new(ParticipantRepository::new(db.shared())),
        posts: ReferralPostService::new(ReferralPostRepository::new(db.shared())),
        connections: ConnectionService::new(
            ConnectionRepository::new(db.shared()),
            ReferralPostRepository::new(db.shared()),
        ),
        reveals: IdentityRevealService::new(
            IdentityRevealRepository::new(db.shared()),
            ConnectionRepository::new(db.shared()),
        ),
    }
}

async fn register(participants: &ParticipantService, prefix: &str) -> String {
    let suffix = candor_common::IdGenerator::new().generate();
    participants
        .register(RegisterInput {
            handle: format!("{prefix}-{}", &suffix[..20]),
            avatar_glyph: "🦉".to_string(),
            real_name: None,
        })
        .await
        .expect("Registration failed")
        .id
}

async fn open_post(posts: &ReferralPostService, author_id: &str) -> String {
    posts
        .create(
            author_id,
            CreatePostInput {
                title: "Referral at Acme".to_string(),
                body: "Senior role, happy to refer".to_string(),
                post_type: PostType::Offering,
                total_slots: Some(3),
            },
        )
        .await
        .expect("Post creation failed")
        .id
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_second_open_for_same_pair_is_conflict() {
    let h = harness().await;

    let author = register(&h.participants, "author").await;
    let sender = register(&h.participants, "sender").await;
    let post = open_post(&h.posts, &author).await;

    h.connections
        .open(&post, &sender, Some("hi"))
        .await
        .expect("First open must succeed");

    let second = h.connections.open(&post, &sender, None).await;

    assert!(matches!(second, Err(AppError::Conflict(_))));
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_second_reveal_request_while_pending_is_invalid_state() {
    let h = harness().await;

    let author = register(&h.participants, "author").await;
    let sender = register(&h.participants, "sender").await;
    let post = open_post(&h.posts, &author).await;

    let connection = h
        .connections
        .open(&post, &sender, None)
        .await
        .expect("Open must succeed");
    h.connections
        .respond(&connection.id, &author, ConnectionDecision::Accept)
        .await
        .expect("Accept must succeed");

    h.reveals
        .request(&connection.id, &sender)
        .await
        .expect("First reveal request must succeed");

    // A second ask while one is pending is protocol misuse, from either side
    let from_sender = h.reveals.request(&connection.id, &sender).await;
    assert!(matches!(from_sender, Err(AppError::InvalidState(_))));

    let from_author = h.reveals.request(&connection.id, &author).await;
    assert!(matches!(from_author, Err(AppError::InvalidState(_))));
}
