//! Business logic services.

#![allow(missing_docs)]

pub mod connection;
pub mod engagement;
pub mod event_publisher;
pub mod identity_reveal;
pub mod notification;
pub mod participant;
pub mod referral_post;

pub use connection::{ConnectionDecision, ConnectionService};
pub use engagement::{EngagementService, EngagementStatus, EngagementToggle};
pub use event_publisher::{EventPublisher, EventPublisherService, NoOpEventPublisher, StreamEvent};
pub use identity_reveal::{IdentityRevealService, RevealDecision};
pub use notification::NotificationService;
pub use participant::{CounterpartView, ParticipantService, RegisterInput};
pub use referral_post::{CreatePostInput, ReferralPostService};
