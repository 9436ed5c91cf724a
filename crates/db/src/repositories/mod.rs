//! Database repositories.

#![allow(missing_docs)]

pub mod connection;
pub mod engagement;
pub mod identity_reveal;
pub mod notification;
pub mod participant;
pub mod referral_post;

pub use connection::ConnectionRepository;
pub use engagement::EngagementRepository;
pub use identity_reveal::IdentityRevealRepository;
pub use notification::NotificationRepository;
pub use participant::ParticipantRepository;
pub use referral_post::ReferralPostRepository;
