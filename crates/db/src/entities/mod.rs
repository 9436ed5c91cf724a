//! Database entities.

#![allow(missing_docs)]

pub mod connection;
pub mod engagement;
pub mod identity_reveal;
pub mod notification;
pub mod participant;
pub mod referral_post;

pub use connection::Entity as Connection;
pub use engagement::Entity as Engagement;
pub use identity_reveal::Entity as IdentityReveal;
pub use notification::Entity as Notification;
pub use participant::Entity as Participant;
pub use referral_post::Entity as ReferralPost;
