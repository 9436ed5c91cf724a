//! Core business logic for candor.
//!
//! Service types implementing the anonymous connection protocol: the
//! connection state machine, the identity-reveal handshake, the engagement
//! ledger, and the notification dispatcher.

pub mod services;

pub use services::*;
