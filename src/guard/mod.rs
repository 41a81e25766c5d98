// Per-screen access checks
pub mod approval;
pub mod auth;

pub use approval::{ApprovalGate, GateDecision};
pub use auth::AuthGuard;

use crate::routes::Destination;

/// A guard refused the screen and has already navigated to `0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect(pub Destination);
