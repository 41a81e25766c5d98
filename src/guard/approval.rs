use super::Redirect;
use crate::routes::Destination;
use crate::session::{ApprovalStatus, Session, SessionContext};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(Destination),
}

/// Routes members whose registration is incomplete or undecided to the
/// matching interstitial screen.
///
/// ```text
/// NONE --(member submits required fields)--> PENDING --(staff)--> APPROVED | REJECTED
/// ```
///
/// Admins bypass the gate. Only the staff decision moves a member out of
/// PENDING, and it reaches the client through a fresh session on next login.
pub struct ApprovalGate;

impl ApprovalGate {
    pub fn decide(session: &Session, requested: &Destination) -> GateDecision {
        if session.is_admin() {
            return GateDecision::Allow;
        }

        let parked_on = match session.approval_status {
            ApprovalStatus::Approved => return GateDecision::Allow,
            ApprovalStatus::None => Destination::ProfileCompletion,
            ApprovalStatus::Pending => Destination::PendingApproval,
            ApprovalStatus::Rejected => Destination::RejectionNotice,
        };

        if *requested == parked_on {
            GateDecision::Allow
        } else {
            GateDecision::Redirect(parked_on)
        }
    }

    /// Apply [`ApprovalGate::decide`], navigating when the member is redirected.
    pub fn enforce(
        ctx: &SessionContext,
        session: &Session,
        requested: &Destination,
    ) -> Result<(), Redirect> {
        match Self::decide(session, requested) {
            GateDecision::Allow => Ok(()),
            GateDecision::Redirect(to) => {
                tracing::debug!(
                    "Member {} is {}, redirecting {} -> {}",
                    session.member_id,
                    session.approval_status,
                    requested,
                    to
                );
                ctx.navigator().navigate(to.clone());
                Err(Redirect(to))
            }
        }
    }
}
