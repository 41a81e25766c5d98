use super::Redirect;
use crate::routes::Destination;
use crate::session::{Session, SessionContext};

/// Synchronous check run on activation of every protected screen.
///
/// Token freshness is not checked here; an expired credential surfaces as a
/// 401 through the unauthorized interceptor.
pub struct AuthGuard;

impl AuthGuard {
    /// Returns the session when one exists, otherwise navigates to login.
    pub fn check(ctx: &SessionContext) -> Result<Session, Redirect> {
        let session = match ctx.session() {
            Ok(session) => session,
            Err(e) => {
                tracing::error!("Session store unreadable, treating as anonymous: {}", e);
                None
            }
        };

        match session {
            Some(session) => Ok(session),
            None => {
                tracing::debug!("Anonymous access to protected screen, redirecting to login");
                ctx.navigator().navigate(Destination::Login);
                Err(Redirect(Destination::Login))
            }
        }
    }
}
