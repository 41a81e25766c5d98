use std::sync::Arc;

use reqwest::{Response, StatusCode};

use crate::error::{PortalError, PortalResult};
use crate::session::SessionContext;

/// Turns a backend authorization failure into a forced logout.
///
/// This is the only way an expired or revoked token is detected; there is no
/// local expiry check. The response is consumed on failure so the calling
/// screen cannot go on to read the body.
#[derive(Clone)]
pub struct UnauthorizedInterceptor {
    ctx: Arc<SessionContext>,
}

impl UnauthorizedInterceptor {
    pub fn new(ctx: Arc<SessionContext>) -> Self {
        Self { ctx }
    }

    pub fn is_authorization_failure(status: StatusCode) -> bool {
        status == StatusCode::UNAUTHORIZED
    }

    pub fn inspect(&self, response: Response) -> PortalResult<Response> {
        self.inspect_status(response.status())?;
        Ok(response)
    }

    /// Status-only form of [`Self::inspect`].
    pub fn inspect_status(&self, status: StatusCode) -> PortalResult<()> {
        if !Self::is_authorization_failure(status) {
            return Ok(());
        }

        tracing::warn!("Backend returned {}, ending session", status);
        self.ctx.teardown();
        Err(PortalError::Unauthorized)
    }
}
