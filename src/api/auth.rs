// Password login and logout
use reqwest::{Method, StatusCode};
use serde::Serialize;

use super::{format, PortalClient};
use crate::error::{PortalError, PortalResult};
use crate::routes::Destination;
use crate::session::{Session, SessionFields};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub pwd: String,
}

/// Whether the backend acknowledged the logout. The local session is cleared
/// either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    Confirmed,
    Unconfirmed,
}

impl PortalClient {
    /// Exchange credentials for a session and go home.
    ///
    /// The response must carry all of `token`, `id`, `role`, `status`;
    /// otherwise nothing is stored. Credentials of an earlier session are
    /// not sent.
    pub async fn login(&self, request: &LoginRequest) -> PortalResult<Session> {
        let response = self
            .anonymous_request(Method::POST, "login")?
            .json(request)
            .send()
            .await?;

        // a 401 here means bad credentials, not an expired session
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match status {
                StatusCode::UNAUTHORIZED => "invalid email or password".to_string(),
                _ => format::error_message(&body),
            };
            return Err(PortalError::http(status, message));
        }

        let body = response.text().await?;
        let fields: SessionFields = format::decode_data(serde_json::from_str(&body)?)?;
        let session = fields
            .into_session()
            .map_err(|missing| PortalError::MissingCredentials { missing })?;

        let ctx = self.context();
        ctx.store().write(&session)?;
        tracing::info!(
            "Logged in as member {} ({}, {})",
            session.member_id,
            session.role,
            session.approval_status
        );
        ctx.navigator().navigate(Destination::Home);
        Ok(session)
    }

    /// Best-effort session termination. Never gets stuck: the local session
    /// is cleared and the user lands on login whatever the backend answers.
    pub async fn logout(&self) -> LogoutOutcome {
        let outcome = match self.request(Method::POST, "logout") {
            Ok(builder) => match builder.send().await {
                Ok(response) if response.status().is_success() => LogoutOutcome::Confirmed,
                Ok(response) => {
                    tracing::debug!("Logout returned {}, ignoring", response.status());
                    LogoutOutcome::Unconfirmed
                }
                Err(e) => {
                    tracing::debug!("Logout request failed, ignoring: {}", e);
                    LogoutOutcome::Unconfirmed
                }
            },
            Err(e) => {
                tracing::debug!("Could not build logout request, ignoring: {}", e);
                LogoutOutcome::Unconfirmed
            }
        };

        self.context().teardown();
        outcome
    }
}
