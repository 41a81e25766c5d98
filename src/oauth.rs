//! OAuth success redirect handling.
//!
//! The identity provider sends the browser to `/oauth/success?id=..&token=..&role=..&status=..`.
//! Ingest folds those parameters into the session store exactly once per
//! visit. A redirect missing any parameter writes nothing.

use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::error::{PortalError, PortalResult};
use crate::routes::Destination;
use crate::session::{Session, SessionContext, SessionFields};

pub struct OAuthCallbackIngest {
    ctx: Arc<SessionContext>,
    home_delay: Duration,
}

impl OAuthCallbackIngest {
    pub fn new(ctx: Arc<SessionContext>, home_delay: Duration) -> Self {
        Self { ctx, home_delay }
    }

    /// Extract the session fields from a raw query string (leading `?` allowed).
    /// Later duplicates of a key override earlier ones.
    pub fn parse_query(query: &str) -> SessionFields {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut fields = SessionFields::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = Some(value.into_owned());
            match key.as_ref() {
                "token" => fields.token = value,
                "id" => fields.id = value,
                "role" => fields.role = value,
                "status" => fields.status = value,
                _ => {}
            }
        }
        fields
    }

    /// Like [`Self::parse_query`], for the full redirect URL.
    pub fn parse_url(redirect: &str) -> PortalResult<SessionFields> {
        let url = Url::parse(redirect)?;
        Ok(Self::parse_query(url.query().unwrap_or_default()))
    }

    /// Handle one arrival at the OAuth success screen.
    ///
    /// On success the session is written, then after the confirmation delay the
    /// user is taken home. On failure the user is warned and sent to login
    /// immediately, and the store is left untouched.
    pub async fn ingest(&self, query: &str) -> PortalResult<Session> {
        self.ingest_fields(Self::parse_query(query)).await
    }

    /// [`Self::ingest`] for fields that were already extracted.
    pub async fn ingest_fields(&self, fields: SessionFields) -> PortalResult<Session> {
        let session = match fields.into_session() {
            Ok(session) => session,
            Err(missing) => {
                tracing::warn!("OAuth redirect rejected, missing parameters: {:?}", missing);
                self.ctx
                    .notifier()
                    .warn("Login information is invalid (missing redirect parameters).");
                self.ctx.navigator().navigate(Destination::Login);
                return Err(PortalError::MissingCredentials { missing });
            }
        };

        self.ctx.store().write(&session)?;
        tracing::info!(
            "OAuth login for member {} ({}, {})",
            session.member_id,
            session.role,
            session.approval_status
        );

        tokio::time::sleep(self.home_delay).await;
        self.ctx.navigator().navigate(Destination::Home);
        Ok(session)
    }
}
