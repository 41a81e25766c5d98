// Backend API client. Every screen reaches the backend through `PortalClient`
pub mod auth;
pub mod clients;
pub mod format;
pub mod member;

use std::sync::Arc;

use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ApiConfig;
use crate::error::{PortalError, PortalResult};
use crate::middleware::{RequestAuthorizer, UnauthorizedInterceptor};
use crate::session::SessionContext;

pub use auth::{LoginRequest, LogoutOutcome};
pub use clients::{ClientDetail, ClientSummary, ImageRef};
pub use format::Page;
pub use member::{MemberProfile, ProfileCompletion};

#[derive(Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: Url,
    ctx: Arc<SessionContext>,
    interceptor: UnauthorizedInterceptor,
    log_requests: bool,
}

impl PortalClient {
    pub fn new(ctx: Arc<SessionContext>, api: &ApiConfig) -> PortalResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(api.request_timeout())
            .build()?;

        // a trailing slash makes Url::join append instead of replacing the last segment
        let base_url = Url::parse(&format!("{}/", api.base_url.trim_end_matches('/')))?;

        Ok(Self {
            http,
            base_url,
            interceptor: UnauthorizedInterceptor::new(ctx.clone()),
            ctx,
            log_requests: api.enable_request_logging,
        })
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.ctx
    }

    pub fn endpoint(&self, path: &str) -> PortalResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Request builder carrying the credentials of the current session.
    pub fn request(&self, method: Method, path: &str) -> PortalResult<RequestBuilder> {
        let builder = self.anonymous_request(method, path)?;
        let session = self.ctx.session()?;
        Ok(RequestAuthorizer::authorize(builder, session.as_ref()))
    }

    /// Request builder without credentials, for exchanges that create a session.
    pub fn anonymous_request(&self, method: Method, path: &str) -> PortalResult<RequestBuilder> {
        let url = self.endpoint(path)?;
        if self.log_requests {
            tracing::debug!("{} {}", method, url);
        }
        Ok(self.http.request(method, url))
    }

    /// Send and classify the response.
    ///
    /// 401 ends the session through the interceptor. Other failure statuses
    /// become [`PortalError::Http`] and leave the session alone.
    pub async fn send(&self, builder: RequestBuilder) -> PortalResult<Response> {
        let response = builder.send().await?;
        let response = self.interceptor.inspect(response)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = format::error_message(&body);
        tracing::debug!("Request failed with {}: {}", status, message);
        Err(PortalError::http(status, message))
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> PortalResult<T> {
        let response = self.send(self.request(Method::GET, path)?).await?;
        let body = response.text().await?;
        format::decode_data(serde_json::from_str(&body)?)
    }
}

impl std::fmt::Debug for PortalClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortalClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}
