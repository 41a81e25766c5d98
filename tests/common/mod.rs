#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::http::HeaderMap;
use axum::Router;

use matchmaker_portal::api::PortalClient;
use matchmaker_portal::config::ApiConfig;
use matchmaker_portal::notice::RecordingNotifier;
use matchmaker_portal::routes::HistoryNavigator;
use matchmaker_portal::session::{ApprovalStatus, Role, Session, SessionContext, TokenStore};

/// Serve `routes` under `/api/v0` on a free local port and return the API base URL.
pub async fn spawn_backend(routes: Router) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind mock backend")?;

    let app = Router::new().nest("/api/v0", routes);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://127.0.0.1:{}/api/v0", port))
}

/// Base URL of a port nothing listens on.
pub fn unreachable_backend() -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    Ok(format!("http://127.0.0.1:{}/api/v0", port))
}

/// Authorization headers seen by the mock backend, in arrival order.
#[derive(Clone, Default)]
pub struct SeenAuth(Arc<Mutex<Vec<Option<String>>>>);

impl SeenAuth {
    pub fn record(&self, headers: &HeaderMap) {
        let value = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.0.lock().unwrap().push(value);
    }

    pub fn all(&self) -> Vec<Option<String>> {
        self.0.lock().unwrap().clone()
    }
}

/// Client plus in-memory session context with recording navigator and notifier
pub struct Harness {
    pub ctx: Arc<SessionContext>,
    pub nav: Arc<HistoryNavigator>,
    pub notices: Arc<RecordingNotifier>,
    pub client: PortalClient,
}

impl Harness {
    pub fn anonymous(base_url: &str) -> Result<Self> {
        let nav = HistoryNavigator::new();
        let notices = RecordingNotifier::new();
        let ctx = SessionContext::new(
            Arc::new(TokenStore::in_memory()),
            nav.clone(),
            notices.clone(),
        );
        let api = ApiConfig {
            base_url: base_url.to_string(),
            request_timeout_secs: 5,
            enable_request_logging: true,
        };
        let client = PortalClient::new(ctx.clone(), &api)?;
        Ok(Self {
            ctx,
            nav,
            notices,
            client,
        })
    }

    pub fn with_session(base_url: &str, session: Session) -> Result<Self> {
        let harness = Self::anonymous(base_url)?;
        harness.ctx.store().write(&session)?;
        Ok(harness)
    }
}

pub fn member(status: ApprovalStatus) -> Session {
    Session::new("member-token", "5", Role::Member, status)
}

pub fn admin() -> Session {
    Session::new("admin-token", "1", Role::Admin, ApprovalStatus::Approved)
}
