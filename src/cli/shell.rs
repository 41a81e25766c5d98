use std::sync::Arc;

use crate::api::PortalClient;
use crate::config::PortalConfig;
use crate::notice::LogNotifier;
use crate::oauth::OAuthCallbackIngest;
use crate::routes::{Destination, HistoryNavigator, Navigator};
use crate::session::{FileBackend, SessionContext, TokenStore};

/// Everything a command needs: the session context backed by the on-disk
/// store, the API client and the navigation history of this invocation.
pub struct Shell {
    pub ctx: Arc<SessionContext>,
    pub client: PortalClient,
    pub navigator: Arc<HistoryNavigator>,
    pub oauth: OAuthCallbackIngest,
}

impl Shell {
    pub fn open(config: &PortalConfig) -> anyhow::Result<Self> {
        let config_dir = config.config_dir()?;
        let backend = FileBackend::in_dir(&config_dir);
        tracing::debug!("Session store at {}", backend.path().display());

        let navigator = HistoryNavigator::new();
        let ctx = SessionContext::new(
            Arc::new(TokenStore::new(backend)),
            navigator.clone(),
            Arc::new(LogNotifier),
        );
        ctx.init()?;

        let client = PortalClient::new(ctx.clone(), &config.api)?;
        let oauth = OAuthCallbackIngest::new(ctx.clone(), config.oauth.home_delay());

        Ok(Self {
            ctx,
            client,
            navigator,
            oauth,
        })
    }

    /// Where the last navigation of this invocation landed, if anywhere.
    pub fn location(&self) -> Option<Destination> {
        self.navigator.current()
    }
}
