// Explicit session context handed to every component that needs the session
use std::sync::Arc;

use super::{CurrentUser, Session, TokenStore};
use crate::error::StoreError;
use crate::notice::Notifier;
use crate::routes::{Destination, Navigator};

/// Shared handles for the session core.
///
/// Built once at start-up and passed by `Arc`; nothing in the crate looks the
/// session up through a global.
#[derive(Clone)]
pub struct SessionContext {
    store: Arc<TokenStore>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl SessionContext {
    pub fn new(
        store: Arc<TokenStore>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            navigator,
            notifier,
        })
    }

    /// Read the persisted store once at start-up. A torn record is healed here.
    pub fn init(&self) -> Result<Option<Session>, StoreError> {
        let session = self.store.read()?;
        match &session {
            Some(s) => tracing::info!(
                "Restored session for member {} ({}, {})",
                s.member_id,
                s.role,
                s.approval_status
            ),
            None => tracing::info!("Starting without a session"),
        }
        Ok(session)
    }

    /// Clear the session and return to login. Never fails to navigate.
    pub fn teardown(&self) {
        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear session store: {}", e);
        }
        self.navigator.navigate(Destination::Login);
    }

    pub fn session(&self) -> Result<Option<Session>, StoreError> {
        self.store.read()
    }

    pub fn current_user(&self) -> Result<Option<CurrentUser>, StoreError> {
        Ok(self.store.read()?.map(|s| s.current_user()))
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
