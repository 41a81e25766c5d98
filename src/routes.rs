// Route table and navigation
use std::fmt;
use std::sync::{Arc, Mutex};

use serde::Serialize;

/// Named screens of the portal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", content = "id", rename_all = "snake_case")]
pub enum Destination {
    Home,
    Login,
    Signup,
    OAuthSuccess,
    PendingApproval,
    ProfileCompletion,
    RejectionNotice,
    ClientList,
    ClientDetail(String),
    ClientNew,
    ClientEdit(String),
    ProfileDetail(String),
    Matches,
    MatchingRoom(String),
    MyClients,
    MemberDetail(String),
    AdminMembers,
    AdminPendingMembers,
}

impl Destination {
    pub fn path(&self) -> String {
        match self {
            Destination::Home => "/".to_string(),
            Destination::Login => "/login".to_string(),
            Destination::Signup => "/signup".to_string(),
            Destination::OAuthSuccess => "/oauth/success".to_string(),
            Destination::PendingApproval => "/pending".to_string(),
            Destination::ProfileCompletion => "/member/complete".to_string(),
            Destination::RejectionNotice => "/rejected".to_string(),
            Destination::ClientList => "/client".to_string(),
            Destination::ClientDetail(id) => format!("/client/detail/{id}"),
            Destination::ClientNew => "/client/new".to_string(),
            Destination::ClientEdit(id) => format!("/client/edit/{id}"),
            Destination::ProfileDetail(id) => format!("/profiles/{id}"),
            Destination::Matches => "/matches".to_string(),
            Destination::MatchingRoom(id) => format!("/matching/{id}"),
            Destination::MyClients => "/myclient".to_string(),
            Destination::MemberDetail(id) => format!("/member/detail/{id}"),
            Destination::AdminMembers => "/admin/member".to_string(),
            Destination::AdminPendingMembers => "/admin/member/pending".to_string(),
        }
    }

    /// Inverse of [`Destination::path`]. Query strings and a trailing slash are ignored.
    pub fn parse(path: &str) -> Option<Self> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        let dest = match segments.as_slice() {
            [] => Destination::Home,
            ["login"] => Destination::Login,
            ["signup"] => Destination::Signup,
            ["oauth", "success"] => Destination::OAuthSuccess,
            ["pending"] => Destination::PendingApproval,
            ["member", "complete"] => Destination::ProfileCompletion,
            ["rejected"] => Destination::RejectionNotice,
            ["client"] => Destination::ClientList,
            ["client", "new"] => Destination::ClientNew,
            ["client", "detail", id] => Destination::ClientDetail(id.to_string()),
            ["client", "edit", id] => Destination::ClientEdit(id.to_string()),
            ["profiles", id] => Destination::ProfileDetail(id.to_string()),
            ["matches"] => Destination::Matches,
            ["matching", id] => Destination::MatchingRoom(id.to_string()),
            ["myclient"] => Destination::MyClients,
            ["member", "detail", id] => Destination::MemberDetail(id.to_string()),
            ["admin", "member"] => Destination::AdminMembers,
            ["admin", "member", "pending"] => Destination::AdminPendingMembers,
            _ => return None,
        };
        Some(dest)
    }

    /// Reachable without a session.
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            Destination::Login | Destination::Signup | Destination::OAuthSuccess
        )
    }

    pub fn is_admin_only(&self) -> bool {
        matches!(
            self,
            Destination::AdminMembers | Destination::AdminPendingMembers
        )
    }

    /// Screens a member is parked on while registration is incomplete or undecided.
    pub fn is_approval_interstitial(&self) -> bool {
        matches!(
            self,
            Destination::PendingApproval
                | Destination::ProfileCompletion
                | Destination::RejectionNotice
        )
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Moves the user between screens.
pub trait Navigator: Send + Sync {
    fn navigate(&self, to: Destination);
    fn current(&self) -> Option<Destination>;
}

/// Navigator that keeps the full history; the CLI shell renders its last entry.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<Destination>>,
}

impl HistoryNavigator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn history(&self) -> Vec<Destination> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, to: Destination) {
        tracing::debug!("Navigating to {}", to);
        if let Ok(mut history) = self.history.lock() {
            history.push(to);
        }
    }

    fn current(&self) -> Option<Destination> {
        self.history.lock().ok().and_then(|h| h.last().cloned())
    }
}
