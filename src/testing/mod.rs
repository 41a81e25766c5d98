use std::sync::Arc;

use crate::notice::RecordingNotifier;
use crate::routes::HistoryNavigator;
use crate::session::{ApprovalStatus, Role, Session, SessionContext, TokenStore};

/// In-memory session context with recording navigator and notifier
pub struct TestContext {
    pub ctx: Arc<SessionContext>,
    pub nav: Arc<HistoryNavigator>,
    pub notices: Arc<RecordingNotifier>,
}

impl TestContext {
    pub fn anonymous() -> Self {
        let nav = HistoryNavigator::new();
        let notices = RecordingNotifier::new();
        let ctx = SessionContext::new(
            Arc::new(TokenStore::in_memory()),
            nav.clone(),
            notices.clone(),
        );
        Self { ctx, nav, notices }
    }

    pub fn with_session(session: Session) -> Self {
        let test = Self::anonymous();
        test.ctx
            .store()
            .write(&session)
            .expect("in-memory store write");
        test
    }
}

pub fn member(status: ApprovalStatus) -> Session {
    Session::new("abc", "1", Role::Member, status)
}

pub fn admin() -> Session {
    Session::new("root-token", "9", Role::Admin, ApprovalStatus::Approved)
}
