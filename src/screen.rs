//! Screen activation.
//!
//! A screen may only issue backend calls through the [`ActiveScreen`] it gets
//! from [`Screen::activate`], and that handle exists only once the guards
//! have passed. Leaving a screen aborts its pending effects so a late
//! response never lands on a screen that is gone.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{AbortHandle, Abortable};
use tokio::task::JoinHandle;

use crate::guard::{ApprovalGate, AuthGuard, Redirect};
use crate::routes::Destination;
use crate::session::{CurrentUser, SessionContext};

pub struct Screen;

impl Screen {
    /// Run the guards for `destination`.
    ///
    /// Public screens always activate. Admin-only screens need an admin
    /// session (members are sent home). Every other screen needs a session
    /// that passes the approval gate.
    pub fn activate(
        ctx: &Arc<SessionContext>,
        destination: Destination,
    ) -> Result<ActiveScreen, Redirect> {
        if destination.is_public() {
            let current_user = ctx.current_user().ok().flatten();
            return Ok(ActiveScreen::new(destination, current_user));
        }

        let session = AuthGuard::check(ctx)?;

        if destination.is_admin_only() {
            if !session.is_admin() {
                tracing::debug!(
                    "Member {} is not an admin, redirecting {} -> /",
                    session.member_id,
                    destination
                );
                ctx.navigator().navigate(Destination::Home);
                return Err(Redirect(Destination::Home));
            }
        } else {
            ApprovalGate::enforce(ctx, &session, &destination)?;
        }

        Ok(ActiveScreen::new(destination, Some(session.current_user())))
    }
}

/// A screen that passed its guards and is currently shown.
pub struct ActiveScreen {
    destination: Destination,
    current_user: Option<CurrentUser>,
    effects: Mutex<Vec<AbortHandle>>,
    left: AtomicBool,
}

impl ActiveScreen {
    fn new(destination: Destination, current_user: Option<CurrentUser>) -> Self {
        Self {
            destination,
            current_user,
            effects: Mutex::new(Vec::new()),
            left: AtomicBool::new(false),
        }
    }

    pub fn destination(&self) -> &Destination {
        &self.destination
    }

    pub fn current_user(&self) -> Option<&CurrentUser> {
        self.current_user.as_ref()
    }

    pub fn is_active(&self) -> bool {
        !self.left.load(Ordering::SeqCst)
    }

    fn register(&self) -> Option<futures::future::AbortRegistration> {
        let (handle, registration) = AbortHandle::new_pair();
        let mut effects = self.effects.lock().ok()?;
        // checked under the lock so leave() cannot slip in between
        if !self.is_active() {
            return None;
        }
        effects.push(handle);
        Some(registration)
    }

    /// Await an effect on behalf of this screen. `None` when the screen was
    /// left before the effect finished.
    pub async fn run<F: Future>(&self, effect: F) -> Option<F::Output> {
        let registration = self.register()?;
        Abortable::new(effect, registration).await.ok()
    }

    /// Spawn an effect that outlives the current call stack but not the screen.
    pub fn spawn<F>(&self, effect: F) -> JoinHandle<Option<F::Output>>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let registration = self.register();
        tokio::spawn(async move {
            match registration {
                Some(registration) => Abortable::new(effect, registration).await.ok(),
                None => None,
            }
        })
    }

    /// Navigate away: every pending effect is aborted and later ones never start.
    pub fn leave(&self) {
        let Ok(mut effects) = self.effects.lock() else {
            return;
        };
        if self.left.swap(true, Ordering::SeqCst) {
            return;
        }
        let pending = effects.len();
        for handle in effects.drain(..) {
            handle.abort();
        }
        if pending > 0 {
            tracing::debug!("Left {} with {} pending effect(s)", self.destination, pending);
        }
    }
}

impl Drop for ActiveScreen {
    fn drop(&mut self) {
        self.leave();
    }
}
