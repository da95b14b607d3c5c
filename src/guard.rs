//! Access guard: what a route may render for the current session.
//!
//! SYSTEM CONTEXT
//! ==============
//! Evaluated on every navigation and again whenever the session changes, so
//! a `401` mid-page or a logout immediately turns into a login redirect.
//!
//! Policy, in order:
//! 1. Public routes always render.
//! 2. While the session is validating, show a neutral pending state. Never
//!    redirect during startup validation.
//! 3. No session: redirect to login, remembering where the user was going.
//! 4. Role required but not held: redirect to the deny target. Never to
//!    login, since the user is signed in.
//! 5. Otherwise render.

use tokio::sync::watch;

use crate::routes::{FORBIDDEN_PATH, HOME_PATH, LOGIN_PATH, Route};
use crate::session::{Session, SessionPhase};
use crate::types::Role;

/// What a route requires of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
    Role(Role),
}

/// Where signed-in users without the required role are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DenyTarget {
    #[default]
    Home,
    Forbidden,
}

impl DenyTarget {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Home => HOME_PATH,
            Self::Forbidden => FORBIDDEN_PATH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Session still validating; render a neutral placeholder.
    Pending,
    Render,
    RedirectToLogin { return_to: Option<String> },
    /// Signed in, but the role does not allow this route.
    Deny(DenyTarget),
}

impl Decision {
    /// Location to navigate to, for redirecting decisions.
    #[must_use]
    pub fn redirect_path(&self) -> Option<&str> {
        match self {
            Self::RedirectToLogin { .. } => Some(LOGIN_PATH),
            Self::Deny(target) => Some(target.path()),
            Self::Pending | Self::Render => None,
        }
    }

    #[must_use]
    pub fn is_redirect(&self) -> bool {
        self.redirect_path().is_some()
    }
}

/// A resolved navigation: the route that was matched and what to do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub route: Route,
    pub decision: Decision,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGuard {
    deny: DenyTarget,
}

impl AccessGuard {
    #[must_use]
    pub fn new(deny: DenyTarget) -> Self {
        Self { deny }
    }

    /// Decide what `location` may render under `access` for `session`.
    #[must_use]
    pub fn evaluate(&self, session: &Session, access: Access, location: &str) -> Decision {
        if access == Access::Public {
            return Decision::Render;
        }
        match session.phase() {
            SessionPhase::Validating => Decision::Pending,
            SessionPhase::Unauthenticated => Decision::RedirectToLogin { return_to: return_location(location) },
            SessionPhase::Authenticated => match access {
                Access::Role(required) if !session.role().is_some_and(|role| role.satisfies(required)) => {
                    Decision::Deny(self.deny)
                }
                _ => Decision::Render,
            },
        }
    }

    /// Resolve `location` against the route table and evaluate it.
    #[must_use]
    pub fn navigate(&self, session: &Session, location: &str) -> Navigation {
        let route = Route::parse(location).canonical();
        let decision = self.evaluate(session, route.access(), location);
        Navigation { route, decision }
    }

    /// Wait for the next session change and re-evaluate `location`.
    ///
    /// Returns `None` once the session manager has been dropped.
    pub async fn watch(&self, changes: &mut watch::Receiver<Session>, location: &str) -> Option<Navigation> {
        changes.changed().await.ok()?;
        let session = changes.borrow_and_update().clone();
        Some(self.navigate(&session, location))
    }
}

fn return_location(location: &str) -> Option<String> {
    let trimmed = location.trim();
    if trimmed.is_empty() || Route::parse(trimmed) == Route::Login {
        return None;
    }
    Some(trimmed.to_owned())
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
