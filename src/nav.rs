//! Navigation bar model derived from the session.

use crate::routes::{ADMIN_USERS_PATH, HOME_PATH, Route};
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub path: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavMenu {
    /// Admins get the admin area, everyone else the post list.
    pub primary: NavLink,
    /// e.g. `alice (ADMIN)`; empty until the identity resolves.
    pub greeting: String,
    pub show_logout: bool,
}

impl NavMenu {
    /// Menu for `location`, or `None` when the bar is hidden: on the login
    /// and register screens, and whenever there is no token.
    #[must_use]
    pub fn for_session(session: &Session, location: &str) -> Option<Self> {
        if Route::parse(location).is_auth_screen() || session.token.is_none() {
            return None;
        }

        let primary = match &session.identity {
            Some(identity) if identity.is_admin() => NavLink { label: "Admin", path: ADMIN_USERS_PATH },
            _ => NavLink { label: "Home", path: HOME_PATH },
        };
        let greeting = session
            .identity
            .as_ref()
            .map(|identity| format!("{} ({})", identity.username, identity.role.label()))
            .unwrap_or_default();

        Some(Self { primary, greeting, show_logout: true })
    }
}

#[cfg(test)]
#[path = "nav_test.rs"]
mod tests;
