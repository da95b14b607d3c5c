//! Client route table.
//!
//! Paths mirror the web client's router. Each route declares the access it
//! needs; [`crate::guard::AccessGuard`] turns that into a decision.

use std::fmt;

use crate::guard::Access;
use crate::types::Role;

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const HOME_PATH: &str = "/";
pub const FORBIDDEN_PATH: &str = "/403";
pub const ADMIN_USERS_PATH: &str = "/admin/users";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Register,
    /// `/admin`, an alias for [`Route::AdminUsers`].
    AdminIndex,
    AdminUsers,
    AdminUserNew,
    AdminUserEdit(i64),
    Posts,
    NewPost,
    EditPost(i64),
    Forbidden,
    NotFound,
}

impl Route {
    /// Resolve a location (query string and fragment ignored).
    #[must_use]
    pub fn parse(location: &str) -> Self {
        let path = location.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Self::Posts,
            ["login"] => Self::Login,
            ["register"] => Self::Register,
            ["403"] => Self::Forbidden,
            ["new"] => Self::NewPost,
            ["edit", id] => id.parse().map_or(Self::NotFound, Self::EditPost),
            ["admin"] => Self::AdminIndex,
            ["admin", "users"] => Self::AdminUsers,
            ["admin", "users", "new"] => Self::AdminUserNew,
            ["admin", "users", id, "edit"] => id.parse().map_or(Self::NotFound, Self::AdminUserEdit),
            _ => Self::NotFound,
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => LOGIN_PATH.to_owned(),
            Self::Register => REGISTER_PATH.to_owned(),
            Self::AdminIndex => "/admin".to_owned(),
            Self::AdminUsers => ADMIN_USERS_PATH.to_owned(),
            Self::AdminUserNew => format!("{ADMIN_USERS_PATH}/new"),
            Self::AdminUserEdit(id) => format!("{ADMIN_USERS_PATH}/{id}/edit"),
            Self::Posts => HOME_PATH.to_owned(),
            Self::NewPost => "/new".to_owned(),
            Self::EditPost(id) => format!("/edit/{id}"),
            Self::Forbidden => FORBIDDEN_PATH.to_owned(),
            Self::NotFound => "/404".to_owned(),
        }
    }

    #[must_use]
    pub fn access(&self) -> Access {
        match self {
            Self::Login | Self::Register | Self::Forbidden | Self::NotFound => Access::Public,
            Self::Posts | Self::NewPost | Self::EditPost(_) => Access::Authenticated,
            Self::AdminIndex | Self::AdminUsers | Self::AdminUserNew | Self::AdminUserEdit(_) => Access::Role(Role::Admin),
        }
    }

    /// Follow route aliases to the route that actually renders.
    #[must_use]
    pub fn canonical(self) -> Self {
        match self {
            Self::AdminIndex => Self::AdminUsers,
            other => other,
        }
    }

    /// Routes on which the navigation bar is hidden.
    #[must_use]
    pub fn is_auth_screen(&self) -> bool {
        matches!(self, Self::Login | Self::Register)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;
