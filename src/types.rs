//! Wire DTOs for the blog backend's REST API.
//!
//! DESIGN
//! ======
//! Field names follow the backend's JSON (camelCase pagination fields,
//! `ROLE_*` role strings). Roles are a closed enum so authorization never
//! falls back to substring matching on raw strings.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// ROLE
// =============================================================================

/// Authorization role attached to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Wire spelling, e.g. `"ROLE_ADMIN"`.
    #[must_use]
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::User => "ROLE_USER",
            Self::Admin => "ROLE_ADMIN",
        }
    }

    /// Display label without the `ROLE_` prefix.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }

    /// Whether an identity holding `self` may access something requiring `required`.
    #[must_use]
    pub fn satisfies(self, required: Role) -> bool {
        match required {
            Self::User => true,
            Self::Admin => self == Self::Admin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let upper = raw.trim().to_ascii_uppercase();
        match upper.strip_prefix("ROLE_").unwrap_or(upper.as_str()) {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(UnknownRole(raw.to_owned())),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_wire())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

// =============================================================================
// IDENTITY
// =============================================================================

/// The authenticated user as resolved by `GET /auth/me`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

impl Identity {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// =============================================================================
// AUTH PAYLOADS
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Error payload the backend attaches to failed requests.
///
/// Auth endpoints use `error`, admin endpoints use `message`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        self.error.or(self.message).filter(|m| !m.trim().is_empty())
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub number: u32,
    pub size: u32,
}

impl<T> Page<T> {
    /// Wrap an unpaginated list as a single page.
    #[must_use]
    pub fn single(content: Vec<T>) -> Self {
        let len = content.len();
        Self {
            total_elements: len as u64,
            total_pages: u32::from(len > 0),
            number: 0,
            size: u32::try_from(len).unwrap_or(u32::MAX),
            content,
        }
    }

    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.number.saturating_add(1) < self.total_pages
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            number: self.number,
            size: self.size,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePage<T> {
    content: Vec<T>,
    #[serde(default)]
    total_elements: Option<u64>,
    #[serde(default)]
    total_pages: Option<u32>,
    #[serde(default)]
    number: u32,
    #[serde(default)]
    size: Option<u32>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageOrList<T> {
    Page(WirePage<T>),
    List(Vec<T>),
}

/// Some backends return a bare array where others return a page object.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match PageOrList::<T>::deserialize(deserializer)? {
            PageOrList::List(content) => Ok(Self::single(content)),
            PageOrList::Page(wire) => {
                let len = wire.content.len();
                Ok(Self {
                    total_elements: wire.total_elements.unwrap_or(len as u64),
                    total_pages: wire.total_pages.unwrap_or(u32::from(len > 0)),
                    number: wire.number,
                    size: wire.size.unwrap_or_else(|| u32::try_from(len).unwrap_or(u32::MAX)),
                    content: wire.content,
                })
            }
        }
    }
}

// =============================================================================
// POSTS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Body for creating or updating a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
}

// =============================================================================
// ADMIN USERS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Admin edit of a user. `password` is omitted from the body when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserUpdate {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
