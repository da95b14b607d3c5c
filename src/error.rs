//! Error types for every layer of the client core.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here is fatal: each variant is recoverable by retrying or by
//! authenticating again. [`ErrorKind`] collapses the variants into the
//! categories callers branch on (redirect to login, show a message, retry).

use crate::types::ErrorBody;

/// Coarse error category shared by [`ApiError`] and [`AuthError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Login rejected by the backend.
    InvalidCredentials,
    /// An authenticated call came back `401`; the session has been dropped.
    SessionExpired,
    /// A stored or freshly issued token could not be resolved to an identity.
    ValidationFailure,
    /// The backend could not be reached or the connection broke.
    NetworkFailure,
    /// The session is valid but the role does not allow the operation.
    AuthorizationDenied,
    /// Anything else: bad input, unexpected status, undecodable body.
    Other,
}

// =============================================================================
// API ERROR
// =============================================================================

/// Errors produced by requests sent through the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network request failed: {0}")]
    Network(String),

    /// The backend answered `401`. The session was invalidated.
    #[error("session expired")]
    SessionExpired,

    /// The backend answered with a non-success status other than `401`.
    #[error("request failed with status {status}")]
    Status { status: u16, message: Option<String> },

    /// The response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// Input was rejected before any request was sent.
    #[error("{0}")]
    Validation(String),
}

impl ApiError {
    /// Build a status error, pulling `error` or `message` out of a JSON body.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body).ok().and_then(ErrorBody::into_message);
        Self::Status { status, message }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::NetworkFailure,
            Self::SessionExpired => ErrorKind::SessionExpired,
            Self::Status { status: 403, .. } => ErrorKind::AuthorizationDenied,
            Self::Status { .. } | Self::Decode(_) | Self::Validation(_) => ErrorKind::Other,
        }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::SessionExpired => "E_SESSION_EXPIRED",
            Self::Status { status: 403, .. } => "E_FORBIDDEN",
            Self::Status { status: 404, .. } => "E_NOT_FOUND",
            Self::Status { .. } => "E_STATUS",
            Self::Decode(_) => "E_DECODE",
            Self::Validation(_) => "E_VALIDATION",
        }
    }

    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status { status: 429 | 500..=599, .. })
    }

    /// Message suitable for showing to the person at the keyboard.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message: Some(message), .. } | Self::Validation(message) => message.clone(),
            Self::SessionExpired => "Your session has expired. Please sign in again.".to_owned(),
            Self::Network(_) => "Could not reach the server. Please try again.".to_owned(),
            Self::Status { status: 403, .. } => "You are not allowed to do that.".to_owned(),
            Self::Status { .. } | Self::Decode(_) => "Something went wrong. Please try again.".to_owned(),
        }
    }
}

// =============================================================================
// AUTH ERROR
// =============================================================================

/// Errors produced by session manager operations.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The backend rejected the username/password pair.
    #[error("invalid credentials")]
    InvalidCredentials { message: Option<String> },

    /// A token was issued but `/auth/me` could not resolve it.
    #[error("identity fetch failed")]
    IdentityFetchFailed { message: Option<String> },

    /// The backend could not be reached.
    #[error("network request failed: {0}")]
    Network(String),

    /// The login endpoint failed for a reason other than bad credentials.
    #[error("login failed with status {status}")]
    Status { status: u16, message: Option<String> },

    /// A newer login or a logout happened while this one was in flight.
    #[error("login superseded by a newer session change")]
    Superseded,

    /// Registration input was rejected locally or by the backend.
    #[error("registration failed: {message}")]
    Registration { message: String },
}

impl AuthError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCredentials { .. } => ErrorKind::InvalidCredentials,
            Self::IdentityFetchFailed { .. } => ErrorKind::ValidationFailure,
            Self::Network(_) => ErrorKind::NetworkFailure,
            Self::Status { .. } | Self::Superseded | Self::Registration { .. } => ErrorKind::Other,
        }
    }

    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials { .. } => "E_INVALID_CREDENTIALS",
            Self::IdentityFetchFailed { .. } => "E_IDENTITY_FETCH",
            Self::Network(_) => "E_NETWORK",
            Self::Status { .. } => "E_AUTH_STATUS",
            Self::Superseded => "E_SUPERSEDED",
            Self::Registration { .. } => "E_REGISTRATION",
        }
    }

    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials { message: Some(message) }
            | Self::IdentityFetchFailed { message: Some(message) }
            | Self::Status { message: Some(message), .. }
            | Self::Registration { message } => message.clone(),
            Self::Status { message: None, .. } => "Sign-in is unavailable right now. Please try again.".to_owned(),
            Self::InvalidCredentials { message: None } => "Login failed.".to_owned(),
            Self::IdentityFetchFailed { message: None } => "Could not load your account. Please sign in again.".to_owned(),
            Self::Network(_) => "Could not reach the server. Please try again.".to_owned(),
            Self::Superseded => "Another sign-in replaced this one.".to_owned(),
        }
    }
}

// =============================================================================
// STORE / CONFIG ERRORS
// =============================================================================

/// Errors produced by a credential store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("credential store io failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("credential record is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
