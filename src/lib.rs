//! # blogdesk
//!
//! Client-side session and authorization core for the blog platform.
//!
//! The crate owns the pieces a browser client would otherwise scatter across
//! global state: the persisted bearer token, the authentication state
//! container, the request pipeline that attaches the token and reacts to
//! `401` responses, and the access guard that decides what a route may render.
//!
//! DATA FLOW
//! =========
//! `guard` reads `session` state to gate rendering, `api` calls go through
//! `pipeline`, the pipeline reports authentication failures back to
//! `session`, and `session` mirrors the token into `credentials`.

pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod nav;
pub mod pipeline;
pub mod routes;
pub mod session;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::{ClientConfig, Endpoints};
pub use credentials::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use error::{ApiError, AuthError, ErrorKind};
pub use guard::{Access, AccessGuard, Decision, DenyTarget};
pub use pipeline::RequestPipeline;
pub use session::{Session, SessionManager, SessionPhase};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use types::{Identity, Page, Role};
