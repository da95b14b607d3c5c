//! Session manager: the single owner of authentication state.
//!
//! ARCHITECTURE
//! ============
//! `SessionManager` is an explicitly constructed, clonable handle. The guard
//! reads snapshots of it, the request pipeline reports `401`s back into it,
//! and it is the only writer of the persisted credential record.
//!
//! ```text
//! Unauthenticated --login / startup with stored token--> Validating
//! Validating      --identity resolved-------------------> Authenticated
//! Validating      --any failure-------------------------> Unauthenticated
//! Authenticated   --logout / 401------------------------> Unauthenticated
//! ```
//!
//! CONCURRENCY
//! ===========
//! State sits behind a `std::sync::Mutex` that is never held across an
//! `.await`. Every login, logout and invalidation bumps a generation counter;
//! an in-flight login or refresh only applies its result if the generation
//! it started under is still current, so a response arriving after a logout
//! cannot resurrect the session.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::config::Endpoints;
use crate::credentials::CredentialStore;
use crate::error::AuthError;
use crate::pipeline::RequestPipeline;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::types::{ErrorBody, Identity, Role, TokenResponse};

// =============================================================================
// SESSION SNAPSHOT
// =============================================================================

/// Point-in-time copy of the authentication state.
///
/// `identity` is only ever set while `token` is set and after the backend
/// resolved that token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub identity: Option<Identity>,
    /// `true` while a login or startup validation is outstanding.
    pub loading: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    Validating,
    Authenticated,
}

impl Session {
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.loading {
            SessionPhase::Validating
        } else if self.token.is_some() && self.identity.is_some() {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Unauthenticated
        }
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.identity.as_ref().map(|identity| identity.role)
    }

    fn clear(&mut self) {
        self.token = None;
        self.identity = None;
        self.loading = false;
    }
}

struct SessionCell {
    session: Session,
    generation: u64,
    /// Generation of the login that currently owns `loading`, if any.
    pending_login: Option<u64>,
}

impl SessionCell {
    /// Drop everything and supersede any in-flight operation.
    fn reset(&mut self) {
        self.generation += 1;
        self.pending_login = None;
        self.session.clear();
    }

    fn finish_login(&mut self, generation: u64) {
        if self.pending_login == Some(generation) {
            self.pending_login = None;
        }
    }
}

struct SessionShared {
    cell: Mutex<SessionCell>,
    store: Arc<dyn CredentialStore>,
    transport: Arc<dyn HttpTransport>,
    endpoints: Endpoints,
    changes: watch::Sender<Session>,
    initialized: AtomicBool,
}

// =============================================================================
// SESSION MANAGER
// =============================================================================

/// Owner of the current [`Session`]. Clones share the same state.
#[derive(Clone)]
pub struct SessionManager {
    shared: Arc<SessionShared>,
}

impl SessionManager {
    /// Create a manager, seeding the token from `store`.
    ///
    /// When a token is found the session starts in `Validating`; call
    /// [`SessionManager::initialize`] to resolve it. An unreadable record is
    /// discarded.
    pub fn new(store: Arc<dyn CredentialStore>, transport: Arc<dyn HttpTransport>, endpoints: Endpoints) -> Self {
        let token = match store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable credential record");
                if let Err(e) = store.clear() {
                    tracing::warn!(error = %e, "failed to remove credential record");
                }
                None
            }
        };
        let session = Session { loading: token.is_some(), token, identity: None };
        let (changes, _) = watch::channel(session.clone());

        Self {
            shared: Arc::new(SessionShared {
                cell: Mutex::new(SessionCell { session, generation: 0, pending_login: None }),
                store,
                transport,
                endpoints,
                changes,
                initialized: AtomicBool::new(false),
            }),
        }
    }

    /// Create a manager and validate any stored token before returning.
    pub async fn open(store: Arc<dyn CredentialStore>, transport: Arc<dyn HttpTransport>, endpoints: Endpoints) -> Self {
        let manager = Self::new(store, transport, endpoints);
        manager.initialize().await;
        manager
    }

    /// Validate the stored token. Runs [`SessionManager::refresh_identity`]
    /// at most once per manager; later calls return the current identity.
    pub async fn initialize(&self) -> Option<Identity> {
        if self.shared.initialized.swap(true, Ordering::SeqCst) {
            return self.snapshot().identity;
        }
        self.refresh_identity().await
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.lock().session.clone()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.lock().session.token.clone()
    }

    /// Receiver that observes every state change, for re-running guards.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.shared.changes.subscribe()
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.shared.endpoints
    }

    /// Request pipeline bound to this session and its transport.
    #[must_use]
    pub fn pipeline(&self) -> RequestPipeline {
        RequestPipeline::new(Arc::clone(&self.shared.transport), self.clone())
    }

    // =========================================================================
    // OPERATIONS
    // =========================================================================

    /// Exchange credentials for a token, then resolve the identity with that
    /// exact token. Any previous identity is dropped as soon as the attempt
    /// starts, so it is never paired with the new token.
    ///
    /// # Errors
    ///
    /// On any failure the token and identity are cleared. Returns
    /// [`AuthError::Superseded`] when a newer login or a logout happened
    /// while this one was in flight; the newer state is left untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let generation = self.update(|cell| {
            cell.generation += 1;
            cell.pending_login = Some(cell.generation);
            cell.session.identity = None;
            cell.session.loading = true;
            cell.generation
        });
        tracing::info!(%username, "login started");

        let token = match self.request_token(username, password).await {
            Ok(token) => token,
            Err(e) => {
                self.fail_login(generation, &e);
                return Err(e);
            }
        };

        let store = Arc::clone(&self.shared.store);
        let accepted = self.update(|cell| {
            if cell.generation != generation {
                return false;
            }
            if let Err(e) = store.save(&token) {
                tracing::warn!(error = %e, "failed to persist token");
            }
            cell.session.token = Some(token.clone());
            true
        });
        if !accepted {
            return Err(AuthError::Superseded);
        }

        let identity = match self.fetch_identity(&token).await {
            Ok(identity) => identity,
            Err(e) => {
                self.fail_login(generation, &e);
                return Err(e);
            }
        };

        let accepted = self.update(|cell| {
            if cell.generation != generation {
                return false;
            }
            cell.finish_login(generation);
            cell.session.identity = Some(identity.clone());
            cell.session.loading = false;
            true
        });
        if !accepted {
            return Err(AuthError::Superseded);
        }

        tracing::info!(user_id = identity.id, role = %identity.role, "login succeeded");
        Ok(identity)
    }

    /// Drop the session and the persisted record. No backend call.
    pub fn logout(&self) {
        let store = Arc::clone(&self.shared.store);
        let was_active = self.update(|cell| {
            let was_active = cell.session.token.is_some();
            cell.reset();
            if let Err(e) = store.clear() {
                tracing::warn!(error = %e, "failed to remove credential record");
            }
            was_active
        });
        if was_active {
            tracing::info!("logged out");
        }
    }

    /// Re-resolve the identity for the current token.
    ///
    /// Returns `None` without a request when there is no token or while a
    /// login is in flight, which owns the session until it settles. Any
    /// failure clears the credentials. The loading flag is raised only while the
    /// session is not yet authenticated, so an authenticated session never
    /// falls back into `Validating`.
    pub async fn refresh_identity(&self) -> Option<Identity> {
        let started = self.update(|cell| {
            if cell.pending_login.is_some() {
                tracing::debug!("login in flight; skipping identity refresh");
                return None;
            }
            match cell.session.token.clone() {
                None => {
                    cell.session.loading = false;
                    None
                }
                Some(token) => {
                    if cell.session.identity.is_none() {
                        cell.session.loading = true;
                    }
                    Some((cell.generation, token))
                }
            }
        });
        let (generation, token) = started?;

        let result = self.fetch_identity(&token).await;

        let store = Arc::clone(&self.shared.store);
        self.update(|cell| {
            if cell.generation != generation {
                tracing::debug!("discarding superseded identity refresh");
                return None;
            }
            match result {
                Ok(identity) => {
                    cell.session.identity = Some(identity.clone());
                    cell.session.loading = false;
                    Some(identity)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stored token failed validation; clearing session");
                    cell.session.clear();
                    if let Err(e) = store.clear() {
                        tracing::warn!(error = %e, "failed to remove credential record");
                    }
                    None
                }
            }
        })
    }

    /// React to a `401` for a request that carried `sent_token`.
    ///
    /// Clears the session only if `sent_token` is still the current token, so
    /// repeated or stale `401`s are no-ops. Returns whether anything changed.
    pub fn invalidate(&self, sent_token: &str) -> bool {
        let store = Arc::clone(&self.shared.store);
        let cleared = self.update(|cell| {
            if cell.session.token.as_deref() != Some(sent_token) {
                return false;
            }
            cell.reset();
            if let Err(e) = store.clear() {
                tracing::warn!(error = %e, "failed to remove credential record");
            }
            true
        });
        if cleared {
            tracing::warn!("session expired; logged out");
        }
        cleared
    }

    /// Create an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Registration`] when the input is rejected locally
    /// or by the backend, [`AuthError::Network`] when it cannot be reached.
    pub async fn register(&self, username: &str, password: &str, confirm: &str) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::Registration { message: "Username and password are required".to_owned() });
        }
        if password != confirm {
            return Err(AuthError::Registration { message: "Passwords do not match".to_owned() });
        }

        let body = serde_json::json!({ "username": username, "password": password });
        let request = HttpRequest::post(self.shared.endpoints.register()).json(body);
        let response = self
            .shared
            .transport
            .send(request)
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        if !response.is_success() {
            let message = error_message(&response).unwrap_or_else(|| "Registration failed".to_owned());
            return Err(AuthError::Registration { message });
        }
        tracing::info!(%username, "registered account");
        Ok(())
    }

    // =========================================================================
    // HELPERS
    // =========================================================================

    async fn request_token(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let body = serde_json::json!({ "username": username, "password": password });
        let request = HttpRequest::post(self.shared.endpoints.login()).json(body);
        let response = self
            .shared
            .transport
            .send(request)
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        match response.status {
            200..=299 => {}
            400 | 401 => return Err(AuthError::InvalidCredentials { message: error_message(&response) }),
            status => return Err(AuthError::Status { status, message: error_message(&response) }),
        }
        let parsed: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|e| AuthError::InvalidCredentials { message: Some(format!("malformed login response: {e}")) })?;
        if parsed.token.is_empty() {
            return Err(AuthError::InvalidCredentials { message: Some("login response carried no token".to_owned()) });
        }
        Ok(parsed.token)
    }

    /// `GET /auth/me` with an explicit bearer, bypassing the pipeline.
    async fn fetch_identity(&self, token: &str) -> Result<Identity, AuthError> {
        let request = HttpRequest::get(self.shared.endpoints.me()).bearer(token);
        let response = self
            .shared
            .transport
            .send(request)
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;
        if !response.is_success() {
            return Err(AuthError::IdentityFetchFailed { message: error_message(&response) });
        }
        serde_json::from_str(&response.body)
            .map_err(|e| AuthError::IdentityFetchFailed { message: Some(format!("malformed identity: {e}")) })
    }

    fn fail_login(&self, generation: u64, error: &AuthError) {
        let store = Arc::clone(&self.shared.store);
        let rolled_back = self.update(|cell| {
            if cell.generation != generation {
                return false;
            }
            cell.finish_login(generation);
            cell.session.clear();
            if let Err(e) = store.clear() {
                tracing::warn!(error = %e, "failed to remove credential record");
            }
            true
        });
        if rolled_back {
            tracing::info!(error = %error, code = error.error_code(), "login failed");
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionCell> {
        self.shared.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mutate state under the lock and publish the result to subscribers.
    fn update<R>(&self, f: impl FnOnce(&mut SessionCell) -> R) -> R {
        let mut cell = self.lock();
        let out = f(&mut cell);
        let session = &cell.session;
        self.shared.changes.send_if_modified(|current| {
            if current == session {
                return false;
            }
            current.clone_from(session);
            true
        });
        out
    }
}

fn error_message(response: &HttpResponse) -> Option<String> {
    serde_json::from_str::<ErrorBody>(&response.body).ok().and_then(ErrorBody::into_message)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
