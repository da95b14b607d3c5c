//! Request pipeline: bearer attachment and `401` handling for every call.
//!
//! CONTRACT
//! ========
//! 1. If the session holds a token, it is attached as `Authorization: Bearer`.
//! 2. A `401` response invalidates the session (when the token that was sent
//!    is still current) and surfaces as [`ApiError::SessionExpired`]. The
//!    request is not retried.
//!
//! The pipeline applies this uniformly; it never inspects which endpoint it
//! is calling. Route and role decisions live in [`crate::guard`].

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::Endpoints;
use crate::error::ApiError;
use crate::session::SessionManager;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

#[derive(Clone)]
pub struct RequestPipeline {
    transport: Arc<dyn HttpTransport>,
    session: SessionManager,
}

impl RequestPipeline {
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, session: SessionManager) -> Self {
        Self { transport, session }
    }

    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        self.session.endpoints()
    }

    /// Send a request through the pipeline.
    ///
    /// Any explicit bearer on `request` is replaced by the session's token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] when no response arrived and
    /// [`ApiError::SessionExpired`] on `401`. Other statuses are returned
    /// as responses.
    pub async fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        request.bearer = self.session.token();
        let sent_token = request.bearer.clone();

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if response.is_unauthorized() {
            match sent_token.as_deref() {
                Some(token) => {
                    self.session.invalidate(token);
                }
                None => tracing::debug!("401 on anonymous request"),
            }
            return Err(ApiError::SessionExpired);
        }
        Ok(response)
    }

    /// Send and require a 2xx status.
    ///
    /// # Errors
    ///
    /// As [`RequestPipeline::send`], plus [`ApiError::Status`] for non-2xx.
    pub async fn send_ok(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let response = self.send(request).await?;
        if !response.is_success() {
            return Err(ApiError::from_status(response.status, &response.body));
        }
        Ok(response)
    }

    /// # Errors
    ///
    /// As [`RequestPipeline::send_ok`], plus [`ApiError::Decode`].
    pub async fn get_json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let response = self.send_ok(request).await?;
        decode(&response)
    }

    /// # Errors
    ///
    /// As [`RequestPipeline::send_ok`], plus [`ApiError::Decode`].
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: String, body: &B) -> Result<T, ApiError> {
        let response = self.send_ok(HttpRequest::post(path).json(encode(body)?)).await?;
        decode(&response)
    }

    /// # Errors
    ///
    /// As [`RequestPipeline::send_ok`], plus [`ApiError::Decode`].
    pub async fn put_json<B: Serialize, T: DeserializeOwned>(&self, path: String, body: &B) -> Result<T, ApiError> {
        let response = self.send_ok(HttpRequest::put(path).json(encode(body)?)).await?;
        decode(&response)
    }

    /// # Errors
    ///
    /// As [`RequestPipeline::send_ok`].
    pub async fn delete(&self, path: String) -> Result<(), ApiError> {
        self.send_ok(HttpRequest::delete(path)).await?;
        Ok(())
    }
}

fn encode<B: Serialize>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Empty bodies decode as JSON `null`, so `()` and `Option<T>` targets work
/// for endpoints that answer `204`.
fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    let body = if response.body.trim().is_empty() { "null" } else { response.body.as_str() };
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
