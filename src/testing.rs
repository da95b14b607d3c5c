//! Scripted transport and fixtures shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

use crate::config::Endpoints;
use crate::credentials::MemoryCredentialStore;
use crate::session::SessionManager;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};

pub(crate) enum Step {
    Reply(Result<HttpResponse, TransportError>),
    /// Hold the reply until the sender fires (or is dropped).
    Gated(oneshot::Receiver<()>, Result<HttpResponse, TransportError>),
}

/// Replays queued replies in order and records every request it sees.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(replies: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self { steps: Mutex::new(replies.into_iter().map(Step::Reply).collect()), ..Self::default() })
    }

    pub(crate) fn push(&self, step: Step) {
        self.steps.lock().unwrap().push_back(step);
    }

    /// Queue a reply that is held back until the returned sender fires.
    pub(crate) fn push_gated(&self, reply: Result<HttpResponse, TransportError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(Step::Gated(rx, reply));
        tx
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(reply)) => reply,
            Some(Step::Gated(gate, reply)) => {
                let _ = gate.await;
                reply
            }
            None => Ok(HttpResponse { status: 500, body: r#"{"error":"unscripted request"}"#.to_owned() }),
        }
    }
}

pub(crate) fn json(status: u16, body: serde_json::Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse { status, body: body.to_string() })
}

pub(crate) fn empty(status: u16) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse { status, body: String::new() })
}

pub(crate) fn network_down() -> Result<HttpResponse, TransportError> {
    Err(TransportError("connection refused".to_owned()))
}

pub(crate) fn token_reply(token: &str) -> Result<HttpResponse, TransportError> {
    json(200, serde_json::json!({ "token": token }))
}

pub(crate) fn me_reply(id: i64, username: &str, role: &str) -> Result<HttpResponse, TransportError> {
    json(200, serde_json::json!({ "id": id, "username": username, "role": role }))
}

pub(crate) fn manager(
    store: &Arc<MemoryCredentialStore>,
    transport: &Arc<ScriptedTransport>,
) -> SessionManager {
    SessionManager::new(
        Arc::clone(store) as Arc<dyn crate::credentials::CredentialStore>,
        Arc::clone(transport) as Arc<dyn HttpTransport>,
        Endpoints::default(),
    )
}
