use std::{fmt, sync::Arc};

use chrono::NaiveDate;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::{
    backend::AnalysisBackend,
    error::{RecapError, Result},
    format::{SummaryDocument, render_summary_document},
    types::{AnalysisRequest, SummaryResult},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Pending,
    Succeeded(Arc<SummaryResult>),
    Failed(String),
}

impl RequestState {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestState::Pending)
    }

    pub fn result(&self) -> Option<&SummaryResult> {
        match self {
            RequestState::Succeeded(result) => Some(result.as_ref()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RequestState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// What the view sees: the current state plus the submission it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSnapshot {
    /// Sequence number of the latest submission; 0 before the first one.
    pub seq: u64,
    pub url: Option<String>,
    pub state: RequestState,
}

impl Default for RequestSnapshot {
    fn default() -> Self {
        Self {
            seq: 0,
            url: None,
            state: RequestState::Idle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Checking,
    Connected { status: String, version: String },
    Disconnected,
}

impl BackendStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, BackendStatus::Connected { .. })
    }
}

impl fmt::Display for BackendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendStatus::Checking => f.write_str("Checking..."),
            BackendStatus::Connected { status, version } => {
                write!(f, "Connected: {} (v{})", status, version)
            }
            BackendStatus::Disconnected => f.write_str("Backend Disconnected"),
        }
    }
}

/// Owns the lifecycle of analysis requests against one backend.
///
/// Cloning yields another handle to the same state. Each submission gets a
/// sequence number; an outcome is applied only while its submission is still
/// the latest, so a late response from a superseded request is dropped.
pub struct RequestController<B> {
    inner: Arc<ControllerInner<B>>,
}

struct ControllerInner<B> {
    backend: B,
    language: Option<String>,
    state: watch::Sender<RequestSnapshot>,
    health: watch::Sender<BackendStatus>,
}

impl<B> Clone for RequestController<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Result of resolving one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub seq: u64,
    pub state: RequestState,
    /// False when a newer submission had already taken over.
    pub applied: bool,
}

impl<B: AnalysisBackend> RequestController<B> {
    pub fn new(backend: B) -> Self {
        Self::with_language(backend, None)
    }

    pub fn with_language(backend: B, language: Option<String>) -> Self {
        let (state, _) = watch::channel(RequestSnapshot::default());
        let (health, _) = watch::channel(BackendStatus::Checking);
        Self {
            inner: Arc::new(ControllerInner {
                backend,
                language,
                state,
                health,
            }),
        }
    }

    pub fn backend(&self) -> &B {
        &self.inner.backend
    }

    pub fn snapshot(&self) -> RequestSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn state(&self) -> RequestState {
        self.inner.state.borrow().state.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RequestSnapshot> {
        self.inner.state.subscribe()
    }

    /// Whether the submit trigger should be enabled for `url`.
    pub fn can_submit(&self, url: &str) -> bool {
        !url.is_empty() && !self.inner.state.borrow().state.is_pending()
    }

    /// Moves to `Pending`, dropping any previous result or error in the same
    /// step. An empty URL is rejected and leaves the state as it was.
    pub fn begin(&self, url: &str) -> Result<PendingRequest<B>> {
        if url.is_empty() {
            return Err(RecapError::EmptyUrl);
        }

        let mut seq = 0;
        self.inner.state.send_modify(|snap| {
            snap.seq += 1;
            snap.url = Some(url.to_string());
            snap.state = RequestState::Pending;
            seq = snap.seq;
        });
        debug!(seq, url, "analysis request pending");

        Ok(PendingRequest {
            controller: self.clone(),
            seq,
            request: AnalysisRequest::new(url).with_language(self.inner.language.clone()),
        })
    }

    /// Begins a submission and waits for its outcome.
    pub async fn submit(&self, url: &str) -> Result<Resolution> {
        Ok(self.begin(url)?.resolve().await)
    }

    /// Serializes the current successful result, linking back to the URL that
    /// produced it.
    pub fn export(&self, date: NaiveDate) -> Result<SummaryDocument> {
        let snap = self.snapshot();
        match (&snap.state, &snap.url) {
            (RequestState::Succeeded(result), Some(url)) => {
                render_summary_document(result, url, date)
            }
            _ => Err(RecapError::NoResult),
        }
    }

    pub fn backend_status(&self) -> BackendStatus {
        self.inner.health.borrow().clone()
    }

    pub fn subscribe_backend_status(&self) -> watch::Receiver<BackendStatus> {
        self.inner.health.subscribe()
    }

    /// Checks backend health once and records a display status. Touches nothing
    /// but the status.
    pub async fn check_backend_health(&self) -> BackendStatus {
        let status = match self.inner.backend.health().await {
            Ok(report) => {
                info!(status = %report.status, version = %report.version, "backend reachable");
                BackendStatus::Connected {
                    status: report.status,
                    version: report.version,
                }
            }
            Err(e) => {
                warn!(error = %e, "backend health check failed");
                BackendStatus::Disconnected
            }
        };
        self.inner.health.send_replace(status.clone());
        status
    }

    fn apply(&self, seq: u64, outcome: &RequestState) -> bool {
        self.inner.state.send_if_modified(|snap| {
            if snap.seq != seq {
                return false;
            }
            snap.state = outcome.clone();
            true
        })
    }
}

/// A submission that has entered `Pending` and not yet resolved.
pub struct PendingRequest<B> {
    controller: RequestController<B>,
    seq: u64,
    request: AnalysisRequest,
}

impl<B: AnalysisBackend> PendingRequest<B> {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> &AnalysisRequest {
        &self.request
    }

    /// Issues the request and applies its outcome unless superseded.
    pub async fn resolve(self) -> Resolution {
        let response = self.controller.inner.backend.process(&self.request).await;

        let state = match response.and_then(|r| r.into_result()) {
            Ok(result) => RequestState::Succeeded(Arc::new(result)),
            Err(e) => {
                warn!(seq = self.seq, url = %self.request.url, error = %e, "analysis failed");
                RequestState::Failed(e.user_message())
            }
        };

        let applied = self.controller.apply(self.seq, &state);
        if applied {
            info!(seq = self.seq, succeeded = state.result().is_some(), "analysis outcome applied");
        } else {
            debug!(seq = self.seq, "discarding outcome of superseded request");
        }

        Resolution {
            seq: self.seq,
            state,
            applied,
        }
    }
}
