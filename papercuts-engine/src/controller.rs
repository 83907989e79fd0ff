use std::sync::Arc;

use papercuts_core::pdf::{PdfFile, PdfSession, validate_upload};
use papercuts_core::settings::OptimizeSettings;
use papercuts_core::types::SessionId;
use papercuts_providers::ApiError;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::session::{WorkflowStatus, WorkflowStep};
use crate::traits::{PdfApi, WorkflowObserver};

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Local check failed; nothing was sent.
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Connectivity(String),

    /// Non-success response; the message is the server's.
    #[error("{0}")]
    Backend(String),

    #[error("no session yet; upload a PDF first")]
    NoSession,

    #[error("a request is already in progress")]
    Busy,
}

impl From<ApiError> for WorkflowError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Rejected(r) => Self::Validation(r.to_string()),
            e if e.is_network() => Self::Connectivity(e.to_string()),
            other => {
                let msg = other.to_string();
                if msg.trim().is_empty() {
                    Self::Backend(GENERIC_ERROR_MESSAGE.into())
                } else {
                    Self::Backend(msg)
                }
            }
        }
    }
}

#[derive(Default)]
struct Inner {
    step: WorkflowStep,
    session: Option<PdfSession>,
    settings: OptimizeSettings,
    is_loading: bool,
    error: Option<String>,
    connected: Option<bool>,

    // Bumped by reset so that requests started earlier cannot write back.
    generation: u64,
}

impl Inner {
    fn snapshot(&self) -> WorkflowStatus {
        WorkflowStatus {
            step: self.step,
            session: self.session.clone(),
            settings: self.settings,
            is_loading: self.is_loading,
            error: self.error.clone(),
            connected: self.connected,
        }
    }

    fn set_step(&mut self, step: WorkflowStep) {
        if self.step != step {
            log::info!("workflow step: {:?} -> {:?}", self.step, step);
        }
        self.step = step;
    }
}

/// Drives upload -> analyze -> optimize -> preview for a single PDF at a time.
///
/// Cloning shares state. Requests are serialized by the busy flag: while one is in
/// flight, any other request fails fast with [`WorkflowError::Busy`].
#[derive(Clone)]
pub struct WorkflowController {
    api: Arc<dyn PdfApi>,
    observer: Option<Arc<dyn WorkflowObserver>>,
    user_id: Option<String>,
    inner: Arc<Mutex<Inner>>,
}

impl WorkflowController {
    pub fn new(api: Arc<dyn PdfApi>) -> Self {
        Self {
            api,
            observer: None,
            user_id: None,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn WorkflowObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Attached to every upload.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into()).filter(|u| !u.trim().is_empty());
        self
    }

    pub fn api(&self) -> &Arc<dyn PdfApi> {
        &self.api
    }

    pub async fn status(&self) -> WorkflowStatus {
        self.inner.lock().await.snapshot()
    }

    async fn emit(&self) {
        if let Some(observer) = &self.observer {
            let status = self.status().await;
            observer.on_status(&status);
        }
    }

    /// Refreshes the connectivity indicator.
    pub async fn check_connection(&self) -> bool {
        let connected = self.api.check_health().await;
        {
            let mut inner = self.inner.lock().await;
            if inner.connected != Some(connected) {
                log::info!("backend connected: {connected}");
            }
            inner.connected = Some(connected);
        }
        self.emit().await;
        connected
    }

    pub async fn update_settings(&self, settings: OptimizeSettings) {
        self.inner.lock().await.settings = settings.clamped();
        self.emit().await;
    }

    /// Uploads and analyzes `file`. On success the step moves to Results; on any
    /// failure the previous session and step are kept and the error is recorded.
    pub async fn upload(&self, file: PdfFile) -> Result<PdfSession, WorkflowError> {
        if let Err(rejection) = validate_upload(&file) {
            let err = WorkflowError::Validation(rejection.to_string());
            log::warn!("upload rejected: {err}");
            self.record_error(&err).await;
            return Err(err);
        }

        let generation = self.begin().await?;
        log::info!("uploading {} ({} bytes)", file.file_name, file.size());

        let result = self.upload_and_analyze(&file).await;
        // The file handle is not kept beyond the call.
        drop(file);

        self.finish(generation, result, |inner, session| {
            inner.session = Some(session);
            inner.set_step(WorkflowStep::Results);
        })
        .await
    }

    async fn upload_and_analyze(&self, file: &PdfFile) -> Result<PdfSession, ApiError> {
        let uploaded = self.api.upload_pdf(file, self.user_id.as_deref()).await?;
        let analysis = self.api.analyze_pdf(&uploaded.session_id).await?;
        Ok(PdfSession::from_analysis(&uploaded, analysis))
    }

    /// Optimizes the current session with the current settings and moves to Preview.
    pub async fn optimize(&self) -> Result<PdfSession, WorkflowError> {
        self.run_optimize(true).await
    }

    /// Same request as [`optimize`](Self::optimize), without a step change.
    pub async fn regenerate(&self) -> Result<PdfSession, WorkflowError> {
        self.run_optimize(false).await
    }

    async fn run_optimize(&self, advance: bool) -> Result<PdfSession, WorkflowError> {
        let (generation, id, settings) = match self.begin_optimize().await {
            Ok(started) => started,
            Err(err) => {
                // Busy leaves the error slot to the request in flight.
                if err == WorkflowError::NoSession {
                    self.record_error(&err).await;
                }
                return Err(err);
            }
        };
        log::info!(
            "{} session {id} (ink={}, pages={})",
            if advance { "optimizing" } else { "regenerating" },
            settings.ink_saver_level,
            settings.page_saver_level
        );

        let result = self.api.optimize_pdf(&id, &settings).await;

        self.finish(generation, result, |inner, session| {
            inner.session = Some(session);
            if advance {
                inner.set_step(WorkflowStep::Preview);
            }
        })
        .await
    }

    /// Back to an empty Upload step with default settings. No network call.
    pub async fn reset(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.generation = inner.generation.wrapping_add(1);
            inner.session = None;
            inner.settings = OptimizeSettings::default();
            inner.error = None;
            inner.is_loading = false;
            inner.set_step(WorkflowStep::Upload);
        }
        self.emit().await;
    }

    /// Dismisses the error view. Without a session the Upload step is re-armed.
    pub async fn retry(&self) {
        {
            let mut inner = self.inner.lock().await;
            inner.error = None;
            if inner.session.is_none() {
                inner.set_step(WorkflowStep::Upload);
            }
        }
        self.emit().await;
    }

    async fn record_error(&self, err: &WorkflowError) {
        self.inner.lock().await.error = Some(err.to_string());
        self.emit().await;
    }

    async fn begin(&self) -> Result<u64, WorkflowError> {
        let generation = {
            let mut inner = self.inner.lock().await;
            if inner.is_loading {
                return Err(WorkflowError::Busy);
            }
            inner.is_loading = true;
            inner.error = None;
            inner.generation
        };
        self.emit().await;
        Ok(generation)
    }

    async fn begin_optimize(&self) -> Result<(u64, SessionId, OptimizeSettings), WorkflowError> {
        let started = {
            let mut inner = self.inner.lock().await;
            let Some(id) = inner.session.as_ref().map(|s| s.id.clone()) else {
                return Err(WorkflowError::NoSession);
            };
            if inner.is_loading {
                return Err(WorkflowError::Busy);
            }
            inner.is_loading = true;
            inner.error = None;
            (inner.generation, id, inner.settings)
        };
        self.emit().await;
        Ok(started)
    }

    async fn finish<F>(
        &self,
        generation: u64,
        result: Result<PdfSession, ApiError>,
        apply: F,
    ) -> Result<PdfSession, WorkflowError>
    where
        F: FnOnce(&mut Inner, PdfSession),
    {
        let outcome = {
            let mut inner = self.inner.lock().await;
            let current = inner.generation == generation;
            if current {
                inner.is_loading = false;
            } else {
                log::info!("discarding result of a request started before reset");
            }

            match result {
                Ok(session) => {
                    if current {
                        apply(&mut inner, session.clone());
                        inner.error = None;
                    }
                    Ok(session)
                }
                Err(e) => {
                    let err = WorkflowError::from(e);
                    log::warn!("request failed: {err}");
                    if current {
                        inner.error = Some(err.to_string());
                    }
                    Err(err)
                }
            }
        };
        self.emit().await;
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use papercuts_core::pdf::UploadRejection;

    #[test]
    fn classifies_api_errors() {
        let v: WorkflowError = ApiError::Rejected(UploadRejection::TooLarge {
            size: 1,
            limit: 0,
        })
        .into();
        assert!(matches!(v, WorkflowError::Validation(_)));

        let c: WorkflowError = ApiError::Network("connection refused".into()).into();
        assert!(matches!(c, WorkflowError::Connectivity(_)));

        let b: WorkflowError = ApiError::Request {
            status: 500,
            message: "disk full".into(),
        }
        .into();
        assert_eq!(b, WorkflowError::Backend("disk full".into()));
    }

    #[test]
    fn blank_server_message_falls_back_to_generic() {
        let b: WorkflowError = ApiError::Request {
            status: 500,
            message: " ".into(),
        }
        .into();
        assert_eq!(b.to_string(), GENERIC_ERROR_MESSAGE);
    }
}
