use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use papercuts_core::config::ClientConfig;
use papercuts_core::dashboard::{
    CreateSessionRequest, CreateUserRequest, DashboardSession, OrgMetrics, SessionsResponse, User,
    UsersResponse,
};
use papercuts_core::pdf::{
    AnalysisResult, EstimatedSavings, PdfFile, PdfSession, UploadResponse, validate_upload,
};
use papercuts_core::settings::OptimizeSettings;
use papercuts_core::types::{ArtifactKind, SessionId, SessionStatus};
use papercuts_engine::traits::{DashboardApi, PdfApi};
use papercuts_providers::ApiError;

use crate::fixtures;

/// Simulated network delay for the mock clients. `NONE` makes every call immediate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockLatency {
    scale: f64,
}

impl MockLatency {
    pub const REALISTIC: Self = Self { scale: 1.0 };
    pub const NONE: Self = Self { scale: 0.0 };

    pub const UPLOAD: Duration = Duration::from_millis(1500);
    pub const ANALYZE: Duration = Duration::from_millis(2500);
    pub const OPTIMIZE: Duration = Duration::from_millis(2000);
    pub const FETCH: Duration = Duration::from_millis(500);
    pub const LOOKUP: Duration = Duration::from_millis(300);
    pub const DASHBOARD: Duration = Duration::from_millis(500);

    pub fn scaled(scale: f64) -> Self {
        let scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
        Self { scale }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub async fn wait(&self, base: Duration) {
        if self.scale > 0.0 {
            tokio::time::sleep(base.mul_f64(self.scale)).await;
        }
    }
}

impl Default for MockLatency {
    fn default() -> Self {
        Self::REALISTIC
    }
}

#[derive(Debug, Clone)]
struct StoredPdf {
    session: PdfSession,
    original: Vec<u8>,
    report_html: Option<String>,
}

#[derive(Debug, Default)]
struct RepoState {
    pdfs: HashMap<String, StoredPdf>,
    sessions: Vec<DashboardSession>,
    users: Vec<User>,
}

/// In-memory backend shared by the mock PDF and dashboard clients.
///
/// Constructed once and handed to both clients; there is no process-wide instance.
#[derive(Debug, Clone, Default)]
pub struct MockRepository {
    state: Arc<Mutex<RepoState>>,
}

impl MockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated with the demo users and usage sessions.
    pub fn seeded() -> Self {
        let repo = Self::new();
        {
            let mut st = repo.lock();
            st.users = fixtures::seed_users();
            st.sessions = fixtures::seed_sessions();
        }
        repo
    }

    fn lock(&self) -> MutexGuard<'_, RepoState> {
        // A panic while holding the lock leaves plain data behind; keep serving it.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn pdf_session_count(&self) -> usize {
        self.lock().pdfs.len()
    }

    fn with_pdf<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut StoredPdf) -> Result<T, ApiError>,
    ) -> Result<T, ApiError> {
        let mut st = self.lock();
        let stored = st
            .pdfs
            .get_mut(id.as_str())
            .ok_or_else(|| ApiError::NotFound {
                resource: format!("session {id}"),
            })?;
        f(stored)
    }
}

/// Offline stand-in for the optimization backend.
#[derive(Debug, Clone)]
pub struct MockPdfApi {
    config: ClientConfig,
    repo: MockRepository,
    latency: MockLatency,
}

impl MockPdfApi {
    pub fn new(config: ClientConfig, repo: MockRepository) -> Self {
        Self {
            config,
            repo,
            latency: MockLatency::default(),
        }
    }

    pub fn with_latency(mut self, latency: MockLatency) -> Self {
        self.latency = latency;
        self
    }

    pub fn repository(&self) -> &MockRepository {
        &self.repo
    }
}

// Page reduction grows with the page saver level, up to 30% of the document.
fn mock_pages_after(pages_before: u32, page_saver_level: u8) -> u32 {
    let cut = (f64::from(pages_before) * f64::from(page_saver_level) / 100.0 * 0.3).round() as u32;
    pages_before.saturating_sub(cut).max(1)
}

fn mock_ink_after(ink_before: f64, ink_saver_level: u8) -> f64 {
    ink_before * (1.0 - (0.15 + f64::from(ink_saver_level) * 0.002))
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

fn mock_report(session: &PdfSession) -> String {
    let items: String = session
        .suggestions
        .iter()
        .take(3)
        .map(|s| format!("<li>{}</li>", escape_html(s)))
        .collect();
    format!(
        "<!DOCTYPE html><html><head><title>{name}</title></head><body>\
         <h1>Optimization report: {name}</h1><ol>{items}</ol></body></html>",
        name = escape_html(&session.original_file_name)
    )
}

#[async_trait::async_trait]
impl PdfApi for MockPdfApi {
    fn config(&self) -> ClientConfig {
        self.config.clone()
    }

    async fn check_health(&self) -> bool {
        true
    }

    async fn upload_pdf(
        &self,
        file: &PdfFile,
        user_id: Option<&str>,
    ) -> Result<UploadResponse, ApiError> {
        validate_upload(file)?;
        self.latency.wait(MockLatency::UPLOAD).await;

        let id = SessionId::new(uuid::Uuid::new_v4().to_string());
        let session = PdfSession {
            id: id.clone(),
            user_id: user_id.map(str::to_string),
            original_file_name: file.file_name.clone(),
            pages_before: 0,
            ink_before: 0.0,
            pages_after: None,
            ink_after: None,
            optimizing_score: None,
            suggestions: vec![],
            changes_applied: vec![],
            ink_saver_level: None,
            page_saver_level: None,
            preserve_quality: None,
            exclude_images: None,
            status: SessionStatus::Uploaded,
            created_at: Some(Utc::now()),
            expires_at: None,
        };
        self.repo.lock().pdfs.insert(
            id.as_str().to_string(),
            StoredPdf {
                session,
                original: file.bytes.clone(),
                report_html: None,
            },
        );
        log::debug!("mock upload stored {} as {id}", file.file_name);

        Ok(UploadResponse {
            session_id: id,
            original_file_name: file.file_name.clone(),
            status: SessionStatus::Uploaded.label().to_string(),
        })
    }

    async fn analyze_pdf(&self, id: &SessionId) -> Result<AnalysisResult, ApiError> {
        self.latency.wait(MockLatency::ANALYZE).await;
        self.repo.with_pdf(id, |stored| {
            let s = &mut stored.session;
            s.pages_before = fixtures::MOCK_PAGES_BEFORE;
            s.ink_before = fixtures::MOCK_INK_BEFORE;
            s.optimizing_score = Some(fixtures::MOCK_OPTIMIZING_SCORE);
            s.suggestions = fixtures::mock_recommendations();
            s.status = SessionStatus::Analyzed;

            let defaults = OptimizeSettings::default();
            Ok(AnalysisResult {
                diagnosis: fixtures::mock_diagnosis(),
                recommendations: s.suggestions.clone(),
                estimated_savings: EstimatedSavings {
                    pages: i64::from(s.pages_before)
                        - i64::from(mock_pages_after(s.pages_before, defaults.page_saver_level)),
                    ink_percent: ((0.15 + f64::from(defaults.ink_saver_level) * 0.002) * 100.0)
                        .round(),
                },
                ink_before: s.ink_before,
                pages_before: s.pages_before,
                optimizing_score: fixtures::MOCK_OPTIMIZING_SCORE,
            })
        })
    }

    async fn optimize_pdf(
        &self,
        id: &SessionId,
        settings: &OptimizeSettings,
    ) -> Result<PdfSession, ApiError> {
        let settings = settings.clamped();
        self.latency.wait(MockLatency::OPTIMIZE).await;
        self.repo.with_pdf(id, |stored| {
            let s = &mut stored.session;
            if matches!(s.status, SessionStatus::Uploaded | SessionStatus::Analyzing) {
                return Err(ApiError::Request {
                    status: 409,
                    message: "Session has not been analyzed yet".into(),
                });
            }
            s.ink_saver_level = Some(settings.ink_saver_level);
            s.page_saver_level = Some(settings.page_saver_level);
            s.preserve_quality = Some(settings.preserve_quality);
            s.exclude_images = Some(settings.exclude_images);
            s.pages_after = Some(mock_pages_after(s.pages_before, settings.page_saver_level));
            s.ink_after = Some(mock_ink_after(s.ink_before, settings.ink_saver_level));
            s.changes_applied =
                fixtures::mock_changes_applied(settings.ink_saver_level, settings.page_saver_level);
            s.status = SessionStatus::Complete;
            stored.report_html = Some(mock_report(s));
            Ok(stored.session.clone())
        })
    }

    async fn get_session(&self, id: &SessionId) -> Result<PdfSession, ApiError> {
        self.latency.wait(MockLatency::LOOKUP).await;
        self.repo.with_pdf(id, |stored| Ok(stored.session.clone()))
    }

    async fn get_report_html(&self, id: &SessionId) -> Result<String, ApiError> {
        self.latency.wait(MockLatency::FETCH).await;
        self.repo.with_pdf(id, |stored| {
            stored.report_html.clone().ok_or_else(|| ApiError::NotFound {
                resource: format!("report for session {id}"),
            })
        })
    }

    async fn fetch_artifact(
        &self,
        id: &SessionId,
        kind: ArtifactKind,
    ) -> Result<Vec<u8>, ApiError> {
        self.latency.wait(MockLatency::FETCH).await;
        self.repo.with_pdf(id, |stored| match kind {
            ArtifactKind::Original => Ok(stored.original.clone()),
            // The mock cannot rewrite PDFs; the optimized artifact mirrors the original.
            ArtifactKind::Optimized if stored.session.status == SessionStatus::Complete => {
                Ok(stored.original.clone())
            }
            ArtifactKind::Optimized => Err(ApiError::NotFound {
                resource: format!("optimized PDF for session {id}"),
            }),
        })
    }

    async fn delete_session(&self, id: &SessionId) -> Result<(), ApiError> {
        self.latency.wait(MockLatency::LOOKUP).await;
        match self.repo.lock().pdfs.remove(id.as_str()) {
            Some(_) => Ok(()),
            None => Err(ApiError::NotFound {
                resource: format!("session {id}"),
            }),
        }
    }
}

/// Offline stand-in for the dashboard endpoints.
#[derive(Debug, Clone)]
pub struct MockDashboardApi {
    repo: MockRepository,
    latency: MockLatency,
}

impl MockDashboardApi {
    pub fn new(repo: MockRepository) -> Self {
        Self {
            repo,
            latency: MockLatency::default(),
        }
    }

    pub fn with_latency(mut self, latency: MockLatency) -> Self {
        self.latency = latency;
        self
    }

    fn user_sessions<T>(
        &self,
        user_id: &str,
        f: impl FnOnce(&[&DashboardSession]) -> T,
    ) -> Result<T, ApiError> {
        let st = self.repo.lock();
        if !st.users.iter().any(|u| u.user_id == user_id || u.id == user_id) {
            return Err(ApiError::NotFound {
                resource: format!("user {user_id}"),
            });
        }
        let owned: Vec<&DashboardSession> =
            st.sessions.iter().filter(|s| s.user_id == user_id).collect();
        Ok(f(&owned))
    }
}

#[async_trait::async_trait]
impl DashboardApi for MockDashboardApi {
    async fn list_sessions(&self, user_id: Option<&str>) -> Result<SessionsResponse, ApiError> {
        self.latency.wait(MockLatency::DASHBOARD).await;
        let st = self.repo.lock();
        let sessions: Vec<DashboardSession> = st
            .sessions
            .iter()
            .filter(|s| user_id.is_none_or(|u| s.user_id == u))
            .cloned()
            .collect();
        Ok(SessionsResponse {
            total: sessions.len(),
            sessions,
        })
    }

    async fn create_session(
        &self,
        req: &CreateSessionRequest,
    ) -> Result<DashboardSession, ApiError> {
        self.latency.wait(MockLatency::DASHBOARD).await;
        let mut st = self.repo.lock();
        let created = DashboardSession {
            id: (st.sessions.len() + 1).to_string(),
            session_id: None,
            user_id: req.user_id.clone(),
            pages: req.pages,
            ink_use: req.ink_use,
            optimizing_score: req.optimizing_score,
            created_at: Some(Utc::now()),
        };
        if let Some(user) = st.users.iter_mut().find(|u| u.user_id == req.user_id) {
            user.session_ids.push(created.id.clone());
        }
        st.sessions.push(created.clone());
        Ok(created)
    }

    async fn list_users(&self) -> Result<UsersResponse, ApiError> {
        self.latency.wait(MockLatency::DASHBOARD).await;
        let users = self.repo.lock().users.clone();
        Ok(UsersResponse {
            total: users.len(),
            users,
        })
    }

    async fn create_user(&self, req: &CreateUserRequest) -> Result<User, ApiError> {
        self.latency.wait(MockLatency::DASHBOARD).await;
        let mut st = self.repo.lock();
        let created = User {
            id: format!("u-{}", st.users.len() + 1),
            user_id: req.user_id.clone(),
            name: req.name.clone(),
            is_admin: req.is_admin.unwrap_or(false),
            num_user: req.num_user.unwrap_or(0),
            session_ids: vec![],
            created_at: Some(Utc::now()),
        };
        st.users.push(created.clone());
        Ok(created)
    }

    async fn user_page_total(&self, user_id: &str) -> Result<f64, ApiError> {
        self.latency.wait(MockLatency::DASHBOARD).await;
        self.user_sessions(user_id, |s| s.iter().map(|s| f64::from(s.pages)).sum())
    }

    async fn user_ink_total(&self, user_id: &str) -> Result<f64, ApiError> {
        self.latency.wait(MockLatency::DASHBOARD).await;
        self.user_sessions(user_id, |s| s.iter().map(|s| s.ink_use).sum())
    }

    async fn user_avg_score(&self, user_id: &str) -> Result<f64, ApiError> {
        self.latency.wait(MockLatency::DASHBOARD).await;
        self.user_sessions(user_id, |s| {
            if s.is_empty() {
                0.0
            } else {
                s.iter().map(|s| f64::from(s.optimizing_score)).sum::<f64>() / s.len() as f64
            }
        })
    }

    async fn org_metrics(&self) -> Result<OrgMetrics, ApiError> {
        self.latency.wait(MockLatency::DASHBOARD).await;
        let st = self.repo.lock();
        let n = st.sessions.len();
        let optimized = st.pdfs.values().map(|p| &p.session).filter(|s| s.ink_after.is_some());
        let (pages_saved, ink_saved) = optimized.fold((0u64, 0.0f64), |(pages, ink), s| {
            let after = s.pages_after.unwrap_or(s.pages_before);
            (
                pages + u64::from(s.pages_before.saturating_sub(after)),
                ink + (s.ink_before - s.ink_after.unwrap_or(s.ink_before)).max(0.0),
            )
        });
        let avg = if n == 0 {
            0.0
        } else {
            st.sessions
                .iter()
                .map(|s| f64::from(s.optimizing_score))
                .sum::<f64>()
                / n as f64
        };
        Ok(OrgMetrics {
            total_pages_saved: pages_saved,
            total_ink_saved: ink_saved,
            avg_optimizing_score: avg,
            total_sessions: n as u64,
        })
    }
}
