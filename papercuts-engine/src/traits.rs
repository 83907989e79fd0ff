use async_trait::async_trait;
use papercuts_core::config::ClientConfig;
use papercuts_core::dashboard::{
    CreateSessionRequest, CreateUserRequest, DashboardSession, OrgMetrics, SessionsResponse, User,
    UsersResponse,
};
use papercuts_core::pdf::{AnalysisResult, PdfFile, PdfSession, UploadResponse};
use papercuts_core::settings::OptimizeSettings;
use papercuts_core::types::{ArtifactKind, SessionId};
use papercuts_providers::ApiError;
use papercuts_providers::endpoints::{self, join_url};

use crate::session::WorkflowStatus;

/// The PDF optimization backend, live or mocked.
#[async_trait]
pub trait PdfApi: Send + Sync {
    fn config(&self) -> ClientConfig;

    /// Never fails; an unreachable backend is just `false`.
    async fn check_health(&self) -> bool;

    async fn upload_pdf(
        &self,
        file: &PdfFile,
        user_id: Option<&str>,
    ) -> Result<UploadResponse, ApiError>;

    async fn analyze_pdf(&self, id: &SessionId) -> Result<AnalysisResult, ApiError>;

    async fn optimize_pdf(
        &self,
        id: &SessionId,
        settings: &OptimizeSettings,
    ) -> Result<PdfSession, ApiError>;

    async fn get_session(&self, id: &SessionId) -> Result<PdfSession, ApiError>;

    async fn get_report_html(&self, id: &SessionId) -> Result<String, ApiError>;

    async fn fetch_artifact(&self, id: &SessionId, kind: ArtifactKind)
    -> Result<Vec<u8>, ApiError>;

    async fn delete_session(&self, id: &SessionId) -> Result<(), ApiError>;

    // URLs are derived from the base URL only; no network call.
    fn artifact_url(&self, id: &SessionId, kind: ArtifactKind) -> String {
        join_url(&self.config().api_base, &endpoints::pdf_artifact(id, kind))
    }

    fn original_url(&self, id: &SessionId) -> String {
        self.artifact_url(id, ArtifactKind::Original)
    }

    fn optimized_url(&self, id: &SessionId) -> String {
        self.artifact_url(id, ArtifactKind::Optimized)
    }

    fn report_download_url(&self, id: &SessionId) -> String {
        join_url(&self.config().api_base, &endpoints::pdf_report_download(id))
    }
}

/// The dashboard's CRUD surface. Independent of the optimization workflow.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    async fn list_sessions(&self, user_id: Option<&str>) -> Result<SessionsResponse, ApiError>;

    async fn create_session(
        &self,
        req: &CreateSessionRequest,
    ) -> Result<DashboardSession, ApiError>;

    async fn list_users(&self) -> Result<UsersResponse, ApiError>;

    async fn create_user(&self, req: &CreateUserRequest) -> Result<User, ApiError>;

    async fn user_page_total(&self, user_id: &str) -> Result<f64, ApiError>;

    async fn user_ink_total(&self, user_id: &str) -> Result<f64, ApiError>;

    async fn user_avg_score(&self, user_id: &str) -> Result<f64, ApiError>;

    async fn org_metrics(&self) -> Result<OrgMetrics, ApiError>;
}

/// Receives a fresh snapshot after every controller state change. Must be fast.
pub trait WorkflowObserver: Send + Sync {
    fn on_status(&self, status: &WorkflowStatus);
}
