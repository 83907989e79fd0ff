use papercuts_core::config::ClientConfig;
use papercuts_core::pdf::{AnalysisResult, PdfFile, PdfSession, UploadResponse, validate_upload};
use papercuts_core::settings::OptimizeSettings;
use papercuts_core::types::{ArtifactKind, SessionId};
use papercuts_engine::traits::PdfApi;
use papercuts_providers::endpoints;
use papercuts_providers::{ApiError, FormData, Method, RequestBody, Transport};

/// `PdfApi` over HTTP against the configured backend.
#[derive(Debug, Clone)]
pub struct LivePdfApi {
    config: ClientConfig,
    transport: Transport,
}

impl LivePdfApi {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let transport = Transport::new(config.api_base.clone())?;
        Ok(Self { config, transport })
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}

// The backend answers unknown ids with a bare 404.
pub(crate) fn not_found_as(resource: String) -> impl FnOnce(ApiError) -> ApiError {
    move |e| match e.status() {
        Some(404) => ApiError::NotFound { resource },
        _ => e,
    }
}

#[async_trait::async_trait]
impl PdfApi for LivePdfApi {
    fn config(&self) -> ClientConfig {
        self.config.clone()
    }

    async fn check_health(&self) -> bool {
        self.transport.check_health().await
    }

    async fn upload_pdf(
        &self,
        file: &PdfFile,
        user_id: Option<&str>,
    ) -> Result<UploadResponse, ApiError> {
        validate_upload(file)?;

        let mut form = FormData::new().file(
            "file",
            file.file_name.clone(),
            file.mime_type.clone(),
            file.bytes.clone(),
        );
        if let Some(user_id) = user_id.filter(|u| !u.is_empty()) {
            form = form.text("userId", user_id);
        }

        let out = self
            .transport
            .request(Method::Post, endpoints::PDF_UPLOAD, RequestBody::Form(form))
            .await?
            .into_json::<UploadResponse>()?;
        log::info!("uploaded {} as session {}", out.original_file_name, out.session_id);
        Ok(out)
    }

    async fn analyze_pdf(&self, id: &SessionId) -> Result<AnalysisResult, ApiError> {
        let out = self
            .transport
            .request(Method::Post, &endpoints::pdf_analyze(id), RequestBody::None)
            .await
            .map_err(not_found_as(format!("session {id}")))?
            .into_json::<AnalysisResult>()?;
        log::info!(
            "analyzed session {id}: {} pages, score {}",
            out.pages_before,
            out.optimizing_score
        );
        Ok(out)
    }

    async fn optimize_pdf(
        &self,
        id: &SessionId,
        settings: &OptimizeSettings,
    ) -> Result<PdfSession, ApiError> {
        let body = RequestBody::json(settings)?;
        let out = self
            .transport
            .request(Method::Post, &endpoints::pdf_optimize(id), body)
            .await
            .map_err(not_found_as(format!("session {id}")))?
            .into_json::<PdfSession>()?;
        log::info!("optimized session {id} -> {:?}", out.status);
        Ok(out)
    }

    async fn get_session(&self, id: &SessionId) -> Result<PdfSession, ApiError> {
        self.transport
            .request(Method::Get, &endpoints::pdf_status(id), RequestBody::None)
            .await
            .map_err(not_found_as(format!("session {id}")))?
            .into_json()
    }

    async fn get_report_html(&self, id: &SessionId) -> Result<String, ApiError> {
        self.transport
            .request(Method::Get, &endpoints::pdf_report(id), RequestBody::None)
            .await
            .map_err(not_found_as(format!("report for session {id}")))?
            .into_text()
    }

    async fn fetch_artifact(
        &self,
        id: &SessionId,
        kind: ArtifactKind,
    ) -> Result<Vec<u8>, ApiError> {
        let body = self
            .transport
            .request(Method::Get, &endpoints::pdf_artifact(id, kind), RequestBody::None)
            .await
            .map_err(not_found_as(format!(
                "{} PDF for session {id}",
                kind.path_segment()
            )))?;
        Ok(body.into_bytes())
    }

    async fn delete_session(&self, id: &SessionId) -> Result<(), ApiError> {
        self.transport
            .request(Method::Delete, &endpoints::pdf_session(id), RequestBody::None)
            .await
            .map_err(not_found_as(format!("session {id}")))?;
        log::info!("deleted session {id}");
        Ok(())
    }
}
