// Paths of the backend REST surface, relative to the configured base URL.

use std::borrow::Cow;

use papercuts_core::types::{ArtifactKind, SessionId};

pub const HEALTH: &str = "/health";
pub const PDF_UPLOAD: &str = "/pdf/upload";

pub const SESSIONS: &str = "/sessions";
pub const USERS: &str = "/users";
pub const ORG_METRICS: &str = "/dashboard/org-metrics";

// Ids are single path segments: `/`, `?` and spaces must not change the route.
fn segment(raw: &str) -> Cow<'_, str> {
    urlencoding::encode(raw)
}

pub fn pdf_session(id: &SessionId) -> String {
    format!("/pdf/{}", segment(id.as_str()))
}

pub fn pdf_analyze(id: &SessionId) -> String {
    format!("/pdf/{}/analyze", segment(id.as_str()))
}

pub fn pdf_optimize(id: &SessionId) -> String {
    format!("/pdf/{}/optimize", segment(id.as_str()))
}

pub fn pdf_status(id: &SessionId) -> String {
    format!("/pdf/{}/status", segment(id.as_str()))
}

pub fn pdf_artifact(id: &SessionId, kind: ArtifactKind) -> String {
    format!("/pdf/{}/{}", segment(id.as_str()), kind.path_segment())
}

pub fn pdf_report(id: &SessionId) -> String {
    format!("/pdf/{}/report", segment(id.as_str()))
}

pub fn pdf_report_download(id: &SessionId) -> String {
    format!("/pdf/{}/report/download", segment(id.as_str()))
}

pub fn sessions_for_user(user_id: Option<&str>) -> String {
    match user_id.filter(|u| !u.trim().is_empty()) {
        Some(user) => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("userId", user)
                .finish();
            format!("{SESSIONS}?{query}")
        }
        None => SESSIONS.to_string(),
    }
}

pub fn user_page_total(user_id: &str) -> String {
    format!("{USERS}/pageTotal/{}", segment(user_id))
}

pub fn user_ink_total(user_id: &str) -> String {
    format!("{USERS}/inkTotal/{}", segment(user_id))
}

pub fn user_avg_score(user_id: &str) -> String {
    format!("{USERS}/avgScore/{}", segment(user_id))
}

pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}
