use std::sync::Arc;

use papercuts_core::config::ClientConfig;
use papercuts_core::dashboard::CreateUserRequest;
use papercuts_core::pdf::PdfFile;
use papercuts_core::settings::OptimizeSettings;
use papercuts_core::types::{ArtifactKind, SessionId};
use papercuts_engine::controller::{WorkflowController, WorkflowError};
use papercuts_engine::session::WorkflowStep;
use papercuts_engine::traits::PdfApi;
use papercuts_providers::ApiError;
use papercuts_runtime::build_clients_from_config;
use papercuts_runtime::live::LivePdfApi;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn live_config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        api_base: format!("{}/api", server.uri()),
        use_mock: false,
    }
}

fn json_response(status: u16, body: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(body)
}

async fn mount_upload_and_analyze(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/pdf/upload"))
        .and(body_string_contains("filename=\"report.pdf\""))
        .and(body_string_contains("name=\"userId\""))
        .respond_with(json_response(
            201,
            json!({"sessionId":"s1","originalFileName":"report.pdf","status":"UPLOADED"}),
        ))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/pdf/s1/analyze"))
        .respond_with(json_response(
            200,
            json!({
                "diagnosis": ["dense"],
                "recommendations": ["a", "b", "c", "d"],
                "estimatedSavings": {"pages": 3, "inkPercent": 30},
                "inkBefore": 0.18,
                "pagesBefore": 42,
                "optimizingScore": 82
            }),
        ))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn workflow_against_http_backend() {
    let server = MockServer::start().await;
    mount_upload_and_analyze(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/pdf/s1/optimize"))
        .and(body_json(json!({
            "inkSaverLevel": 70,
            "pageSaverLevel": 50,
            "preserveQuality": true,
            "excludeImages": false
        })))
        .respond_with(json_response(
            200,
            json!({
                "id": "s1",
                "originalFileName": "report.pdf",
                "pagesBefore": 42,
                "inkBefore": 0.18,
                "pagesAfter": 39,
                "inkAfter": 0.12,
                "optimizingScore": 82,
                "suggestions": ["a", "b", "c", "d"],
                "changesApplied": ["Generated optimization report with 3 recommendations"],
                "status": "COMPLETE"
            }),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let api = Arc::new(LivePdfApi::new(live_config(&server)).unwrap());
    let c = WorkflowController::new(api.clone()).with_user_id("U1");

    c.upload(PdfFile::new("report.pdf", "application/pdf", b"%PDF-1.4".to_vec()))
        .await
        .unwrap();
    assert_eq!(c.status().await.step, WorkflowStep::Results);

    c.update_settings(OptimizeSettings::default().with_ink_saver_level(70))
        .await;
    c.optimize().await.unwrap();

    let st = c.status().await;
    assert_eq!(st.step, WorkflowStep::Preview);
    assert_eq!(st.pages_saved(), Some(3));
    assert_eq!(st.ink_reduced_percent(), Some(33));
}

#[tokio::test]
async fn backend_error_message_reaches_the_controller() {
    let server = MockServer::start().await;
    mount_upload_and_analyze(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/pdf/s1/optimize"))
        .respond_with(json_response(500, json!({"error": "disk full"})))
        .mount(&server)
        .await;

    let api = Arc::new(LivePdfApi::new(live_config(&server)).unwrap());
    let c = WorkflowController::new(api).with_user_id("U1");
    c.upload(PdfFile::new("report.pdf", "application/pdf", b"%PDF-1.4".to_vec()))
        .await
        .unwrap();

    let err = c.optimize().await.unwrap_err();
    assert_eq!(err, WorkflowError::Backend("disk full".into()));
    let st = c.status().await;
    assert_eq!(st.step, WorkflowStep::Results);
    assert_eq!(st.error.as_deref(), Some("disk full"));
}

#[tokio::test]
async fn missing_session_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/pdf/gone/status"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let api = LivePdfApi::new(live_config(&server)).unwrap();
    let err = api.get_session(&SessionId::new("gone")).await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn report_artifact_and_delete() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/pdf/s1/report"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<!DOCTYPE html><p>report</p>", "text/html"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/pdf/s1/original"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4 original".to_vec(), "application/pdf"),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/pdf/s1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let api = LivePdfApi::new(live_config(&server)).unwrap();
    let id = SessionId::new("s1");
    assert_eq!(
        api.get_report_html(&id).await.unwrap(),
        "<!DOCTYPE html><p>report</p>"
    );
    assert_eq!(
        api.fetch_artifact(&id, ArtifactKind::Original).await.unwrap(),
        b"%PDF-1.4 original".to_vec()
    );
    api.delete_session(&id).await.unwrap();
}

#[tokio::test]
async fn rejected_upload_never_reaches_the_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pdf/upload"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let api = LivePdfApi::new(live_config(&server)).unwrap();
    let err = api
        .upload_pdf(&PdfFile::new("notes.txt", "text/plain", b"hi".to_vec()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Rejected(_)));
}

#[tokio::test]
async fn dashboard_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/sessions"))
        .and(query_param("userId", "user-001"))
        .respond_with(json_response(
            200,
            json!({
                "sessions": [{"_id": "1", "userId": "user-001", "pages": 4, "inkUse": 0.12, "optimizingScore": 71}],
                "total": 1
            }),
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/users"))
        .and(body_json(json!({"userId": "user-003", "name": "Sam"})))
        .respond_with(json_response(
            201,
            json!({"_id": "u-3", "userId": "user-003", "name": "Sam", "isAdmin": false, "sessionIds": []}),
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/users/inkTotal/user-001"))
        .respond_with(json_response(200, json!(0.25)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/dashboard/org-metrics"))
        .respond_with(json_response(
            200,
            json!({"totalPagesSaved": 2847, "totalInkSaved": 42.3, "avgOptimizingScore": 82, "totalSessions": 156}),
        ))
        .mount(&server)
        .await;

    let clients = build_clients_from_config(live_config(&server)).unwrap();
    let d = clients.dashboard;

    let sessions = d.list_sessions(Some("user-001")).await.unwrap();
    assert_eq!(sessions.total, 1);
    assert_eq!(sessions.sessions[0].id, "1");

    let user = d
        .create_user(&CreateUserRequest {
            user_id: "user-003".into(),
            name: "Sam".into(),
            is_admin: None,
            num_user: None,
        })
        .await
        .unwrap();
    assert_eq!(user.id, "u-3");

    assert_eq!(d.user_ink_total("user-001").await.unwrap(), 0.25);

    let m = d.org_metrics().await.unwrap();
    assert_eq!(m.total_sessions, 156);
    assert_eq!(m.avg_optimizing_score, 82.0);
}
