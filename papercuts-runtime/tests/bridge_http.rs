use papercuts_providers::Transport;
use papercuts_runtime::bridge::ExtensionBridge;
use serde_json::{Value, json};
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn bridge(server: &MockServer) -> ExtensionBridge {
    ExtensionBridge::new(Transport::new(format!("{}/api", server.uri())).unwrap())
}

#[tokio::test]
async fn json_request_is_proxied() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pdf/s1/optimize"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"inkSaverLevel": 60})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "s1", "status": "COMPLETE"})))
        .expect(1)
        .mount(&server)
        .await;

    let out = bridge(&server)
        .await
        .handle_line(
            r#"{"type":"API_REQUEST","method":"POST","endpoint":"/pdf/s1/optimize","body":{"inkSaverLevel":60}}"#,
        )
        .await;
    assert_eq!(out, json!({"id": "s1", "status": "COMPLETE"}));
}

#[tokio::test]
async fn form_data_upload_is_proxied_as_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pdf/upload"))
        .and(body_string_contains("filename=\"a.pdf\""))
        .and(body_string_contains("%PDF"))
        .respond_with(ResponseTemplate::new(201).set_body_json(
            json!({"sessionId": "s1", "originalFileName": "a.pdf", "status": "UPLOADED"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let out = bridge(&server)
        .await
        .handle_line(
            r#"{"type":"API_REQUEST","method":"POST","endpoint":"/pdf/upload",
                "formData":[{"name":"file","fileName":"a.pdf","mimeType":"application/pdf","base64":"JVBERi0xLjQ="}]}"#,
        )
        .await;
    assert_eq!(out["sessionId"], "s1");
}

#[tokio::test]
async fn html_and_binary_responses_are_wrapped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/pdf/s1/report"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<h1>r</h1>", "text/html"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/pdf/s1/original"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF".to_vec(), "application/pdf"))
        .mount(&server)
        .await;

    let b = bridge(&server).await;
    let html = b
        .handle_line(r#"{"type":"API_REQUEST","method":"GET","endpoint":"/pdf/s1/report"}"#)
        .await;
    assert_eq!(html, json!({"text": "<h1>r</h1>"}));

    let pdf = b
        .handle_line(r#"{"type":"API_REQUEST","method":"GET","endpoint":"/pdf/s1/original"}"#)
        .await;
    assert_eq!(pdf, json!({"binary": "JVBERg==", "size": 4}));
}

#[tokio::test]
async fn failures_become_error_objects() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pdf/s1/analyze"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "analysis failed"})))
        .mount(&server)
        .await;

    let b = bridge(&server).await;
    let out = b
        .handle_line(r#"{"type":"API_REQUEST","method":"POST","endpoint":"/pdf/s1/analyze"}"#)
        .await;
    assert_eq!(out, json!({"error": "analysis failed"}));

    let garbage = b.handle_line("not json").await;
    assert!(garbage["error"].as_str().unwrap().starts_with("invalid message"));
}

#[tokio::test]
async fn health_check_reports_connectivity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let up = bridge(&server)
        .await
        .handle_line(r#"{"type":"CHECK_HEALTH"}"#)
        .await;
    assert_eq!(up, json!({"connected": true}));

    let offline = ExtensionBridge::new(Transport::new("http://127.0.0.1:9/api").unwrap());
    let down = offline.handle_line(r#"{"type":"CHECK_HEALTH"}"#).await;
    assert_eq!(down, json!({"connected": false}));
}

#[tokio::test]
async fn serve_answers_one_line_per_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let input = b"{\"type\":\"CHECK_HEALTH\"}\n\n{\"type\":\"NOPE\"}\n".to_vec();
    let mut output: Vec<u8> = Vec::new();
    bridge(&server)
        .await
        .serve(input.as_slice(), &mut output)
        .await
        .unwrap();

    let lines: Vec<Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], json!({"connected": true}));
    assert!(lines[1]["error"].is_string());
}
