use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};

use crate::decode::{DecodedBody, classify_content_type, decode_body, error_message};
use crate::endpoints::{HEALTH, join_url};
use crate::error::ApiError;
use crate::request::{Body, HttpRequest, Method, RequestBody, build_request};

pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }

    /// Normalizes failures and decodes successful bodies by content type.
    pub fn into_decoded(self) -> Result<DecodedBody, ApiError> {
        if !self.is_success() {
            return Err(ApiError::Request {
                status: self.status,
                message: error_message(self.status, &self.body),
            });
        }
        let kind = classify_content_type(self.content_type.as_deref());
        decode_body(kind, self.body)
    }
}

/// HTTP access to one backend base URL.
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
    base_url: String,
}

impl Transport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        // No overall timeout: uploads, analysis and optimization may legitimately run long.
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("build http client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<DecodedBody, ApiError> {
        let req = build_request(&self.base_url, method, path, body);
        let resp = self.execute(&req, None).await?;
        let status = resp.status;
        let decoded = resp.into_decoded();
        match &decoded {
            Ok(_) => log::debug!("{} {} -> {}", req.method, req.url, status),
            Err(e) => log::warn!("{} {} failed: {e}", req.method, req.url),
        }
        decoded
    }

    pub async fn execute(
        &self,
        req: &HttpRequest,
        timeout: Option<Duration>,
    ) -> Result<HttpResponse, ApiError> {
        log::debug!("sending {req:?}");

        let mut headers = HeaderMap::new();
        for (k, v) in &req.headers {
            let name = HeaderName::from_bytes(k.as_bytes())
                .map_err(|_| ApiError::InvalidRequest(format!("invalid header name: {k}")))?;
            let value = HeaderValue::from_str(v)
                .map_err(|_| ApiError::InvalidRequest(format!("invalid header value for {k}")))?;
            headers.insert(name, value);
        }

        let builder = match req.method {
            Method::Get => self.client.get(&req.url),
            Method::Post => self.client.post(&req.url),
            Method::Put => self.client.put(&req.url),
            Method::Delete => self.client.delete(&req.url),
        }
        .headers(headers);

        let builder = match &req.body {
            Body::Empty => builder,
            Body::Json(s) => builder.body(s.clone()),
            Body::MultipartFormData { bytes, .. } => builder.body(bytes.clone()),
        };

        let builder = match timeout {
            Some(t) => builder.timeout(t),
            None => builder,
        };

        let resp = builder
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp
            .bytes()
            .await
            .map_err(|e| ApiError::from_reqwest(&e))?
            .to_vec();

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }

    /// `GET /health`; any failure, including the timeout, is just `false`.
    pub async fn check_health(&self) -> bool {
        self.check_health_with_timeout(HEALTH_TIMEOUT).await
    }

    pub async fn check_health_with_timeout(&self, timeout: Duration) -> bool {
        let req = build_request(&self.base_url, Method::Get, HEALTH, RequestBody::None);
        match self.execute(&req, Some(timeout)).await {
            Ok(resp) if resp.is_success() => true,
            Ok(resp) => {
                log::info!("health check returned HTTP {}", resp.status);
                false
            }
            Err(e) => {
                log::info!("health check failed: {e}");
                false
            }
        }
    }
}
