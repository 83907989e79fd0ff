// Host side of the browser extension's message contract. Each request is one JSON
// object; each gets exactly one JSON object back.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use papercuts_providers::{ApiError, DecodedBody, FormData, Method, RequestBody, Transport};
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtensionMessage {
    ApiRequest {
        method: Method,
        endpoint: String,
        #[serde(default)]
        body: Option<Value>,
        #[serde(default, rename = "formData")]
        form_data: Option<Vec<FormEntry>>,
    },
    CheckHealth,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FormEntry {
    File {
        name: String,
        #[serde(rename = "fileName")]
        file_name: String,
        #[serde(default, rename = "mimeType")]
        mime_type: Option<String>,
        base64: String,
    },
    Text {
        name: String,
        value: String,
    },
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("form field {name}: invalid base64 content")]
    InvalidBase64 { name: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FormEntry {
    fn into_part(self, form: FormData) -> Result<FormData, BridgeError> {
        match self {
            FormEntry::Text { name, value } => Ok(form.text(name, value)),
            FormEntry::File {
                name,
                file_name,
                mime_type,
                base64,
            } => {
                let bytes = BASE64
                    .decode(base64.trim())
                    .map_err(|_| BridgeError::InvalidBase64 { name: name.clone() })?;
                let mime_type = mime_type
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| papercuts_core::pdf::guess_mime_type(&file_name).into());
                Ok(form.file(name, file_name, mime_type, bytes))
            }
        }
    }
}

/// Converts a successful decoded body to the extension's response shape.
pub fn body_to_response(body: DecodedBody) -> Value {
    match body {
        DecodedBody::Json(v) => v,
        DecodedBody::Text(text) => json!({ "text": text }),
        DecodedBody::Binary(bytes) => json!({
            "binary": BASE64.encode(&bytes),
            "size": bytes.len(),
        }),
    }
}

pub fn error_response(err: &BridgeError) -> Value {
    json!({ "error": err.to_string() })
}

/// Proxies extension messages to the backend at one base URL.
#[derive(Debug, Clone)]
pub struct ExtensionBridge {
    transport: Transport,
}

impl ExtensionBridge {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub async fn handle(&self, msg: ExtensionMessage) -> Value {
        match msg {
            ExtensionMessage::CheckHealth => {
                json!({ "connected": self.transport.check_health().await })
            }
            ExtensionMessage::ApiRequest {
                method,
                endpoint,
                body,
                form_data,
            } => match self.proxy(method, &endpoint, body, form_data).await {
                Ok(decoded) => body_to_response(decoded),
                Err(e) => {
                    log::warn!("bridge {method} {endpoint} failed: {e}");
                    error_response(&e)
                }
            },
        }
    }

    async fn proxy(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        form_data: Option<Vec<FormEntry>>,
    ) -> Result<DecodedBody, BridgeError> {
        if !endpoint.starts_with('/') {
            return Err(BridgeError::InvalidMessage(format!(
                "endpoint must start with '/': {endpoint}"
            )));
        }

        // A form wins over a JSON body, the same way the extension builds fetch options.
        let payload = match (form_data, body) {
            (Some(entries), _) => {
                let form = entries
                    .into_iter()
                    .try_fold(FormData::new(), |form, entry| entry.into_part(form))?;
                RequestBody::Form(form)
            }
            (None, Some(Value::Null)) | (None, None) => RequestBody::None,
            (None, Some(v)) => RequestBody::Json(v),
        };

        Ok(self.transport.request(method, endpoint, payload).await?)
    }

    /// Parses one line of input and answers it. Malformed input gets an error object.
    pub async fn handle_line(&self, line: &str) -> Value {
        match serde_json::from_str::<ExtensionMessage>(line) {
            Ok(msg) => self.handle(msg).await,
            Err(e) => error_response(&BridgeError::InvalidMessage(e.to_string())),
        }
    }

    /// Serves newline-delimited JSON until `reader` is exhausted. Blank lines are skipped.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        let mut served = 0usize;
        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let response = self.handle_line(line).await;
            let mut out = serde_json::to_vec(&response)?;
            out.push(b'\n');
            writer.write_all(&out).await?;
            writer.flush().await?;
            served += 1;
        }
        log::info!("bridge input closed after {served} message(s)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_api_request_with_form_data() {
        let msg: ExtensionMessage = serde_json::from_str(
            r#"{"type":"API_REQUEST","method":"POST","endpoint":"/pdf/upload",
                "formData":[{"name":"file","fileName":"a.pdf","mimeType":"application/pdf","base64":"JVBERg=="},
                            {"name":"userId","value":"U1"}]}"#,
        )
        .unwrap();
        let ExtensionMessage::ApiRequest {
            method, form_data, ..
        } = msg
        else {
            panic!("expected API_REQUEST");
        };
        assert_eq!(method, Method::Post);
        let entries = form_data.unwrap();
        assert!(matches!(entries[0], FormEntry::File { .. }));
        assert!(matches!(entries[1], FormEntry::Text { .. }));
    }

    #[test]
    fn parses_check_health() {
        let msg: ExtensionMessage = serde_json::from_str(r#"{"type":"CHECK_HEALTH"}"#).unwrap();
        assert_eq!(msg, ExtensionMessage::CheckHealth);
    }

    #[test]
    fn decoded_bodies_map_to_response_shapes() {
        assert_eq!(
            body_to_response(DecodedBody::Json(json!({"status":"ok"}))),
            json!({"status":"ok"})
        );
        assert_eq!(
            body_to_response(DecodedBody::Text("<p>hi</p>".into())),
            json!({"text":"<p>hi</p>"})
        );
        assert_eq!(
            body_to_response(DecodedBody::Binary(b"%PDF".to_vec())),
            json!({"binary":"JVBERg==","size":4})
        );
    }

    #[test]
    fn bad_base64_is_reported_per_field() {
        let entry = FormEntry::File {
            name: "file".into(),
            file_name: "a.pdf".into(),
            mime_type: None,
            base64: "***".into(),
        };
        let err = entry.into_part(FormData::new()).unwrap_err();
        assert_eq!(err.to_string(), "form field file: invalid base64 content");
    }

    #[test]
    fn missing_mime_type_is_guessed_from_name() {
        let entry = FormEntry::File {
            name: "file".into(),
            file_name: "a.pdf".into(),
            mime_type: None,
            base64: "JVBERg==".into(),
        };
        let form = entry.into_part(FormData::new()).unwrap();
        assert!(matches!(
            &form.parts()[0],
            papercuts_providers::FormPart::File { mime_type, .. } if mime_type == "application/pdf"
        ));
    }
}
