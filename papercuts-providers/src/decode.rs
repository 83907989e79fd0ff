use serde::de::DeserializeOwned;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Json,
    Text,
    Binary,
}

/// Picks a decode strategy from a Content-Type header value.
pub fn classify_content_type(content_type: Option<&str>) -> BodyKind {
    let Some(raw) = content_type else {
        return BodyKind::Binary;
    };
    let mime = raw
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if mime == "application/json" || mime.ends_with("+json") {
        BodyKind::Json
    } else if mime.starts_with("text/") {
        BodyKind::Text
    } else {
        BodyKind::Binary
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodedBody {
    Json(serde_json::Value),
    Text(String),
    Binary(Vec<u8>),
}

impl DecodedBody {
    pub fn kind(&self) -> BodyKind {
        match self {
            Self::Json(_) => BodyKind::Json,
            Self::Text(_) => BodyKind::Text,
            Self::Binary(_) => BodyKind::Binary,
        }
    }

    pub fn into_json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let decoded = match self {
            Self::Json(v) => serde_json::from_value(v),
            // Some servers omit or mislabel the content type on JSON bodies.
            Self::Text(s) => serde_json::from_str(&s),
            Self::Binary(b) => serde_json::from_slice(&b),
        };
        decoded.map_err(|e| ApiError::Decode(format!("decode JSON: {e}")))
    }

    pub fn into_text(self) -> Result<String, ApiError> {
        match self {
            Self::Text(s) => Ok(s),
            Self::Json(v) => Ok(v.to_string()),
            Self::Binary(b) => {
                String::from_utf8(b).map_err(|e| ApiError::Decode(format!("decode text: {e}")))
            }
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Binary(b) => b,
            Self::Text(s) => s.into_bytes(),
            Self::Json(v) => v.to_string().into_bytes(),
        }
    }
}

pub fn decode_body(kind: BodyKind, body: Vec<u8>) -> Result<DecodedBody, ApiError> {
    if body.is_empty() {
        return Ok(DecodedBody::Binary(body));
    }

    match kind {
        BodyKind::Json => serde_json::from_slice(&body)
            .map(DecodedBody::Json)
            .map_err(|e| ApiError::Decode(format!("decode JSON: {e}"))),
        BodyKind::Text => Ok(DecodedBody::Text(String::from_utf8_lossy(&body).into_owned())),
        BodyKind::Binary => Ok(DecodedBody::Binary(body)),
    }
}

/// Human-readable message for a failed response: the body's `error` field, else its
/// `message` field, else `HTTP <status>`.
pub fn error_message(status: u16, body: &[u8]) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_slice(body).ok();
    parsed
        .as_ref()
        .and_then(|v| non_empty_str(v, "error").or_else(|| non_empty_str(v, "message")))
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"))
}

fn non_empty_str<'a>(v: &'a serde_json::Value, key: &str) -> Option<&'a str> {
    v.get(key)
        .and_then(|f| f.as_str())
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_content_types() {
        assert_eq!(
            classify_content_type(Some("application/json; charset=utf-8")),
            BodyKind::Json
        );
        assert_eq!(
            classify_content_type(Some("application/problem+json")),
            BodyKind::Json
        );
        assert_eq!(classify_content_type(Some("text/html;charset=UTF-8")), BodyKind::Text);
        assert_eq!(classify_content_type(Some("TEXT/PLAIN")), BodyKind::Text);
        assert_eq!(classify_content_type(Some("application/pdf")), BodyKind::Binary);
        assert_eq!(classify_content_type(None), BodyKind::Binary);
    }

    #[test]
    fn prefers_error_then_message_then_status() {
        assert_eq!(error_message(500, br#"{"error":"disk full"}"#), "disk full");
        assert_eq!(
            error_message(400, br#"{"message":"bad settings","error":""}"#),
            "bad settings"
        );
        assert_eq!(error_message(502, b"<html>bad gateway</html>"), "HTTP 502");
        assert_eq!(error_message(404, b""), "HTTP 404");
        assert_eq!(error_message(500, br#"{"error":{"code":1}}"#), "HTTP 500");
    }

    #[test]
    fn empty_body_decodes_as_empty_binary() {
        let d = decode_body(BodyKind::Json, vec![]).unwrap();
        assert_eq!(d, DecodedBody::Binary(vec![]));
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let e = decode_body(BodyKind::Json, b"{nope".to_vec()).unwrap_err();
        assert!(matches!(e, ApiError::Decode(_)));
    }

    #[test]
    fn text_bodies_can_still_be_read_as_json() {
        #[derive(serde::Deserialize)]
        struct Flag {
            ok: bool,
        }
        let d = decode_body(BodyKind::Text, br#"{"ok":true}"#.to_vec()).unwrap();
        assert_eq!(d.kind(), BodyKind::Text);
        assert!(d.into_json::<Flag>().unwrap().ok);
    }
}
