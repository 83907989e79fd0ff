use papercuts_core::pdf::UploadRejection;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Rejected locally; never reached the network.
    #[error(transparent)]
    Rejected(#[from] UploadRejection),

    /// Non-success HTTP response. Display is exactly the normalized server message.
    #[error("{message}")]
    Request { status: u16, message: String },

    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub(crate) fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            return Self::Network("request timed out".into());
        }
        if e.is_builder() {
            return Self::InvalidRequest(describe(e));
        }
        Self::Network(describe(e))
    }
}

// reqwest's Display hides the root cause (e.g. "connection refused").
fn describe(e: &reqwest::Error) -> String {
    let mut out = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(s) = source {
        out.push_str(": ");
        out.push_str(&s.to_string());
        source = s.source();
    }
    out
}
