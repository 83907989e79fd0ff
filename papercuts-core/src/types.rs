use serde::{Deserialize, Serialize};

/// Opaque session identifier issued by the backend on upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SessionId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// Logical tag reported by the backend. The client carries it as data and does not
// enforce transitions between these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Uploaded,
    Analyzing,
    Analyzed,
    Optimizing,
    Complete,
    Error,
}

impl SessionStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Uploaded => "UPLOADED",
            Self::Analyzing => "ANALYZING",
            Self::Analyzed => "ANALYZED",
            Self::Optimizing => "OPTIMIZING",
            Self::Complete => "COMPLETE",
            Self::Error => "ERROR",
        }
    }

    /// True once the session has gone through at least one optimize call.
    pub fn is_past_analyzed(self) -> bool {
        matches!(self, Self::Optimizing | Self::Complete)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Original,
    Optimized,
}

impl ArtifactKind {
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Optimized => "optimized",
        }
    }
}
