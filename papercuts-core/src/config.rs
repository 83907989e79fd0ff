use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "http://localhost:8080/api";
pub const ENV_API_URL: &str = "PAPERCUTS_API_URL";
pub const ENV_USE_MOCK: &str = "PAPERCUTS_USE_MOCK";

/// Resolved once at startup; mode never changes mid-session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base: String,
    #[serde(default)]
    pub use_mock: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.into(),
            use_mock: false,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().with_overrides(lookup)
    }

    /// Applies env-style overrides on top of `self`. Unset or blank values keep the
    /// current setting.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup(ENV_API_URL).filter(|s| !s.trim().is_empty()) {
            self.api_base = base.trim().to_string();
        }
        if let Some(flag) = lookup(ENV_USE_MOCK).filter(|s| !s.trim().is_empty()) {
            self.use_mock = parse_flag(&flag);
        }
        self
    }

    pub fn mode_label(&self) -> &'static str {
        if self.use_mock { "mock" } else { "live" }
    }
}

pub fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
