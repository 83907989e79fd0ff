use serde::{Deserialize, Serialize};

pub const MAX_SAVER_LEVEL: u8 = 100;

/// Knobs sent with every optimize call. Not tied to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeSettings {
    pub ink_saver_level: u8,
    pub page_saver_level: u8,
    pub preserve_quality: bool,
    #[serde(default)]
    pub exclude_images: bool,
}

impl Default for OptimizeSettings {
    fn default() -> Self {
        Self {
            ink_saver_level: 50,
            page_saver_level: 50,
            preserve_quality: true,
            exclude_images: false,
        }
    }
}

impl OptimizeSettings {
    pub fn clamped(self) -> Self {
        Self {
            ink_saver_level: self.ink_saver_level.min(MAX_SAVER_LEVEL),
            page_saver_level: self.page_saver_level.min(MAX_SAVER_LEVEL),
            ..self
        }
    }

    pub fn with_ink_saver_level(mut self, level: u8) -> Self {
        self.ink_saver_level = level.min(MAX_SAVER_LEVEL);
        self
    }

    pub fn with_page_saver_level(mut self, level: u8) -> Self {
        self.page_saver_level = level.min(MAX_SAVER_LEVEL);
        self
    }

    pub fn with_preserve_quality(mut self, value: bool) -> Self {
        self.preserve_quality = value;
        self
    }

    pub fn with_exclude_images(mut self, value: bool) -> Self {
        self.exclude_images = value;
        self
    }
}
