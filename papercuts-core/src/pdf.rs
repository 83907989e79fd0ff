use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::settings::OptimizeSettings;
use crate::types::{SessionId, SessionStatus};

pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// One PDF's journey through upload, analyze and optimize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfSession {
    pub id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub original_file_name: String,

    // Baseline, fixed at analyze time.
    #[serde(default, deserialize_with = "null_as_default")]
    pub pages_before: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ink_before: f64,

    // Overwritten by every optimize call.
    #[serde(default)]
    pub pages_after: Option<u32>,
    #[serde(default)]
    pub ink_after: Option<f64>,

    #[serde(default)]
    pub optimizing_score: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggestions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub changes_applied: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ink_saver_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_saver_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preserve_quality: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude_images: Option<bool>,

    pub status: SessionStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl PdfSession {
    /// Composes the client-side session from the upload and analyze round trips.
    pub fn from_analysis(upload: &UploadResponse, analysis: AnalysisResult) -> Self {
        Self {
            id: upload.session_id.clone(),
            user_id: None,
            original_file_name: upload.original_file_name.clone(),
            pages_before: analysis.pages_before,
            ink_before: analysis.ink_before,
            pages_after: None,
            ink_after: None,
            optimizing_score: Some(analysis.optimizing_score),
            suggestions: analysis.recommendations,
            changes_applied: vec![],
            ink_saver_level: None,
            page_saver_level: None,
            preserve_quality: None,
            exclude_images: None,
            status: SessionStatus::Analyzed,
            created_at: Some(Utc::now()),
            expires_at: None,
        }
    }

    pub fn applied_settings(&self) -> Option<OptimizeSettings> {
        let defaults = OptimizeSettings::default();
        Some(OptimizeSettings {
            ink_saver_level: self.ink_saver_level?,
            page_saver_level: self.page_saver_level?,
            preserve_quality: self.preserve_quality.unwrap_or(defaults.preserve_quality),
            exclude_images: self.exclude_images.unwrap_or(defaults.exclude_images),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub session_id: SessionId,
    pub original_file_name: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatedSavings {
    #[serde(default)]
    pub pages: i64,
    #[serde(default)]
    pub ink_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub diagnosis: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub recommendations: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub estimated_savings: EstimatedSavings,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ink_before: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub pages_before: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub optimizing_score: u32,
}

impl Default for EstimatedSavings {
    fn default() -> Self {
        Self {
            pages: 0,
            ink_percent: 0.0,
        }
    }
}

/// A file picked by the user. Read-only; dropped once the upload call returns.
#[derive(Clone, PartialEq, Eq)]
pub struct PdfFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for PdfFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl PdfFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Builds a file handle, guessing the MIME type from the extension.
    pub fn from_name_and_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = guess_mime_type(&file_name).to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

pub fn guess_mime_type(file_name: &str) -> &'static str {
    if file_name.to_ascii_lowercase().ends_with(".pdf") {
        PDF_MIME_TYPE
    } else {
        "application/octet-stream"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("File size exceeds 50MB limit ({size} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("File must be a PDF (got {mime_type})")]
    NotPdf { mime_type: String },
}

/// Client-side checks that run before any network call.
pub fn validate_upload(file: &PdfFile) -> Result<(), UploadRejection> {
    if file.size() > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge {
            size: file.size(),
            limit: MAX_UPLOAD_BYTES,
        });
    }

    if !file.mime_type.eq_ignore_ascii_case(PDF_MIME_TYPE) {
        return Err(UploadRejection::NotPdf {
            mime_type: file.mime_type.clone(),
        });
    }

    Ok(())
}

fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}
