use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub struct OcrError(pub String);

impl fmt::Display for OcrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OcrError: {}", self.0)
    }
}

impl Error for OcrError {}

/// One row per generated output document, scoped by the caller-supplied owner id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub name: String,
    pub url: String,
    pub text: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

// === OCR result (transient, derived from the Document AI response) ===

#[derive(Debug, Clone, Default)]
pub struct OcrOutcome {
    pub text: String,
    pub pages: Vec<OcrPage>,
}

#[derive(Debug, Clone, Default)]
pub struct OcrPage {
    pub paragraphs: Vec<OcrParagraph>,
}

#[derive(Debug, Clone, Default)]
pub struct OcrParagraph {
    pub segments: Vec<OcrSegment>,
    /// Confidence of the first detected language, when the service reports one.
    pub language_confidence: Option<f64>,
}

/// Character range into the OCR full text.
#[derive(Debug, Clone, Copy, Default)]
pub struct OcrSegment {
    pub start: usize,
    pub end: usize,
}

// === Request/response DTOs ===

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub text: String,
    #[serde(rename = "docxUrl")]
    pub docx_url: String,
    pub document: DocumentRecord,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}
