// src/constants.rs

// Image formats converted to JPEG before OCR
pub const CONVERTIBLE_EXTENSIONS: &[&str] = &["heic", "heif", "png", "tif", "tiff", "gif"];

// Normalization thresholds
pub const MAX_OCR_FILE_BYTES: u64 = 20 * 1024 * 1024;
pub const MAX_IMAGE_WIDTH: u32 = 2000;
pub const JPEG_QUALITY: u8 = 90;

// MIME type sent to the recognition service
pub const OCR_MIME_TYPE: &str = "image/jpeg";

// Document styling (fixed, not user-configurable)
pub const FONT_SIZE_HALF_POINTS: usize = 24; // 12pt
pub const PARAGRAPH_SPACING_AFTER: u32 = 200;
pub const BOLD_LANGUAGE_CONFIDENCE: f64 = 0.9;

// Generated document naming
pub const DISPLAY_NAME_PREFIX: &str = "document_";
pub const DISPLAY_NAME_DATE_FORMAT: &str = "%d.%m.%y";

// Google OAuth endpoints for the Document AI call
pub const GCP_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const GCP_OAUTH_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";
