use crate::config::GcpConfig;
use crate::constants::{GCP_OAUTH_SCOPE, GCP_TOKEN_URL, OCR_MIME_TYPE};
use crate::models::{OcrError, OcrOutcome, OcrPage, OcrParagraph, OcrSegment};
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

#[async_trait]
pub trait OcrProvider: Send + Sync {
    async fn recognize(&self, bytes: Vec<u8>) -> Result<OcrOutcome, OcrError>;
    fn provider_id(&self) -> &'static str;
}

/// Service-account key fields needed to mint an access token.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
}

impl ServiceAccountKey {
    pub fn from_file(path: &Path) -> Result<Self, OcrError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| OcrError(format!("Failed to read key file {:?}: {}", path, e)))?;
        serde_json::from_str(&data)
            .map_err(|e| OcrError(format!("Failed to parse key file {:?}: {}", path, e)))
    }
}

pub struct DocumentAiProvider {
    key: ServiceAccountKey,
    config: GcpConfig,
}

impl DocumentAiProvider {
    pub fn new(key: ServiceAccountKey, config: GcpConfig) -> Self {
        Self { key, config }
    }

    fn process_url(&self) -> String {
        format!(
            "https://{loc}-documentai.googleapis.com/v1/projects/{project}/locations/{loc}/processors/{processor}:process",
            loc = self.config.location,
            project = self.config.project_id,
            processor = self.config.processor_id,
        )
    }

    async fn fetch_access_token(&self, client: &reqwest::Client) -> Result<String, OcrError> {
        #[derive(serde::Serialize)]
        struct Claims<'a> {
            iss: &'a str,
            scope: &'a str,
            aud: &'a str,
            iat: i64,
            exp: i64,
        }

        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: GCP_OAUTH_SCOPE,
            aud: GCP_TOKEN_URL,
            iat: now,
            exp: now + 3600,
        };

        let encoding_key = jsonwebtoken::EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| OcrError(format!("Invalid service-account private key: {}", e)))?;
        let assertion = jsonwebtoken::encode(
            &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256),
            &claims,
            &encoding_key,
        )
        .map_err(|e| OcrError(format!("Failed to sign token request: {}", e)))?;

        let resp = client
            .post(GCP_TOKEN_URL)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| OcrError(format!("Token request failed: {}", e)))?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| OcrError(format!("Failed to read token response: {}", e)))?;

        if !status.is_success() {
            return Err(OcrError(format!(
                "Token exchange failed, status: {}, body: {}",
                status, body
            )));
        }

        body.get("access_token")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| OcrError("Token response has no access_token".to_string()))
    }
}

#[async_trait]
impl OcrProvider for DocumentAiProvider {
    async fn recognize(&self, bytes: Vec<u8>) -> Result<OcrOutcome, OcrError> {
        let client = reqwest::Client::new();
        let token = self.fetch_access_token(&client).await?;

        let request_body = serde_json::json!({
            "rawDocument": {
                "content": base64::engine::general_purpose::STANDARD.encode(&bytes),
                "mimeType": OCR_MIME_TYPE,
            }
        });

        let resp = client
            .post(self.process_url())
            .bearer_auth(&token)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| OcrError(format!("Failed to send request: {}", e)))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| OcrError(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(OcrError(format!(
                "Failed to perform OCR, status: {}, body: {}",
                status, text
            )));
        }

        let payload: Value = serde_json::from_str(&text)
            .map_err(|e| OcrError(format!("Failed to parse response: {}", e)))?;

        Ok(parse_document(&payload))
    }

    fn provider_id(&self) -> &'static str {
        "documentai"
    }
}

/// Map the raw `:process` response into the page/paragraph/segment shape the
/// document builder walks. No validation or confidence filtering is applied.
pub fn parse_document(payload: &Value) -> OcrOutcome {
    let document = payload.get("document").unwrap_or(payload);

    let text = document
        .get("text")
        .and_then(|t| t.as_str())
        .unwrap_or_default()
        .to_string();

    let pages = document
        .get("pages")
        .and_then(|p| p.as_array())
        .map(|pages| pages.iter().map(parse_page).collect())
        .unwrap_or_default();

    OcrOutcome { text, pages }
}

fn parse_page(page: &Value) -> OcrPage {
    let paragraphs = page
        .get("paragraphs")
        .and_then(|p| p.as_array())
        .map(|paragraphs| paragraphs.iter().map(parse_paragraph).collect())
        .unwrap_or_default();

    OcrPage { paragraphs }
}

fn parse_paragraph(paragraph: &Value) -> OcrParagraph {
    let segments = paragraph
        .pointer("/layout/textAnchor/textSegments")
        .and_then(|s| s.as_array())
        .map(|segments| {
            segments
                .iter()
                .map(|segment| OcrSegment {
                    start: index_value(segment.get("startIndex")),
                    end: index_value(segment.get("endIndex")),
                })
                .collect()
        })
        .unwrap_or_default();

    let language_confidence = paragraph
        .pointer("/detectedLanguages/0/confidence")
        .and_then(|c| c.as_f64());

    OcrParagraph {
        segments,
        language_confidence,
    }
}

// Document AI encodes int64 offsets as JSON strings; absent means 0.
fn index_value(value: Option<&Value>) -> usize {
    match value {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0) as usize,
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_process_response_with_string_indices() {
        let payload = serde_json::json!({
            "document": {
                "text": "Hello world",
                "pages": [{
                    "paragraphs": [{
                        "layout": {
                            "textAnchor": {
                                "textSegments": [
                                    { "endIndex": "5" },
                                    { "startIndex": "6", "endIndex": "11" }
                                ]
                            }
                        },
                        "detectedLanguages": [
                            { "languageCode": "en", "confidence": 0.97 }
                        ]
                    }]
                }]
            }
        });

        let outcome = parse_document(&payload);
        assert_eq!(outcome.text, "Hello world");
        assert_eq!(outcome.pages.len(), 1);

        let paragraph = &outcome.pages[0].paragraphs[0];
        assert_eq!(paragraph.segments.len(), 2);
        assert_eq!(paragraph.segments[0].start, 0);
        assert_eq!(paragraph.segments[0].end, 5);
        assert_eq!(paragraph.segments[1].start, 6);
        assert_eq!(paragraph.segments[1].end, 11);
        assert_eq!(paragraph.language_confidence, Some(0.97));
    }

    #[test]
    fn empty_response_yields_empty_outcome() {
        let outcome = parse_document(&serde_json::json!({ "document": {} }));
        assert_eq!(outcome.text, "");
        assert!(outcome.pages.is_empty());
    }

    #[test]
    fn numeric_indices_are_accepted_too() {
        let payload = serde_json::json!({
            "document": {
                "text": "ab",
                "pages": [{
                    "paragraphs": [{
                        "layout": {
                            "textAnchor": {
                                "textSegments": [{ "startIndex": 0, "endIndex": 2 }]
                            }
                        }
                    }]
                }]
            }
        });

        let outcome = parse_document(&payload);
        let segment = outcome.pages[0].paragraphs[0].segments[0];
        assert_eq!((segment.start, segment.end), (0, 2));
        assert_eq!(outcome.pages[0].paragraphs[0].language_confidence, None);
    }
}
