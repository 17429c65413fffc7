use anyhow::{Context, Result};
use base64::Engine;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    pub database_url: String,
    pub storage_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub gcp: GcpConfig,
}

/// Location of the Document AI processor handling recognition requests.
#[derive(Debug, Clone)]
pub struct GcpConfig {
    pub project_id: String,
    pub location: String,
    pub processor_id: String,
}

impl Default for Config {
    fn default() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        Self {
            host: host.clone(),
            port,
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| format!("http://{}:{}", host, port)),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:documents.db?mode=rwc".to_string()),
            storage_dir: PathBuf::from(
                std::env::var("STORAGE_DIR").unwrap_or_else(|_| "./storage".to_string()),
            ),
            upload_dir: PathBuf::from(
                std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./storage/.uploads".to_string()),
            ),
            gcp: GcpConfig {
                project_id: std::env::var("GCP_PROJECT_ID").unwrap_or_default(),
                location: std::env::var("GCP_LOCATION").unwrap_or_else(|_| "us".to_string()),
                processor_id: std::env::var("GCP_PROCESSOR_ID").unwrap_or_default(),
            },
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the service-account key file as an explicit startup step.
    ///
    /// `GCP_CREDENTIALS_B64` (a base64-encoded key blob) takes precedence and is
    /// written under the storage directory; otherwise the pre-existing file named
    /// by `GOOGLE_APPLICATION_CREDENTIALS` is used.
    pub fn materialize_credentials(&self) -> Result<PathBuf> {
        if let Ok(blob) = std::env::var("GCP_CREDENTIALS_B64") {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(blob.trim())
                .context("invalid base64 in GCP_CREDENTIALS_B64")?;
            std::fs::create_dir_all(&self.storage_dir)?;
            let key_path = self.storage_dir.join(".gcp-key.json");
            std::fs::write(&key_path, bytes)
                .with_context(|| format!("failed to write key file {:?}", key_path))?;
            log::info!("Materialized service-account key to {:?}", key_path);
            return Ok(key_path);
        }

        let path = std::env::var("GOOGLE_APPLICATION_CREDENTIALS")
            .context("neither GCP_CREDENTIALS_B64 nor GOOGLE_APPLICATION_CREDENTIALS is set")?;
        Ok(PathBuf::from(path))
    }
}
