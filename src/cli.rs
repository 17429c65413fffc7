use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use std::path::Path;

use crate::config::Config;
use crate::services::{
    DocumentAiProvider, Normalizer, OcrProvider, ServiceAccountKey, TempFiles,
};

#[derive(Parser)]
#[command(name = "docuscan")]
#[command(author, version, about = "OCR upload service generating .docx documents", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve,

    /// Run the normalize + recognize pipeline on a local file and print the text
    Ocr {
        /// Path to an image or document file
        file: String,
    },
}

pub async fn handle_ocr(file: &str) -> Result<()> {
    let config = Config::new();

    let normalizer = Normalizer::new(config.upload_dir.clone());
    let normalized = normalizer.normalize(Path::new(file))?;

    let mut temp = TempFiles::new();
    for derived in &normalized.derived {
        temp.push(derived.clone());
    }

    let key_path = config.materialize_credentials()?;
    let key = ServiceAccountKey::from_file(&key_path).map_err(|e| anyhow!("{}", e))?;
    let provider = DocumentAiProvider::new(key, config.gcp.clone());

    let bytes = std::fs::read(&normalized.path)?;
    let outcome = provider
        .recognize(bytes)
        .await
        .map_err(|e| anyhow!("{}", e))?;

    println!("{}", outcome.text);
    Ok(())
}
