use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::TryStreamExt;
use log::{error, info};
use uuid::Uuid;

use crate::config::Config;
use crate::constants::{DISPLAY_NAME_DATE_FORMAT, DISPLAY_NAME_PREFIX};
use crate::error::{AppError, AppResult};
use crate::models::UploadResponse;
use crate::services::{DocumentStore, DocxBuilder, Normalizer, OcrProvider, TempFiles, UploadService};

/// POST /ocr: receive one multipart upload, normalize it, run recognition,
/// emit a .docx into the storage directory and persist the metadata record.
pub async fn upload_ocr(
    mut payload: Multipart,
    config: web::Data<Config>,
    store: web::Data<DocumentStore>,
    provider: web::Data<dyn OcrProvider>,
) -> AppResult<HttpResponse> {
    let mut upload: Option<(String, Vec<u8>)> = None;
    let mut user_id: Option<String> = None;

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or("upload")
            .to_string();

        let mut data = Vec::new();
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {}", e)))?
        {
            data.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "file" => upload = Some((filename, data)),
            "userId" => user_id = Some(String::from_utf8_lossy(&data).trim().to_string()),
            _ => {}
        }
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;
    let user_id = user_id
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Missing userId".to_string()))?;

    // Guard covers the saved upload and every derived artifact on all exit paths.
    let mut temp = TempFiles::new();

    let uploads = UploadService::new(config.upload_dir.clone());
    let saved = uploads.save(&filename, &bytes)?;
    temp.push(saved.clone());

    let normalizer = Normalizer::new(config.upload_dir.clone());
    let normalized = web::block(move || normalizer.normalize(&saved))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    for derived in &normalized.derived {
        temp.push(derived.clone());
    }

    let payload_bytes = std::fs::read(&normalized.path)?;
    info!(
        "Running OCR via {} on {:?} ({} bytes)",
        provider.provider_id(),
        normalized.path,
        payload_bytes.len()
    );
    let ocr = provider.recognize(payload_bytes).await.map_err(|e| {
        error!("OCR error: {}", e);
        AppError::Ocr(e.0)
    })?;

    let docx_bytes = DocxBuilder::new().build(&ocr)?;

    std::fs::create_dir_all(&config.storage_dir)?;
    let file_name = format!("{}.docx", Uuid::new_v4());
    std::fs::write(config.storage_dir.join(&file_name), &docx_bytes)?;

    let display_name = format!(
        "{}{}",
        DISPLAY_NAME_PREFIX,
        chrono::Local::now().format(DISPLAY_NAME_DATE_FORMAT)
    );
    let url = format!("{}/files/{}", config.base_url, file_name);

    let text = (!ocr.text.is_empty()).then_some(ocr.text.as_str());
    let record = store
        .create(&user_id, &display_name, &url, text)
        .await
        .map_err(|e| {
            error!("Failed to persist document record: {}", e);
            AppError::Internal(e.to_string())
        })?;

    Ok(HttpResponse::Created().json(UploadResponse {
        text: ocr.text.clone(),
        docx_url: url,
        document: record,
    }))
}
