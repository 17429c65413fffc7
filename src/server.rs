use actix_files::Files;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::{anyhow, Result};
use log::info;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::handlers;
use crate::services::{DocumentAiProvider, DocumentStore, OcrProvider, ServiceAccountKey};

pub async fn run() -> Result<()> {
    let config = Config::new();
    let host = config.host.clone();
    let port = config.port;

    print_banner(&host, port);
    info!("Server running at http://{}:{}/", host, port);

    let startup_time = Instant::now();

    std::fs::create_dir_all(&config.storage_dir)?;
    std::fs::create_dir_all(&config.upload_dir)?;

    let key_path = config.materialize_credentials()?;
    let key = ServiceAccountKey::from_file(&key_path).map_err(|e| anyhow!("{}", e))?;
    let provider: Arc<dyn OcrProvider> = Arc::new(DocumentAiProvider::new(key, config.gcp.clone()));
    let provider_data = web::Data::from(provider);

    let store = DocumentStore::new(&config.database_url).await?;
    let storage_dir = config.storage_dir.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::new(store.clone()))
            .app_data(provider_data.clone())
            .route("/", web::get().to(handlers::index))
            .route("/healthz", web::get().to(handlers::healthz))
            .route("/ocr", web::post().to(handlers::upload_ocr))
            .route("/documents", web::get().to(handlers::list_documents))
            .route("/documents/{id}", web::patch().to(handlers::rename_document))
            .route("/documents/{id}", web::delete().to(handlers::delete_document))
            .service(Files::new("/files", storage_dir.clone()))
    })
    .bind((host, port))?
    .run()
    .await?;

    info!("Server stopped. Uptime: {:?}", startup_time.elapsed());
    Ok(())
}

fn print_banner(host: &str, port: u16) {
    let banner = r#"
     _
  __| | ___   ___ _   _ ___  ___ __ _ _ __
 / _` |/ _ \ / __| | | / __|/ __/ _` | '_ \
| (_| | (_) | (__| |_| \__ \ (_| (_| | | | |
 \__,_|\___/ \___|\__,_|___/\___\__,_|_| |_|
"#;
    println!("{}", banner);
    println!("         docuscan server started at: http://{}:{}\n", host, port);
}
