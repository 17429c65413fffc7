use clap::Parser;
use log::info;

use docuscan::cli::{handle_ocr, Cli, Commands};
use docuscan::server;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
    load_env();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Ocr { file }) => actix_web::rt::System::new().block_on(handle_ocr(&file)),
        Some(Commands::Serve) | None => actix_web::rt::System::new().block_on(server::run()),
    }
}

fn load_env() {
    match dotenvy::dotenv() {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(_) => info!("No .env file found, using process environment"),
    }
}
