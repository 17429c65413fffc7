pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod models;
pub mod server;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};
