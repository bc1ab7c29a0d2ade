/// SNS Service Library
///
/// Social-feed backend: posts with images, likes, comments, follows and
/// profiles behind an HTTP JSON API. Callers authenticate with bearer tokens
/// from an external identity provider; data lives in PostgreSQL and images in
/// S3-compatible object storage.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and route table
/// - `services`: Business logic (aggregation, toggles, comments, media)
/// - `db`: Repository traits and PostgreSQL implementations
/// - `models`: Row and response types
/// - `storage`: Object storage seam
/// - `middleware`: Identity verification and request metrics
/// - `error` / `messages`: Error taxonomy and user-facing message table
/// - `config`: Configuration management
/// - `metrics`: Prometheus collectors
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod messages;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
