//! Shared configuration and search-result types for revpost.

pub mod app_config;
pub mod config;
pub mod search;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use search::{ImageHit, SearchHit, SearchKind, SearchResults};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
