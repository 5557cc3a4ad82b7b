pub mod app_config;
pub mod config;
pub mod keywords;
pub mod search_settings;
pub mod stores;

pub use app_config::{AppConfig, Environment, NaverCredentials};
pub use config::{load_app_config, load_app_config_from_env};
pub use keywords::{validate_keywords, validate_single_keyword, KeywordError};
pub use search_settings::{FailurePolicy, SearchSettings, SortStrategy};
pub use stores::{StoreAggregate, StoreMap, StoreProduct};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("invalid search setting {field}: {reason}")]
    InvalidSetting { field: &'static str, reason: String },
}
