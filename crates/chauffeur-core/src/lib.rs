pub mod app_config;
pub mod config;
pub mod place;
pub mod pricing;
pub mod pricing_file;
pub mod service;
pub mod settings;

pub use app_config::{AppConfig, EmailJsConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use place::{LatLng, Place};
pub use pricing::{
    estimate_by_duration, estimate_by_route, parse_quantity, PricingTable, RouteRates,
};
pub use pricing_file::load_pricing;
pub use service::ServiceType;
pub use settings::{is_probably_api_key, resolve_api_key, Settings, SettingsStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read pricing file {path}: {source}")]
    PricingFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pricing file: {0}")]
    PricingFileParse(#[from] serde_yaml::Error),

    #[error("failed to access settings file {path}: {source}")]
    SettingsIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse settings file {path}: {source}")]
    SettingsParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("validation error: {0}")]
    Validation(String),
}
