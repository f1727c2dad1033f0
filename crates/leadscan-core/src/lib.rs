//! Shared domain types and configuration for the leadscan workspace.

pub mod app_config;
pub mod clock;
pub mod config;
pub mod content;
pub mod scan;
pub mod targets;

pub use app_config::{AppConfig, Environment};
pub use clock::{Clock, SystemClock};
pub use config::{load_app_config, load_app_config_from_env};
pub use content::{Engagement, Platform, RawContentItem};
pub use scan::{parse_scan_log, ScanResult, ScanTrigger, SourceReport};
pub use targets::{load_targets, ScanTargets, TargetsUpdate};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read targets file {path}: {source}")]
    TargetsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse targets file: {0}")]
    TargetsFileParse(#[from] serde_yaml::Error),

    #[error("invalid {platform} target {value:?}: {reason}")]
    InvalidTarget {
        platform: Platform,
        value: String,
        reason: String,
    },
}
