use std::path::PathBuf;

use lumber_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Unknown severity: {0}")]
    UnknownSeverity(String),

    #[error("Invalid handler type: {0}")]
    InvalidHandlerType(String),

    #[error("Invalid format template `{template}`: {reason}")]
    InvalidFormat { template: String, reason: String },

    #[error("Invalid date format `{0}`")]
    InvalidDateFormat(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to create log directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open log file {}: {source}", .path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
