//! Error types for configuration loading, validation and entry extraction

use std::path::PathBuf;
use thiserror::Error;
use validator::ValidationErrors;

/// Unified configuration error type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File not found error.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// Configuration validation error.
    #[error("Invalid configuration:\n{}", format_validation_errors(.0))]
    Validation(#[source] ValidationErrors),

    /// Figment parsing error.
    #[error("Configuration parsing error: {0}")]
    Parsing(#[from] figment::Error),

    /// A section has no `default` entry to merge overrides onto.
    #[error("Section `logging.{0}` has no `default` entry")]
    MissingDefault(&'static str),

    /// The merged entry is missing a key or holds a value of the wrong shape.
    #[error("Invalid entry `logging.{section}.{name}`: {source}")]
    Entry {
        section: &'static str,
        name: String,
        #[source]
        source: figment::Error,
    },

    /// A key only some entries need, e.g. `filename` on `file` handlers.
    #[error("Entry `logging.{section}.{name}` is missing `{key}`")]
    MissingKey {
        section: &'static str,
        name: String,
        key: &'static str,
    },
}

fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                let message = error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                format!("  logging.{field}: {message}")
            })
        })
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}
