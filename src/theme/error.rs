//! Template engine error types

use thiserror::Error;

/// Template-specific errors
#[derive(Debug, Error)]
pub enum ThemeError {
    /// Embedded template is not valid UTF-8 or fails to parse
    #[error("Invalid template {name}: {reason}")]
    InvalidTemplate { name: String, reason: String },

    /// Template rendering error
    #[error("Template error: {0}")]
    TemplateError(String),
}
