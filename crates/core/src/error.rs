//! Error types for configuration loading.
//!
//! Uses `thiserror` for ergonomic error definitions. Every failure is a pure
//! data-validation failure detected while loading, so there is a single
//! taxonomy shared by the template compiler and the config loaders.

use thiserror::Error;

use crate::duration::DurationError;

/// The error type for all load-time operations.
///
/// Display strings are part of the external contract: callers and operators
/// match on them, so wording is kept stable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A malformed template value expression.
    #[error("{0}")]
    InvalidSyntax(String),

    /// A `*template` field naming a template the registry does not hold.
    #[error("no template with id: <{0}>")]
    TemplateNotFound(String),

    #[error("empty template with id: <{0}>")]
    EmptyTemplate(String),

    #[error("template reference cycle through id: <{0}>")]
    TemplateCycle(String),

    /// An unparsable duration string; displays exactly as the underlying
    /// duration error.
    #[error("{source}")]
    InvalidDuration { raw: String, source: DurationError },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type alias using our error.
pub type Result<T> = std::result::Result<T, ConfigError>;

impl ConfigError {
    /// Build an [`ConfigError::InvalidDuration`] keeping the raw input.
    pub fn invalid_duration(raw: &str, source: DurationError) -> Self {
        ConfigError::InvalidDuration {
            raw: raw.to_string(),
            source,
        }
    }
}

impl From<DurationError> for ConfigError {
    fn from(err: DurationError) -> Self {
        ConfigError::InvalidDuration {
            raw: err.input().to_string(),
            source: err,
        }
    }
}
