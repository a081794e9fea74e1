use std::env::VarError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVarError(#[from] VarError),

    /// A required variable is absent or blank.
    #[error("Missing required setting: {0}")]
    Missing(String),

    /// A variable is present but could not be parsed into its target type.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Values parsed fine but are unusable together or out of range.
    #[error("Invalid setting: {0}")]
    Invalid(String),
}
