//! Error types for loading data and configuring views.
//!
//! Operations on a loaded view never fail; these errors only come from the
//! outer edges where text is parsed into payloads, rows or configuration.

use std::path::PathBuf;

/// Result type alias for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors that can occur while parsing grid input.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// Payload JSON could not be parsed.
    #[error("Invalid payload: {0}")]
    Payload(#[from] serde_json::Error),

    /// CSV reading error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Table markup error.
    #[error("Markup error at byte {position}: {message}")]
    Markup { message: String, position: u64 },

    /// Configuration text could not be parsed.
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration parsed but holds an unusable value.
    #[error("Invalid value for config key '{key}': {message}")]
    InvalidConfig { key: String, message: String },

    /// File I/O error.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A data type name that is not built in.
    #[error("Unknown data type '{0}'")]
    UnknownDataType(String),

    /// A view name that is already registered.
    #[error("A view named '{0}' is already registered")]
    NameConflict(String),
}

impl GridError {
    /// Create a markup error.
    pub fn markup(message: impl Into<String>, position: u64) -> Self {
        Self::Markup {
            message: message.into(),
            position,
        }
    }

    /// Create a configuration validation error.
    pub fn invalid_config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an unknown data type error.
    pub fn unknown_data_type(name: impl Into<String>) -> Self {
        Self::UnknownDataType(name.into())
    }

    /// Create a registry name conflict error.
    pub fn name_conflict(name: impl Into<String>) -> Self {
        Self::NameConflict(name.into())
    }
}
