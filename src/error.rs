//! Error types for the Usergrid client
//!
//! Errors in this module never cross the `RequestExecutor` boundary: the
//! executor folds every one of them into a failure `Response`. They surface
//! directly only from configuration loading, descriptor rendering and the CLI.

use thiserror::Error;

/// The main error type for the Usergrid client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Request Construction Errors
    // ============================================================================
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to serialize request body: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    // ============================================================================
    // Authentication Errors
    // ============================================================================
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create an invalid URL error for the composed string
    pub fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            source,
        }
    }

    /// Short machine-readable name, used as the `error` field of failure responses
    pub fn name(&self) -> &'static str {
        match self {
            Error::InvalidUrl { .. } => "invalid_url",
            Error::JsonParse(_) => "serialization_error",
            Error::Http(e) if e.is_timeout() => "timeout",
            Error::Http(e) if e.is_connect() => "connection_error",
            Error::Http(_) => "transport_error",
            Error::Timeout { .. } => "timeout",
            Error::Auth { .. } => "auth_error",
            Error::Config { .. } | Error::YamlParse(_) => "config_error",
            Error::Io(_) => "io_error",
            Error::Other(_) => "error",
        }
    }
}

/// Result type alias for the Usergrid client
pub type Result<T> = std::result::Result<T, Error>;
