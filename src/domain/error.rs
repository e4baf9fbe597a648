//! Error types shared by every layer of the crate.

use thiserror::Error;

/// Top-level application error
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Service(#[from] ServiceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Request already in progress: {operation} ({key})")]
    InFlight { operation: String, key: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

impl AppError {
    /// The underlying cause, without the layer prefix added by `Display`.
    ///
    /// Returns `None` when the cause carries no usable message.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        let detail = match self {
            Self::Transport(e) => e.detail(),
            Self::Validation(e) => e.to_string(),
            Self::Storage(e) => e.to_string(),
            Self::Service(e) => e.message.to_string(),
            Self::Config(e) => e.to_string(),
            Self::InFlight { .. } => "Request already in progress".to_string(),
            Self::Cancelled => "Operation cancelled".to_string(),
            Self::NotSupported(msg) => msg.clone(),
        };
        let trimmed = detail.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Whether this error is a cancellation rather than a failure
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Failures raised by API clients while talking to the backend
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("HTTP {status_code}: {message}")]
    Http { status_code: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(String),
}

impl TransportError {
    fn detail(&self) -> String {
        match self {
            Self::Network(msg) | Self::Timeout(msg) | Self::Decode(msg) => msg.clone(),
            Self::Http { message, .. } => message.clone(),
        }
    }
}

/// Input or schema validation failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid field '{field}': {message}")]
    InvalidField { field: String, message: String },

    #[error("Validation failed: {0}")]
    Multiple(String),

    #[error("Duplicate balance entry for currency '{0}'")]
    DuplicateCurrency(String),
}

/// Key-value storage failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Failed to store value for '{0}'")]
    Write(String),

    #[error("Failed to read value for '{0}'")]
    Read(String),

    #[error("Failed to remove value for '{0}'")]
    Remove(String),

    #[error("Failed to clear storage: {0}")]
    Wipe(String),

    #[error("Encryption failure: {0}")]
    Encryption(String),

    #[error("Backend failure: {0}")]
    Backend(String),
}

/// A user-safe service failure with a fixed message
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("{message}")]
pub struct ServiceError {
    pub operation: &'static str,
    pub message: &'static str,
}

impl ServiceError {
    #[must_use]
    pub const fn new(operation: &'static str, message: &'static str) -> Self {
        Self { operation, message }
    }
}

/// Configuration loading failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required variable: {0}")]
    Missing(String),

    #[error("Invalid value for {name}: {message}")]
    Invalid { name: String, message: String },
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Multiple(errors.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.into())
    }
}
