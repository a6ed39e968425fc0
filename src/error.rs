//! Error types shared across the panel, its endpoint and durable storage.

use crate::panel::validation::ValidationError;
use thiserror::Error;

/// Failure reported by the preferences endpoint.
///
/// The backend only hands back a human-readable message, so callers treat
/// every variant as a generic transient failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("{0}")]
    Server(String),

    #[error("preferences service unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PanelError {
    /// Preferences are still loading or the load failed.
    #[error("preferences are not loaded yet")]
    NotReady,

    #[error("{0}")]
    Invalid(ValidationError),

    #[error("preferences panel has been unmounted")]
    Unmounted,
}
