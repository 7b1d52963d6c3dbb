use std::path::PathBuf;
use thiserror::Error;

/// The main error type for flightshelf operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset not found: {id}")]
    NotFound { id: String },

    #[error("Dataset id '{id}' escapes the repository root")]
    TraversalRejected { id: String },

    #[error("Invalid dataset id '{id}': {message}")]
    InvalidId { id: String, message: String },

    #[error("Invalid ticket: {0}")]
    InvalidTicket(String),

    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Failed to read schema from {path}: {message}")]
    Schema { path: PathBuf, message: String },

    #[error("Failed to read batch from {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to render JSON output: {0}")]
    JsonOutput(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote call failed: {0}")]
    Remote(String),
}

impl From<CatalogError> for tonic::Status {
    fn from(error: CatalogError) -> Self {
        let message = error.to_string();
        match error {
            CatalogError::NotFound { .. } => tonic::Status::not_found(message),
            CatalogError::TraversalRejected { .. } => tonic::Status::permission_denied(message),
            CatalogError::InvalidId { .. }
            | CatalogError::InvalidTicket(_)
            | CatalogError::InvalidDescriptor(_) => tonic::Status::invalid_argument(message),
            CatalogError::Schema { .. } => tonic::Status::failed_precondition(message),
            CatalogError::Io(_)
            | CatalogError::Read { .. }
            | CatalogError::JsonOutput(_)
            | CatalogError::Config(_)
            | CatalogError::Transport(_)
            | CatalogError::Remote(_) => tonic::Status::internal(message),
        }
    }
}
