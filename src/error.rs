//! Error types for ChromaFind
//!
//! Covers configuration, terminal, and search-backend failures.

use thiserror::Error;

/// Main error type for ChromaFind operations
#[derive(Error, Debug)]
pub enum ChromaFindError {
    #[error("Invalid backend URL '{0}': {1}")]
    InvalidBackendUrl(String, String),

    #[error("Failed to initialize HTTP client: {0}")]
    HttpInit(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    SearchError(#[from] SearchError),
}

/// Failure classes for a single search request.
///
/// `Service` means the backend answered but reported a failure; `Transport`
/// means it could not be reached or its body could not be read. Both carry
/// the user-facing message verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("{0}")]
    Service(String),

    #[error("{0}")]
    Transport(String),
}

/// Result type alias for ChromaFind operations
pub type Result<T> = std::result::Result<T, ChromaFindError>;
