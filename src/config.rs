//! Runtime configuration.
//!
//! The backend address is the one deployment-specific value: it defaults to
//! [`DEFAULT_BACKEND_URL`] and can be overridden on the command line or via
//! the `CHROMAFIND_BACKEND` environment variable.

use std::path::PathBuf;

use crate::error::{ChromaFindError, Result};

/// Default address of the search backend
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the ChromaDB search service
    pub backend_url: String,
    /// Log file path; logging is disabled when absent
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Backend URL without trailing slashes, ready for path concatenation
    pub fn normalized_backend_url(&self) -> String {
        self.backend_url.trim_end_matches('/').to_string()
    }

    /// Reject URLs the HTTP client could never use
    pub fn validate(&self) -> Result<()> {
        let url = self.backend_url.trim();
        if url.is_empty() {
            return Err(ChromaFindError::InvalidBackendUrl(
                self.backend_url.clone(),
                "empty URL".to_string(),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ChromaFindError::InvalidBackendUrl(
                self.backend_url.clone(),
                "must start with http:// or https://".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_points_at_local_backend() {
        let config = Config::default();
        assert_eq!(config.backend_url, "http://localhost:8000");
        assert!(config.log_file.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        let config = Config {
            backend_url: "http://search.internal:8000///".to_string(),
            ..Config::default()
        };
        assert_eq!(
            config.normalized_backend_url(),
            "http://search.internal:8000"
        );
    }

    #[test]
    fn rejects_non_http_urls() {
        let config = Config {
            backend_url: "localhost:8000".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            backend_url: "  ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
