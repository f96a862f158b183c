//! ChromaFind - Terminal front-end for ChromaDB contact search
//!
//! Sends free-text queries to a ChromaDB-backed HTTP service and renders
//! the top matching contact records with a relevance score.
//!
//! # Features
//!
//! - **Interactive search**: type a query, press Enter, get ranked contacts
//! - **Relevance scoring**: each card shows `1 - distance` from the backend
//! - **Single request in flight**: submission is gated while a search runs;
//!   outcomes of superseded submissions are discarded
//! - **Configurable backend**: `--backend` flag or `CHROMAFIND_BACKEND`
//!   environment variable, defaulting to `http://localhost:8000`
//!
//! # Example
//!
//! ```no_run
//! use chromafind::{Config, SearchClient, N_RESULTS};
//!
//! fn main() -> chromafind::Result<()> {
//!     let config = Config::default();
//!     let client = SearchClient::new(&config)?;
//!
//!     let results = client.search("acme", N_RESULTS)?;
//!     for (rank, doc) in results.documents().iter().enumerate() {
//!         println!("{}: {}", rank, doc);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod tui;

// Re-export main types
pub use client::{CollectionInfo, ContactMeta, ResultSet, SearchClient, GENERIC_ERROR, N_RESULTS};
pub use config::{Config, DEFAULT_BACKEND_URL};
pub use error::{ChromaFindError, Result, SearchError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
