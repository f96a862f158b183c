//! HTTP client for the ChromaDB search service.
//!
//! The backend exposes a small JSON-over-HTTP surface:
//!
//! - `GET /chroma/query?query_text=<text>&n_results=<n>` runs a vector
//!   similarity search and returns ranked contact records
//! - `GET /chroma/info` reports the collection name and document count
//!
//! Every query response carries a `status` field. `"success"` comes with a
//! `results` payload of parallel ranked sequences (documents, metadatas,
//! distances); anything else is a service-reported failure with an optional
//! `message`. Transport problems (backend down, unreadable body) are folded
//! into a single fixed connectivity message so the UI never has to explain
//! a socket error to the user.

use std::time::Duration;

use serde::Deserialize;

use crate::config::Config;
use crate::error::{ChromaFindError, Result, SearchError};

/// Number of results requested per query
pub const N_RESULTS: usize = 5;

/// Fallback message when the backend reports a failure without one
pub const GENERIC_ERROR: &str = "An error occurred";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Contact metadata attached to each indexed note.
///
/// The backend stores whatever columns the source CSV carried; these five
/// are the ones the UI renders. Missing fields deserialize as empty strings
/// rather than failing the whole response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactMeta {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Ranked matches for one query.
///
/// ChromaDB wraps each sequence in an outer per-query-batch array; this
/// client always submits a single query text, so batch 0 is the only one
/// consulted. The three inner sequences are index-aligned by rank.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultSet {
    #[serde(default)]
    pub documents: Vec<Vec<String>>,
    #[serde(default)]
    pub metadatas: Vec<Vec<ContactMeta>>,
    #[serde(default)]
    pub distances: Vec<Vec<f64>>,
}

impl ResultSet {
    /// Ranked note texts of the first (only) query batch
    pub fn documents(&self) -> &[String] {
        self.documents.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Metadata for the result at `rank`, if the backend supplied it
    pub fn metadata(&self, rank: usize) -> Option<&ContactMeta> {
        self.metadatas.first()?.get(rank)
    }

    /// Distance for the result at `rank`; lower is more similar
    pub fn distance(&self, rank: usize) -> Option<f64> {
        self.distances.first()?.get(rank).copied()
    }

    pub fn len(&self) -> usize {
        self.documents().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents().is_empty()
    }
}

/// Collection statistics from `GET /chroma/info`
#[derive(Debug, Clone, Deserialize)]
pub struct CollectionInfo {
    pub collection_name: String,
    pub document_count: u64,
}

#[derive(Debug, Deserialize)]
struct QueryEnvelope {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    results: Option<ResultSet>,
}

/// Blocking client for the search backend.
///
/// Cheap to clone; worker threads each take their own copy.
#[derive(Clone)]
pub struct SearchClient {
    http: reqwest::blocking::Client,
    base_url: String,
    unreachable_message: String,
}

impl SearchClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ChromaFindError::HttpInit(e.to_string()))?;

        let base_url = config.normalized_backend_url();
        let unreachable_message = format!(
            "Failed to connect to backend at {}. Make sure it is running.",
            base_url
        );

        Ok(Self {
            http,
            base_url,
            unreachable_message,
        })
    }

    /// The connectivity message surfaced on any transport failure
    pub fn unreachable_message(&self) -> &str {
        &self.unreachable_message
    }

    /// Run a similarity search for `query`, returning up to `n_results`
    /// ranked matches.
    ///
    /// Distinguishes the two failure classes: [`SearchError::Service`] when
    /// the backend answered with a non-success `status`, and
    /// [`SearchError::Transport`] when it could not be reached or its body
    /// was not valid JSON.
    pub fn search(
        &self,
        query: &str,
        n_results: usize,
    ) -> std::result::Result<ResultSet, SearchError> {
        let url = format!("{}/chroma/query", self.base_url);

        let body = match self
            .http
            .get(&url)
            .query(&[
                ("query_text", query),
                ("n_results", n_results.to_string().as_str()),
            ])
            .send()
            .and_then(|response| response.text())
        {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(error = %err, %url, "search request failed");
                return Err(SearchError::Transport(self.unreachable_message.clone()));
            }
        };

        let envelope: QueryEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(error = %err, %url, "unparseable response body");
                return Err(SearchError::Transport(self.unreachable_message.clone()));
            }
        };

        if envelope.status == "success" {
            Ok(envelope.results.unwrap_or_default())
        } else {
            let message = envelope
                .message
                .unwrap_or_else(|| GENERIC_ERROR.to_string());
            tracing::warn!(status = %envelope.status, %message, "backend reported failure");
            Err(SearchError::Service(message))
        }
    }

    /// Fetch collection statistics. Callers treat failure as non-fatal.
    pub fn info(&self) -> std::result::Result<CollectionInfo, SearchError> {
        let url = format!("{}/chroma/info", self.base_url);

        self.http
            .get(&url)
            .send()
            .and_then(|response| response.json())
            .map_err(|err| {
                tracing::debug!(error = %err, %url, "info request failed");
                SearchError::Transport(self.unreachable_message.clone())
            })
    }
}

/// Serve a canned HTTP response on an ephemeral port and return the base
/// URL. Answers every request with the same body until the test process
/// exits.
#[cfg(test)]
pub(crate) fn stub_server(body: &'static str) -> String {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
    let addr = listener.local_addr().expect("stub server addr");

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            let mut request = [0u8; 4096];
            let _ = stream.read(&mut request);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    format!("http://{}", addr)
}

/// A URL nothing is listening on
#[cfg(test)]
pub(crate) fn dead_url() -> String {
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    format!("http://{}", addr)
}

#[cfg(test)]
pub(crate) fn client_for(base_url: String) -> SearchClient {
    let config = Config {
        backend_url: base_url,
        ..Config::default()
    };
    SearchClient::new(&config).expect("build client")
}
