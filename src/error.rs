//! Error types shared by the fetch, store and admin layers.
//!
//! Malformed playlist content is never an error: the parser skips what it
//! cannot read. Only retrieval can fail a parse.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The playlist document could not be retrieved.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("fetching {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    #[error("fetching {url} was cancelled")]
    Cancelled { url: String },
}

impl FetchError {
    pub fn transport(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        FetchError::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    /// HTTP status for non-success responses.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum StoreError {
    #[error("playlist {id} not found")]
    NotFound { id: String },
}

/// Failures of the playlist administration workflow.
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("not an acceptable playlist URL: {url}")]
    UnacceptableUrl { url: String },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
