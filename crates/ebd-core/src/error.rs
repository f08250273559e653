//! Error types shared by the feed, transport and store layers.

use std::path::PathBuf;
use thiserror::Error;

/// Error returned by a single HTTP GET (curl failure, HTTP error, or local write failure).
/// Kept separate from anyhow so retry decisions can classify it.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error("{0}")]
    Curl(#[from] curl::Error),
    /// HTTP response had a status >= 400.
    #[error("HTTP {0}")]
    Http(u32),
    /// Writing the response body failed (disk full, permission denied). Not retried.
    #[error("storage: {0}")]
    Storage(#[source] std::io::Error),
}

/// Run-level failure: the status feed could not be fetched or parsed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to fetch status feed {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: TransferError,
    },
    #[error("malformed status feed: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// A single feed entry that cannot be turned into a scene. Skipped, never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("entry has no link")]
    MissingLink,
    #[error("entry has no description")]
    MissingDescription,
    #[error("description {0:?} has no positional orderid field")]
    BadDescription(String),
    #[error("empty order id")]
    MissingOrderId,
    #[error("order id {0:?} is not usable as a directory name")]
    UnusableOrderId(String),
    #[error("link {0:?} has no usable filename")]
    BadLink(String),
}

/// Per-scene failure from `LocalStore::store`. Contained by the orchestrator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("download of {scene} failed: {source}")]
    Transfer {
        scene: String,
        #[source]
        source: TransferError,
    },
    #[error("md5 checksum for {scene} still invalid after {attempts} attempts")]
    ChecksumExceeded { scene: String, attempts: u32 },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
