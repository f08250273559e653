//! Observability hooks passed into the feed, store and orchestrator.
//!
//! Components never configure or reach for global logging; they report what
//! happens to an `Observer` they were handed. `TracingObserver` forwards to
//! `tracing`, tests can record events instead.

use crate::error::{EntryError, StoreError, TransferError};
use crate::orchestrator::RunSummary;
use crate::scene::Scene;
use std::io;
use std::path::Path;
use std::time::Duration;

/// Transition in the life of one scene.
#[derive(Debug)]
pub enum SceneEvent<'a> {
    /// Picked up from the feed by the orchestrator.
    Processing,
    /// Committed file already on disk; nothing to do.
    AlreadyStored,
    DirectoryCreated(&'a Path),
    TransferStarted { attempt: u32, dir: &'a Path },
    /// Transient network failure; the transfer restarts from byte zero after `delay`.
    TransferRetry {
        attempt: u32,
        error: &'a TransferError,
        delay: Duration,
    },
    /// Sidecar missing or unusable; the download is accepted unverified.
    ChecksumUnavailable { reason: &'a str },
    ChecksumMatched,
    ChecksumMismatch {
        attempt: u32,
        expected: &'a str,
        actual: &'a str,
        retrying: bool,
    },
    Committed(&'a Path),
    Failed(&'a StoreError),
    /// A `.part` file could not be cleaned up after a failure; the next run overwrites it.
    TempFileLeft { path: &'a Path, error: &'a io::Error },
}

/// Run-level events.
#[derive(Debug)]
pub enum RunEvent<'a> {
    Started { feed_url: &'a str },
    /// Transient failure fetching the feed; retried after `delay`.
    FeedRetry {
        attempt: u32,
        error: &'a TransferError,
        delay: Duration,
    },
    /// A well-formed feed entry, before order filtering.
    EntryRead {
        order_id: &'a str,
        status: Option<&'a str>,
    },
    /// A feed entry was unusable and skipped.
    EntrySkipped { error: &'a EntryError },
    /// The feed produced no scene for the requested order(s).
    NothingProcessed,
    Finished(&'a RunSummary),
}

pub trait Observer: Send + Sync {
    fn scene(&self, scene: &Scene, event: SceneEvent<'_>);
    fn run(&self, event: RunEvent<'_>);
}

/// Forwards events to `tracing` with structured fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn scene(&self, scene: &Scene, event: SceneEvent<'_>) {
        let name = scene.name();
        let order = scene.order_id();
        match event {
            SceneEvent::Processing => tracing::info!(scene = name, order, "processing scene"),
            SceneEvent::AlreadyStored => {
                tracing::info!(scene = name, order, "scene is already downloaded, skipping")
            }
            SceneEvent::DirectoryCreated(dir) => {
                tracing::info!(order, dir = %dir.display(), "created target directory")
            }
            SceneEvent::TransferStarted { attempt, dir } => tracing::info!(
                scene = name,
                attempt,
                "copying {} to {}",
                name,
                dir.display()
            ),
            SceneEvent::TransferRetry {
                attempt,
                error,
                delay,
            } => tracing::warn!(
                scene = name,
                attempt,
                delay_ms = delay.as_millis() as u64,
                "transfer failed ({}), retrying",
                error
            ),
            SceneEvent::ChecksumUnavailable { reason } => tracing::info!(
                scene = name,
                "md5 checksum not available ({}), skipping verification",
                reason
            ),
            SceneEvent::ChecksumMatched => tracing::info!(scene = name, "md5 checksum is OKAY"),
            SceneEvent::ChecksumMismatch {
                attempt,
                expected,
                actual,
                retrying,
            } => {
                if retrying {
                    tracing::warn!(
                        scene = name,
                        attempt,
                        expected,
                        actual,
                        "md5 checksum is not valid, retrying download"
                    );
                } else {
                    tracing::error!(
                        scene = name,
                        attempt,
                        expected,
                        actual,
                        "md5 checksum is not valid, maximum retries exceeded"
                    );
                }
            }
            SceneEvent::Committed(path) => {
                tracing::info!(scene = name, path = %path.display(), "scene stored")
            }
            SceneEvent::Failed(error) => tracing::error!(scene = name, order, "{}", error),
            SceneEvent::TempFileLeft { path, error } => tracing::warn!(
                scene = name,
                path = %path.display(),
                "could not remove temp file: {}",
                error
            ),
        }
    }

    fn run(&self, event: RunEvent<'_>) {
        match event {
            RunEvent::Started { feed_url } => {
                tracing::info!(feed = feed_url, "started scene processing")
            }
            RunEvent::FeedRetry {
                attempt,
                error,
                delay,
            } => tracing::warn!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                "feed fetch failed ({}), retrying",
                error
            ),
            RunEvent::EntryRead { order_id, status } => tracing::debug!(
                order = order_id,
                status = status.unwrap_or(""),
                "feed entry"
            ),
            RunEvent::EntrySkipped { error } => {
                tracing::warn!("skipping malformed feed entry: {}", error)
            }
            RunEvent::NothingProcessed => tracing::warn!("no scenes were processed"),
            RunEvent::Finished(summary) => tracing::info!(
                seen = summary.seen,
                downloaded = summary.downloaded,
                already_stored = summary.already_stored,
                failed = summary.failed.len(),
                "finished scene processing"
            ),
        }
    }
}
