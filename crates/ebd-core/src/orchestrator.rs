//! One run: walk the status feed and store every scene it lists.
//!
//! Scenes are processed one after another. A scene that fails is recorded and
//! the run moves on; only a feed that cannot be read stops the run.

use crate::error::FeedError;
use crate::events::{Observer, RunEvent, SceneEvent};
use crate::feed::{FeedSource, OrderFilter};
use crate::retry::RetryPolicy;
use crate::store::{LocalStore, StoreOutcome, StorePolicy};
use crate::transport::Transport;
use std::path::PathBuf;
use std::sync::Arc;

/// What to download and where.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub target_dir: PathBuf,
    pub email: String,
    pub order: OrderFilter,
    pub verify_checksum: bool,
}

/// Collaborators shared by the feed and the store for one run.
#[derive(Clone)]
pub struct RunContext {
    pub host: String,
    pub transport: Arc<dyn Transport>,
    pub observer: Arc<dyn Observer>,
    pub store_policy: StorePolicy,
    pub feed_retry: RetryPolicy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedScene {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Scenes the feed yielded for the requested order(s).
    pub seen: usize,
    pub downloaded: usize,
    pub already_stored: usize,
    pub failed: Vec<FailedScene>,
}

impl RunSummary {
    pub fn nothing_processed(&self) -> bool {
        self.seen == 0
    }

    /// No scene failed. A run that saw nothing is still a success.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Downloads every scene of `request.order` that is not already under `request.target_dir`.
pub fn run(request: &RunRequest, ctx: &RunContext) -> Result<RunSummary, FeedError> {
    let store = LocalStore::new(
        request.target_dir.clone(),
        Arc::clone(&ctx.transport),
        Arc::clone(&ctx.observer),
        ctx.store_policy,
    );
    let feed = FeedSource::new(
        &ctx.host,
        &request.email,
        Arc::clone(&ctx.transport),
        Arc::clone(&ctx.observer),
        ctx.feed_retry,
    );
    ctx.observer.run(RunEvent::Started {
        feed_url: feed.feed_url(),
    });

    let mut summary = RunSummary::default();
    for scene in feed.get_items(&request.order)? {
        let scene = scene?;
        summary.seen += 1;
        ctx.observer.scene(&scene, SceneEvent::Processing);
        match store.store(&scene, request.verify_checksum) {
            Ok(StoreOutcome::AlreadyStored) => summary.already_stored += 1,
            Ok(StoreOutcome::Committed { .. }) => summary.downloaded += 1,
            // Already reported by the store; keep going with the next scene.
            Err(e) => summary.failed.push(FailedScene {
                name: scene.name().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    if summary.nothing_processed() {
        ctx.observer.run(RunEvent::NothingProcessed);
    }
    ctx.observer.run(RunEvent::Finished(&summary));
    Ok(summary)
}
