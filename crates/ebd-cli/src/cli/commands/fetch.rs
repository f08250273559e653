//! `ebd fetch` – download every missing scene from the status feed.

use anyhow::{Context, Result};
use ebd_core::config;
use ebd_core::events::TracingObserver;
use ebd_core::feed::OrderFilter;
use ebd_core::orchestrator::{self, RunContext, RunRequest};
use ebd_core::transport::CurlTransport;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FetchArgs {
    pub email: String,
    pub order: OrderFilter,
    pub target_directory: PathBuf,
    pub check_downloads: bool,
    pub host: Option<String>,
}

/// Returns exit code 1 when any scene failed; the other scenes were still attempted.
pub fn run_fetch(args: FetchArgs) -> Result<i32> {
    let cfg = config::load_or_init()?;
    tracing::debug!("loaded config: {:?}", cfg);

    let ctx = RunContext {
        host: args.host.unwrap_or_else(|| cfg.host.clone()),
        transport: Arc::new(CurlTransport::new(cfg.curl_options())),
        observer: Arc::new(TracingObserver),
        store_policy: cfg.store_policy(),
        feed_retry: cfg.retry_policy(),
    };
    let request = RunRequest {
        target_dir: args.target_directory,
        email: args.email,
        order: args.order,
        verify_checksum: args.check_downloads,
    };

    let summary = orchestrator::run(&request, &ctx)
        .with_context(|| format!("order {} for {}", request.order, request.email))?;

    if summary.nothing_processed() {
        eprintln!("No scenes were processed for order {}.", request.order);
    }
    if summary.is_success() {
        return Ok(0);
    }
    for failed in &summary.failed {
        eprintln!("failed: {}: {}", failed.name, failed.reason);
    }
    eprintln!(
        "{} of {} scene(s) failed; re-run to retry them.",
        summary.failed.len(),
        summary.seen
    );
    Ok(1)
}
