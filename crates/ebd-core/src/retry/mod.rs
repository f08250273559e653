//! Retry and backoff policy for transient network failures.
//!
//! Classification (timeouts, throttling, connection failures) and exponential
//! backoff are shared by the feed fetch and the artifact transfer. Checksum
//! mismatches are not handled here; the store bounds those separately.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
