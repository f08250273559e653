//! Retry loop: run a closure until success or policy says stop.

use super::classify::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::error::TransferError;
use std::time::Duration;

/// Runs `f` until it succeeds or the policy says to stop. Before each retry
/// `on_retry(next_attempt, &error, delay)` is called, then the thread sleeps
/// for the backoff delay.
pub fn run_with_retry<T, F, R>(policy: &RetryPolicy, mut on_retry: R, mut f: F) -> Result<T, TransferError>
where
    F: FnMut(u32) -> Result<T, TransferError>,
    R: FnMut(u32, &TransferError, Duration),
{
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => match policy.decide(attempt, classify(&e)) {
                RetryDecision::NoRetry => return Err(e),
                RetryDecision::RetryAfter(d) => {
                    attempt += 1;
                    on_retry(attempt, &e, d);
                    std::thread::sleep(d);
                }
            },
        }
    }
}
