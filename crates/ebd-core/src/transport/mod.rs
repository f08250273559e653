//! HTTP seam between the feed/store logic and the network.
//!
//! Everything above this module talks to a `Transport`; the libcurl-backed
//! `CurlTransport` is the production implementation.

mod http;
#[cfg(test)]
pub(crate) mod memory;

pub use http::{CurlOptions, CurlTransport};

use crate::error::TransferError;
use std::io::Write;

/// Blocking HTTP GET. Implementations must treat status >= 400 as
/// `TransferError::Http` and must not retry on their own.
pub trait Transport: Send + Sync {
    /// Streams the response body of `url` into `out`. Returns the number of bytes written.
    fn get_into(&self, url: &str, out: &mut dyn Write) -> Result<u64, TransferError>;

    /// Buffers the whole response body in memory.
    fn get_bytes(&self, url: &str) -> Result<Vec<u8>, TransferError> {
        let mut body = Vec::new();
        self.get_into(url, &mut body)?;
        Ok(body)
    }

    /// Response body as text; invalid UTF-8 is replaced.
    fn get_text(&self, url: &str) -> Result<String, TransferError> {
        let body = self.get_bytes(url)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
