//! Single-stream HTTP GET over libcurl.

use super::Transport;
use crate::error::TransferError;
use std::io::Write;
use std::time::Duration;

/// Timeouts applied to every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Whole-request limit, body included.
    pub timeout: Duration,
    /// Bytes/s below which a transfer counts as stalled.
    pub low_speed_limit: u32,
    /// How long a transfer may stay below `low_speed_limit`.
    pub low_speed_time: Duration,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(3600),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
        }
    }
}

/// Blocking transport: one `Easy` handle per request, redirects followed.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    options: CurlOptions,
}

impl CurlTransport {
    pub fn new(options: CurlOptions) -> Self {
        Self { options }
    }

    fn easy(&self, url: &str) -> Result<curl::easy::Easy, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        // Turns HTTP >= 400 into CURLE_HTTP_RETURNED_ERROR before any body is written.
        easy.fail_on_error(true)?;
        easy.useragent(concat!("ebd/", env!("CARGO_PKG_VERSION")))?;
        easy.connect_timeout(self.options.connect_timeout)?;
        easy.low_speed_limit(self.options.low_speed_limit)?;
        easy.low_speed_time(self.options.low_speed_time)?;
        easy.timeout(self.options.timeout)?;
        Ok(easy)
    }
}

impl Transport for CurlTransport {
    fn get_into(&self, url: &str, out: &mut dyn Write) -> Result<u64, TransferError> {
        let mut easy = self.easy(url)?;
        let mut written = 0u64;
        let mut write_err: Option<std::io::Error> = None;

        let performed = {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match out.write_all(data) {
                Ok(()) => {
                    written += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    write_err = Some(e);
                    Ok(0) // short count aborts the transfer
                }
            })?;
            transfer.perform()
        };

        if let Some(e) = write_err {
            return Err(TransferError::Storage(e));
        }
        if let Err(e) = performed {
            if e.is_http_returned_error() {
                let code = easy.response_code()?;
                return Err(TransferError::Http(code));
            }
            return Err(TransferError::Curl(e));
        }

        let code = easy.response_code()?;
        if code >= 400 {
            return Err(TransferError::Http(code));
        }
        Ok(written)
    }
}
