//! In-memory transport for tests: fixed responses per URL, every request logged.

use super::Transport;
use crate::error::TransferError;
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Body(Vec<u8>),
    Status(u32),
}

/// Unknown URLs answer 404. A URL may be given a queue of replies; the last one repeats.
#[derive(Debug, Default)]
pub(crate) struct MemoryTransport {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<String>>,
}

impl MemoryTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_body(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.with_replies(url, vec![Reply::Body(body.into())])
    }

    pub(crate) fn with_status(self, url: &str, code: u32) -> Self {
        self.with_replies(url, vec![Reply::Status(code)])
    }

    pub(crate) fn with_replies(self, url: &str, replies: Vec<Reply>) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), replies.into());
        self
    }

    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, url: &str) -> usize {
        self.requests.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

impl Transport for MemoryTransport {
    fn get_into(&self, url: &str, out: &mut dyn Write) -> Result<u64, TransferError> {
        self.requests.lock().unwrap().push(url.to_string());
        let reply = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(url) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        match reply {
            Some(Reply::Body(body)) => {
                out.write_all(&body).map_err(TransferError::Storage)?;
                Ok(body.len() as u64)
            }
            Some(Reply::Status(code)) => Err(TransferError::Http(code)),
            None => Err(TransferError::Http(404)),
        }
    }
}
