//! File digests computed after a transfer lands on disk.
//!
//! Digests are taken over the exact bytes of the file, never over a decoded
//! or newline-translated view of it.

use md5::Md5;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Reads in chunks to keep memory use bounded on multi-gigabyte archives.
fn digest_path<D: Digest>(path: &Path) -> io::Result<String> {
    let mut f = File::open(path)?;
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compute MD5 of a file and return the digest as lowercase hex.
pub fn md5_path(path: &Path) -> io::Result<String> {
    digest_path::<Md5>(path)
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
pub fn sha256_path(path: &Path) -> io::Result<String> {
    digest_path::<Sha256>(path)
}

/// Expected digest from a checksum sidecar: the first whitespace-delimited
/// token of the first line (`"<hex>  <filename>"`). `None` when the body is empty.
pub fn sidecar_digest(body: &str) -> Option<&str> {
    body.lines().next()?.split_whitespace().next()
}

/// Hex digests compare case-insensitively.
pub fn digests_match(expected: &str, actual: &str) -> bool {
    expected.trim().eq_ignore_ascii_case(actual.trim())
}
