//! `ebd checksum` – digest of a local file.

use anyhow::{Context, Result};
use ebd_core::checksum;
use std::path::Path;

/// Print `<hex>  <path>`, the same layout as the sidecar files.
pub fn run_checksum(path: &Path, sha256: bool) -> Result<()> {
    let digest = if sha256 {
        checksum::sha256_path(path)
    } else {
        checksum::md5_path(path)
    }
    .with_context(|| format!("hash {}", path.display()))?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
