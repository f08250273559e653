//! Scene: addressing info for one downloadable archive from the status feed.

use crate::error::EntryError;
use crate::url_model::{last_segment_span, safe_component};
use std::fmt;

/// Suffix of the archives published in the feed.
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";
/// Suffix of the checksum sidecar published next to each archive.
pub const CHECKSUM_SUFFIX: &str = ".md5";

/// One transferable artifact. `filename`, `name` and `checksum_url` are all
/// derived from the last path segment of `source_url`, exactly as written in
/// the link, at construction and never change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    source_url: String,
    checksum_url: String,
    order_id: String,
    filename: String,
    name: String,
    order_dir: String,
    stored_filename: String,
}

impl Scene {
    /// Builds a scene from a feed link and the order it belongs to.
    pub fn new(source_url: &str, order_id: &str) -> Result<Self, EntryError> {
        let source_url = source_url.trim();
        let order_id = order_id.trim();
        if order_id.is_empty() {
            return Err(EntryError::MissingOrderId);
        }
        let bad_link = || EntryError::BadLink(source_url.to_string());
        let span = last_segment_span(source_url).ok_or_else(bad_link)?;
        let filename = source_url[span.clone()].to_string();
        let name = match filename.strip_suffix(ARCHIVE_SUFFIX) {
            Some(stem) if !stem.is_empty() => stem.to_string(),
            _ => filename.clone(),
        };
        // Same segment, same position: the query string stays in place.
        let checksum_url = format!(
            "{}{}{}{}",
            &source_url[..span.start],
            name,
            CHECKSUM_SUFFIX,
            &source_url[span.end..]
        );

        let order_dir = safe_component(order_id)
            .ok_or_else(|| EntryError::UnusableOrderId(order_id.to_string()))?;
        let stored_filename = safe_component(&filename).ok_or_else(bad_link)?;

        Ok(Scene {
            source_url: source_url.to_string(),
            checksum_url,
            order_id: order_id.to_string(),
            filename,
            name,
            order_dir,
            stored_filename,
        })
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn checksum_url(&self) -> &str {
        &self.checksum_url
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Filename without the archive suffix; used in logs.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `order_id` as a single path component. Ids that differ only in
    /// characters replaced by sanitizing (`"a b"`, `"a_b"`) share a directory.
    pub fn order_dir(&self) -> &str {
        &self.order_dir
    }

    /// `filename` as a single path component, used for the file on disk.
    pub fn stored_filename(&self) -> &str {
        &self.stored_filename
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (order {})", self.name, self.order_id)
    }
}
