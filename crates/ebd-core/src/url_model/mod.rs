//! URL modeling and on-disk name derivation.
//!
//! Everything taken from the feed that ends up as a path component under the
//! download directory goes through here first.

mod path;
mod sanitize;

pub use path::{last_segment_span, normalize_host};
pub use sanitize::sanitize_filename_for_linux;

/// Turns an untrusted string (order id, URL segment) into a single safe path
/// component. Returns `None` when nothing usable is left.
pub fn safe_component(raw: &str) -> Option<String> {
    let sanitized = sanitize_filename_for_linux(raw);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        None
    } else {
        Some(sanitized)
    }
}
