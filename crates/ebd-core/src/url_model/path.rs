//! Filename extraction from URL path and feed host normalization.

use std::ops::Range;

/// Byte range of the last path segment of `url`, as written in `url`.
///
/// The link must parse as an absolute URL, but the range points into the raw
/// string, so characters the `url` crate would percent-encode are kept as-is.
/// Query, fragment and trailing slashes are ignored. `None` when the path is
/// empty/root or ends in `.`/`..`.
pub fn last_segment_span(url: &str) -> Option<Range<usize>> {
    url::Url::parse(url).ok()?;
    let authority = url.find("://")? + 3;
    let path_end = url.find(['?', '#']).unwrap_or(url.len());
    if path_end < authority {
        return None;
    }
    let path_start = authority + url[authority..path_end].find('/')?;
    let end = path_start + url[path_start..path_end].trim_end_matches('/').len();
    if end <= path_start {
        return None;
    }
    // url[path_start] is '/', so this never lands before the path.
    let start = url[..end].rfind('/')? + 1;
    match &url[start..end] {
        "." | ".." => None,
        _ => Some(start..end),
    }
}

/// Ensures a feed host carries an explicit scheme (`http://` is assumed) and
/// has no trailing slash.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{}", host)
    }
}
