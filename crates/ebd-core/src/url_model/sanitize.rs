//! Linux-safe path component sanitization.

/// Linux NAME_MAX, in bytes.
const NAME_MAX: usize = 255;

fn is_forbidden(c: char) -> bool {
    matches!(c, '\0' | '/' | '\\' | ' ' | '\t') || c.is_control()
}

/// Sanitizes a candidate file or directory name for use on Linux.
///
/// Separators, NUL, whitespace and control characters become `_` (runs are
/// collapsed), leading/trailing dots and underscores are trimmed, and the
/// result is cut to NAME_MAX bytes on a char boundary.
pub fn sanitize_filename_for_linux(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if is_forbidden(c) {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut take = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}
