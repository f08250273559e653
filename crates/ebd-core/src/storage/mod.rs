//! Temp-file lifecycle for a single download.
//!
//! Bodies stream into `<final>.part`; the only way a file appears at its final
//! path is the rename in `PartFile::finalize`.

mod writer;

pub use writer::PartFile;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `a.tar.gz` → `a.tar.gz.part`).
pub fn temp_path(final_path: &std::path::Path) -> std::path::PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    std::path::PathBuf::from(o)
}

/// Removes a leftover temp file; a missing file is not an error.
pub fn remove_temp(temp_path: &std::path::Path) -> std::io::Result<()> {
    match std::fs::remove_file(temp_path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}
