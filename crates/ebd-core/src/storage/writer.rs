//! Sequential writer for a `.part` file.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Buffered, sequential writer for a temp download file.
///
/// Errors are plain `io::Error`; callers attach the path.
pub struct PartFile {
    file: BufWriter<File>,
    temp_path: PathBuf,
}

impl PartFile {
    /// Create the temp file at `temp_path`, truncating whatever an earlier
    /// attempt left behind.
    pub fn create(temp_path: &Path) -> io::Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)?;
        Ok(PartFile {
            file: BufWriter::with_capacity(64 * 1024, file),
            temp_path: temp_path.to_path_buf(),
        })
    }

    /// Flush buffered bytes and sync file data to disk.
    pub fn sync(&mut self) -> io::Result<()> {
        self.file.flush()?;
        self.file.get_ref().sync_all()
    }

    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Atomically rename the temp file to the final path. Consumes the writer and closes the file.
    /// Call `sync` first for durability. Fails if `final_path` is on a different filesystem.
    pub fn finalize(self, final_path: &Path) -> io::Result<()> {
        let temp_path = self.temp_path;
        drop(self.file.into_inner().map_err(|e| e.into_error())?);
        std::fs::rename(&temp_path, final_path)
    }
}

impl Write for PartFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
