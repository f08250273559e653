//! Logging init for the `ebd` binary: human-readable lines on stderr, plus a
//! copy in `~/.local/state/ebd/ebd.log` when the state dir is writable.
//!
//! Library code never calls this; it reports through `events::Observer`.

use anyhow::Result;
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Writer that is either the log file or stderr (used when the file handle cannot be cloned).
enum FileOrStderr {
    File(fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct FileMakeWriter(fs::File);

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileOrStderr;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(FileOrStderr::File)
            .unwrap_or(FileOrStderr::Stderr)
    }
}

/// Default filter directive: `info` normally, `warn` when `silent`.
/// `RUST_LOG` overrides it.
pub fn default_directive(silent: bool) -> &'static str {
    if silent {
        "warn"
    } else {
        "info"
    }
}

fn open_log_file() -> Result<(fs::File, PathBuf)> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("ebd")?;
    let log_dir = xdg_dirs.get_state_home();
    fs::create_dir_all(&log_dir)?;
    let path = log_dir.join("ebd.log");
    let file = fs::OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}

/// Install the global subscriber. Returns the log file path when file
/// logging could be set up; stderr logging works either way.
pub fn init_logging(silent: bool) -> Result<Option<PathBuf>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(silent)));

    let (file_layer, log_path) = match open_log_file() {
        Ok((file, path)) => {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(BoxMakeWriter::new(FileMakeWriter(file)))
                .with_ansi(false);
            (Some(layer), Some(path))
        }
        Err(_) => (None, None),
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    if let Some(path) = &log_path {
        tracing::debug!("ebd logging initialized at {}", path.display());
    }
    Ok(log_path)
}
