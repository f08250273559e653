//! CLI for the EBD bulk scene downloader.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use ebd_core::feed::OrderFilter;
use std::path::PathBuf;

use commands::{run_checksum, run_completions, run_fetch, FetchArgs};

const FETCH_AFTER_HELP: &str = "\
Downloads every completed scene of the selected order(s) into
<TARGET_DIRECTORY>/<order id>/<scene>.tar.gz. Scenes already present are
skipped, so it is safe to interrupt and restart: each scene is downloaded
once per target directory.

Run only one instance against a given target directory at a time, and do not
schedule it more often than once an hour.

Examples:
  ebd fetch -e you@example.com -o ALL -d /data/espa
  ebd fetch -e you@example.com -o you@example.com-01312014-101112 -d /data/espa -c";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ebd", version)]
#[command(about = "EBD: download completed scenes of your orders from the status feed", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download all completed scenes that are not yet in the target directory.
    #[command(after_help = FETCH_AFTER_HELP)]
    Fetch {
        /// E-mail address the orders were placed with.
        #[arg(short, long)]
        email: String,

        /// Order to download; `ALL` for every order.
        #[arg(short, long, value_name = "ORDER_ID|ALL")]
        order: OrderFilter,

        /// Where to store the downloaded scenes.
        #[arg(short = 'd', long = "target-directory", alias = "target_directory")]
        target_directory: PathBuf,

        /// Validate downloads against md5 checksums; re-download on mismatch.
        #[arg(short = 'c', long = "check-downloads", alias = "check_downloads")]
        check_downloads: bool,

        /// Only log warnings and errors.
        #[arg(short, long)]
        silent: bool,

        /// Feed host (overrides `host` in config.toml).
        #[arg(long)]
        host: Option<String>,
    },

    /// Print the digest of a file (md5 by default).
    Checksum {
        /// Path to the file.
        path: PathBuf,

        /// Use SHA-256 instead of md5.
        #[arg(long)]
        sha256: bool,
    },

    /// Print shell completions.
    Completions {
        shell: Shell,
    },
}

impl Cli {
    pub fn silent(&self) -> bool {
        matches!(self.command, CliCommand::Fetch { silent: true, .. })
    }

    /// Runs the selected command and returns the process exit code.
    pub fn run(self) -> Result<i32> {
        match self.command {
            CliCommand::Fetch {
                email,
                order,
                target_directory,
                check_downloads,
                silent: _,
                host,
            } => run_fetch(FetchArgs {
                email,
                order,
                target_directory,
                check_downloads,
                host,
            }),
            CliCommand::Checksum { path, sha256 } => {
                run_checksum(&path, sha256)?;
                Ok(0)
            }
            CliCommand::Completions { shell } => {
                run_completions(shell);
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests;
