use ebd_core::logging;

mod cli;

use crate::cli::Cli;
use clap::Parser;

fn main() {
    let cli = Cli::parse();

    // Stderr logging works even when the XDG state dir is unwritable.
    if let Err(err) = logging::init_logging(cli.silent()) {
        eprintln!("ebd: could not initialize logging: {:#}", err);
    }

    match cli.run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("ebd error: {:#}", err);
            std::process::exit(1);
        }
    }
}
