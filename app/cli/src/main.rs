//! FILENAME: app/cli/src/main.rs
// PURPOSE: Command-line entry point. Logs go to stderr, results to stdout.
// FORMAT: seq|level|category|message

use std::io;
use std::process::ExitCode;

use caremarket::{log_error, logging, run, Cli};
use clap::Parser;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match run(&cli, &mut out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_error!("MAIN", "{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
