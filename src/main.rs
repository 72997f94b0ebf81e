use std::process::ExitCode;

use clap::Parser;

use glassmap::cli::{self, CliArgs};
use glassmap::logger;

fn main() -> ExitCode {
    // Session log (overwrites the previous session's file)
    logger::init();

    let args = CliArgs::parse();
    cli::run(args)
}
