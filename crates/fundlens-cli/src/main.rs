mod cli;
mod commands;
mod error;
mod log;
mod metadata;
mod output;

use clap::Parser;
use std::process::ExitCode;

use crate::cli::Cli;
use crate::error::CliError;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

fn run() -> Result<(), CliError> {
    let cli = Cli::parse();
    log::init_logging(cli.verbose);

    let envelope = commands::run(&cli)?;
    output::render(&envelope, cli.format, cli.pretty)
}
