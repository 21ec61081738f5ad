#![cfg_attr(test, allow(unused_crate_dependencies))]

mod args;
mod errors;
mod output;

use std::{
    io::{self, IsTerminal},
    process,
};

use args::{Args, Format};
use clap::Parser;
use errors::CliError;
use output::report;
use tracing_subscriber::EnvFilter;

const FAILED_CHECK_EXIT_STATUS: i32 = 1;

fn main() {
    let args = Args::parse();

    if !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let exit_code = match try_main(&args) {
        Ok(true) => 0,
        Ok(false) => FAILED_CHECK_EXIT_STATUS,
        Err(error) => {
            report::error(&error);
            FAILED_CHECK_EXIT_STATUS
        }
    };

    process::exit(exit_code);
}

/// Returns whether every document passed.
fn try_main(args: &Args) -> Result<bool, CliError> {
    init_logging(args.log_filter.as_deref())?;

    let config = args.config()?;
    let reports = graphql_cache_keys::check_project(&config)?;

    match args.format {
        Format::Text => report::text(&reports),
        Format::Json => report::json(&reports)?,
    }

    let passed = reports.iter().all(|report| report.outcome.is_passed());

    tracing::debug!(documents = reports.len(), passed, "check finished");

    Ok(passed)
}

fn init_logging(filter: Option<&str>) -> Result<(), CliError> {
    let filter = match filter {
        Some(filter) => EnvFilter::try_new(filter)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();

    Ok(())
}
