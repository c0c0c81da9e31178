//! layeredconfig command line tool
//!
//! Reads configuration from a defaults file, any number of YAML/JSON files,
//! the environment and trailing `--key=value` arguments, and prints or
//! updates resolved values.

use anyhow::Result;
use clap::Parser;
use layeredconfig::cli::{Cli, execute};
use layeredconfig::logging::{LogTarget, init_logging};
use std::io::Write;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&LogTarget::parse(&cli.log), cli.verbose)?;
    debug!(command = ?cli.command, "Starting layeredconfig");

    let output = execute(&cli)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    stdout.flush()?;

    Ok(())
}
