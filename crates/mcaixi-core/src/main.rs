//! mcaixi binary entry point.
//!
//! Parses and validates the CLI options, wires logging to stderr (stdout is
//! the agent -> environment channel), and enters the interaction loop.

use clap::Parser;
use mcaixi_core::config::{Cli, Config};
use mcaixi_core::exit_codes::ExitCode;
use mcaixi_core::protocol;
use std::io;
use std::process;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    init_logging();

    let cli = Cli::parse();
    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(ExitCode::ArgsError as i32);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();

    match protocol::run(&config, stdin.lock(), stdout.lock()) {
        Ok(code) => {
            info!("agent terminated");
            process::exit(code);
        }
        Err(err) => {
            error!(%err, code = err.code(), "fatal error");
            process::exit(ExitCode::RuntimeError as i32);
        }
    }
}
