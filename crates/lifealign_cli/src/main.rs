//! `lifealign` executable.
//!
//! # Responsibility
//! - Wire the SQLite task store and reminder outbox into the core engine.
//! - Map every failure to a message on stderr and a non-zero exit status.

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
