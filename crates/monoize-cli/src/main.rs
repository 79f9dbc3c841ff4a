use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::Level;

mod cli;
mod commands;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match commands::run_command(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
