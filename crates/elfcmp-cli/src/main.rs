use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

mod cli;
mod commands;
mod render;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    if cli.no_color {
        colored::control::set_override(false);
    }

    match commands::run_command(&cli) {
        Ok(commands::Outcome::Identical) => ExitCode::SUCCESS,
        Ok(commands::Outcome::Different) => ExitCode::from(1),
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}
