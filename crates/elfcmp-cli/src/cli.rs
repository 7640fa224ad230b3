use std::path::PathBuf;

use clap::Parser;

/// Structural comparison of two ELF files.
///
/// Exits with 0 when the files are structurally identical, 1 when
/// differences were found and 2 when an input or the configuration could
/// not be read.
#[derive(Parser, Debug)]
#[command(name = "elfcmp", version)]
pub struct Cli {
    /// Left-hand input file
    pub left: PathBuf,

    /// Right-hand input file
    pub right: PathBuf,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with diff settings (ignored fields, unused block pairing)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log per-phase progress to stderr
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
