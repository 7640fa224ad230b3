use anyhow::Context;
use elfcmp_diff::{compare_paths, Delta, DiffConfig};
use tracing::debug;

use crate::cli::{Cli, OutputFormat};
use crate::render;

/// What a successful comparison found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Identical,
    Different,
}

pub fn run_command(cli: &Cli) -> anyhow::Result<Outcome> {
    let config = match &cli.config {
        Some(path) => DiffConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DiffConfig::default(),
    };
    debug!(?config, "using diff configuration");

    let report = compare_paths(&cli.left, &cli.right, &config).with_context(|| {
        format!(
            "cannot compare {} and {}",
            cli.left.display(),
            cli.right.display()
        )
    })?;

    let output = match cli.format {
        OutputFormat::Text => render::text(
            &report,
            &cli.left.display().to_string(),
            &cli.right.display().to_string(),
        )?,
        OutputFormat::Json => render::json(&report)?,
    };
    print!("{output}");

    Ok(if report.is_empty() {
        Outcome::Identical
    } else {
        Outcome::Different
    })
}
