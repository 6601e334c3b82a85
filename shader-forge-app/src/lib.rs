//! Shader Forge Application Library
//!
//! Command-line driver that turns shader source files into JavaScript
//! modules: configuration loading, logging, the parallel runner and output
//! writing.

pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod runner;

pub use config::{Cli, ForgeConfig};
pub use error::AppError;

use clap::Parser;
use colored::Colorize;
use runner::{Outcome, RunSummary};

fn print_summary(summary: &RunSummary) {
    for report in &summary.reports {
        match &report.outcome {
            Outcome::Written { module, map } => {
                println!("{} {}", "transformed".green(), module.display());
                if let Some(map) = map {
                    println!("{} {}", "source map".green(), map.display());
                }
            }
            Outcome::Failed(e) => {
                println!("{} {}: {:#}", "failed".red().bold(), report.input.display(), e);
            }
        }
    }

    let line = format!(
        "{} written, {} failed, {} skipped",
        summary.written(),
        summary.failed(),
        summary.skipped
    );
    if summary.failed() > 0 {
        println!("{}", line.red());
    } else {
        println!("{}", line.green());
    }
}

/// Runs the `shader-forge` command line.
pub fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = ForgeConfig::load(&cli)?;
    logging::init_logger(config.log_level);
    log::debug!("Loaded config: {:?}", config);

    let summary = runner::run(&config, &cli.inputs)?;
    print_summary(&summary);

    if summary.failed() > 0 {
        return Err(AppError::Failed {
            failed: summary.failed(),
            total: summary.reports.len(),
        }
        .into());
    }
    Ok(())
}
