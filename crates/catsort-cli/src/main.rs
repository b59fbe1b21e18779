use std::path::PathBuf;
use std::process::ExitCode;

use catsort_core::{AppConfig, CatsortError, RunStats};
use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

/// Assign taxonomy categories to the rows of a product export.
#[derive(Debug, Parser)]
#[command(name = "catsort", version, about)]
struct Cli {
    /// Product export CSV (header row, one product per row)
    #[arg(long, value_name = "PATH")]
    products: Option<PathBuf>,

    /// Category tree CSV (one root-to-leaf path per row)
    #[arg(long, value_name = "PATH")]
    categories: Option<PathBuf>,

    /// Destination CSV for `SKU, category...` rows
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Also accept approximate (misspelled) term matches
    #[arg(long)]
    fuzzy: bool,

    /// Minimum similarity (0.0-1.0) for a fuzzy match
    #[arg(long, value_name = "RATIO")]
    fuzzy_threshold: Option<f64>,

    /// Config file to use instead of the user config
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the registered taxonomy terms to this CSV
    #[arg(long, value_name = "PATH")]
    dump_terms: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Overlay command-line flags on the loaded config.
    fn apply(&self, config: &mut AppConfig) {
        if let Some(path) = &self.products {
            config.paths.products = path.clone();
        }
        if let Some(path) = &self.categories {
            config.paths.categories = path.clone();
        }
        if let Some(path) = &self.output {
            config.paths.output = path.clone();
        }
        if let Some(path) = &self.dump_terms {
            config.paths.dump_terms = Some(path.clone());
        }
        if self.fuzzy {
            config.matching.fuzzy = true;
        }
        if let Some(threshold) = self.fuzzy_threshold {
            config.matching.fuzzy_threshold = threshold;
        }
    }

    fn log_filter(&self) -> String {
        let level = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        format!("catsort={level},catsort_core={level}")
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match execute(&cli) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Category assignment failed");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> Result<RunStats, CatsortError> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;
    catsort_core::run(&config)
}
