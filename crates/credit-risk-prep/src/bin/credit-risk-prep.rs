use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use credit_risk_prep::{prepare, DatasetSummary, PrepError, PrepareOptions, DEFAULT_SAMPLE_SIZE};
use credit_risk_storage::BorrowerStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "credit-risk-prep",
    version,
    about = "Build and inspect the borrower table served by credit-riskd"
)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Map raw loan exports to borrowers.csv
    Prepare(PrepareArgs),
    /// Print a summary of a prepared borrower table
    Analyze(AnalyzeArgs),
}

#[derive(Debug, Args)]
struct PrepareArgs {
    /// Accepted loans CSV
    #[arg(long)]
    accepted: PathBuf,

    /// Declined applications CSV
    #[arg(long)]
    rejected: Option<PathBuf>,

    #[arg(short, long, default_value = "borrowers.csv")]
    output: PathBuf,

    /// Rows to draw across risk tiers (0 keeps everything)
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    sample: usize,

    /// Max rows read from each input
    #[arg(long)]
    limit: Option<usize>,

    /// Seed for sampling and income synthesis
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug, Args)]
struct AnalyzeArgs {
    #[arg(default_value = "borrowers.csv")]
    path: PathBuf,
}

fn main() -> Result<(), PrepError> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Prepare(args) => {
            let options = PrepareOptions {
                accepted: args.accepted,
                rejected: args.rejected,
                output: args.output,
                sample_size: args.sample,
                limit: args.limit,
                seed: args.seed,
            };
            let report = prepare(&options)?;
            info!(rows = report.written, "done");
        }
        Command::Analyze(args) => {
            let store = BorrowerStore::open_csv(&args.path)?;
            let summary = DatasetSummary::from_records(store.records());
            let mut out = io::stdout().lock();
            summary.write_report(&mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}
