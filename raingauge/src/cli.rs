use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width per-track results table.
    HumanReadable,
    /// One JSON document with records and their validation outcomes.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "raingauge",
    author,
    version,
    about = "Results parser, validator and aggregator for Rain-style benchmark logs",
    long_about = "raingauge digests the free-text output of a Rain-style load-generation run.\n\nIt extracts per-track scoreboard summaries, validates them against configurable service-level thresholds, and aggregates repeated runs of the same configuration into mean / standard-deviation / 95%-confidence statistics.",
    after_help = "Examples:\n  raingauge report run_0.log\n  raingauge report run_0.log --intervals --thresholds slo.yaml\n  raingauge sweep --dir results --tag 2V1P --users 100,200,400 --sizes 4096,8192 --out stats.csv"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse one benchmark log and print validated per-track results
    #[command(
        long_about = "Parse one benchmark log into per-track summary records, validate each against its thresholds, and print the results table.\n\nWith --intervals, one record is produced per reported interval (named <track>-<interval>) instead of one per track."
    )]
    Report(ReportArgs),

    /// Aggregate repeated-run logs into mean/stddev/95%-CI statistics
    #[command(
        long_about = "Read the repeated-run logs of a benchmark sweep (one file per run, named expt_<tag>_users_<users>_size_<size>_run_<run>.log), aggregate each (size, users) configuration across its runs, and emit a statistics CSV.\n\nMissing or unparsable run logs are reported on stderr and skipped; the sweep always completes."
    )]
    Sweep(SweepArgs),
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Path to the benchmark log
    pub log: PathBuf,

    /// Produce one record per reported interval instead of final results
    #[arg(long)]
    pub intervals: bool,

    /// Threshold config file (YAML; `.json` files are parsed as JSON)
    #[arg(long)]
    pub thresholds: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,
}

#[derive(Debug, Args)]
pub struct SweepArgs {
    /// Directory containing the repeated-run logs
    #[arg(long, env = "RAINGAUGE_RESULTS_DIR", default_value = ".")]
    pub dir: PathBuf,

    /// Experiment tag embedded in the log file names
    #[arg(long, env = "RAINGAUGE_EXPT_TAG")]
    pub tag: String,

    /// User counts to sweep
    #[arg(long, value_delimiter = ',', required = true)]
    pub users: Vec<u64>,

    /// Workload sizes to sweep
    #[arg(long, value_delimiter = ',', required = true)]
    pub sizes: Vec<u64>,

    /// Repeated runs per configuration
    #[arg(long, env = "RAINGAUGE_REPEATS", default_value_t = 4)]
    pub repeats: u32,

    /// Operations given the full statistics treatment
    #[arg(long, value_delimiter = ',', default_values_t = ["Get".to_string(), "Put".to_string()])]
    pub ops: Vec<String>,

    /// Write the CSV here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}
