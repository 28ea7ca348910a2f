//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    classify::ClassifyArgs, collect::CollectArgs, compare::CompareArgs,
    completions::CompletionsArgs, feedrate::FeedrateArgs, init::InitArgs,
    registry::RegistryCommands, report::ReportArgs, run::RunArgs, stats::StatsArgs,
};

#[derive(Parser)]
#[command(name = "bbt")]
#[command(author, version, about = "Ballbar calibration toolkit")]
#[command(long_about = "Collects CNC ballbar measurements, classifies radius deviations and produces comparison reports. Runs the full pipeline when no command is given.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Project root (default: auto-detect by finding .bbt/)
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new ballbar project
    Init(InitArgs),

    /// Run the full pipeline (collect, register, analyse, report)
    Run(RunArgs),

    /// Collect one record set from the ballbar device
    Collect(CollectArgs),

    /// Test metadata registry
    #[command(subcommand)]
    Registry(RegistryCommands),

    /// Deviation statistics per machine and axis
    Stats(StatsArgs),

    /// Classify deviations into OK / MEDIUM / HIGH
    Classify(ClassifyArgs),

    /// Compare pre- and post-calibration measurements
    Compare(CompareArgs),

    /// Feed-rate advice from mean deviation per machine
    Feedrate(FeedrateArgs),

    /// Regenerate exports, charts and the HTML report from stored data
    Report(ReportArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown table on a terminal
    #[default]
    Auto,
    /// Markdown tables
    Md,
    /// Comma-separated values (for spreadsheets)
    Csv,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
}
