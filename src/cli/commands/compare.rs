//! `bbt compare` command - pre/post calibration deltas

use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::helpers::{open_pipeline, print_written, write_output};
use crate::cli::table::{render, OutputTable};
use crate::cli::GlobalOpts;
use crate::core::compare::JoinMode;
use crate::report::format_mm;

#[derive(clap::Args, Debug)]
pub struct CompareArgs {
    /// Record table measured before calibration
    pub pre: PathBuf,

    /// Record table measured after calibration
    pub post: PathBuf,

    /// Fail when a (machine, axis, angle) key repeats on either side
    #[arg(long)]
    pub strict: bool,

    /// Write the delta summary to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: CompareArgs, global: &GlobalOpts) -> Result<()> {
    let (_, _, pipeline) = open_pipeline(global)?;
    pipeline.layout().ensure().into_diagnostic()?;

    let mode = if args.strict {
        JoinMode::Strict
    } else {
        JoinMode::CrossProduct
    };
    let outcome = pipeline.compare_files(&args.pre, &args.post, mode)?;

    for artifact in &outcome.artifacts {
        print_written(global, "Wrote", artifact);
    }
    if outcome.comparisons.is_empty() {
        if !global.quiet {
            eprintln!("No matching (machine, axis, angle) points between the two tables.");
        }
        return Ok(());
    }

    let mut table = OutputTable::new(["machine_id", "mean_delta_mm", "n_points"]);
    for s in &outcome.summary {
        table.push([
            s.machine_id.clone(),
            format_mm(s.mean_delta_mm),
            s.n_points.to_string(),
        ]);
    }
    let output = render(&table, &outcome.summary, global.format)?;
    write_output(&output, args.output)
}
