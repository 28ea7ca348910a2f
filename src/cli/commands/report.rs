//! `bbt report` command - rebuild every analysis artifact from stored records

use console::style;
use miette::Result;

use crate::cli::helpers::{open_pipeline, print_written};
use crate::cli::GlobalOpts;

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Print only the report path
    #[arg(long)]
    pub path_only: bool,
}

pub fn run(args: ReportArgs, global: &GlobalOpts) -> Result<()> {
    let (_, _, pipeline) = open_pipeline(global)?;
    pipeline.prepare()?;

    let analysis = pipeline.analyse()?;

    if args.path_only {
        println!("{}", analysis.report.display());
        return Ok(());
    }

    for artifact in &analysis.artifacts {
        print_written(global, "Wrote", artifact);
    }
    print_written(global, "Report", &analysis.report);
    if !global.quiet {
        println!(
            "{} {} points in {} machine/axis groups",
            style("→").blue(),
            analysis.record_count,
            analysis.stats.len()
        );
    }
    Ok(())
}
