//! `bbt stats` command - deviation statistics per machine and axis

use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{open_pipeline, write_output};
use crate::cli::table::{render, OutputTable};
use crate::cli::GlobalOpts;
use crate::core::stats::{compute_stats, AggregateStat};
use crate::report::export::StatRow;
use crate::report::format_mm;

#[derive(clap::Args, Debug)]
pub struct StatsArgs {
    /// Only this machine
    #[arg(long, short = 'm')]
    pub machine: Option<String>,

    /// Write to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: StatsArgs, global: &GlobalOpts) -> Result<()> {
    let (_, _, pipeline) = open_pipeline(global)?;

    let mut records = pipeline.store().load_all()?;
    if let Some(machine) = &args.machine {
        records.retain(|r| &r.machine_id == machine);
    }
    let stats = compute_stats(&records)?;

    let rows: Vec<StatRow<'_>> = stats.iter().map(StatRow::from).collect();
    let output = render(&stats_table(&stats), &rows, global.format)?;
    write_output(&output, args.output)
}

fn stats_table(stats: &[AggregateStat]) -> OutputTable {
    let mut table = OutputTable::new([
        "machine_id",
        "axis",
        "deviation_mean_mm",
        "deviation_std_mm",
        "deviation_max_mm",
        "deviation_min_mm",
        "n_points",
    ]);
    for s in stats {
        table.push([
            s.machine_id.clone(),
            s.axis.clone(),
            format_mm(s.mean),
            s.std.map(format_mm).unwrap_or_default(),
            format_mm(s.max),
            format_mm(s.min),
            s.count.to_string(),
        ]);
    }
    table
}
