//! `bbt feedrate` command - feed-rate advice per machine

use console::style;
use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{open_pipeline, write_output};
use crate::cli::table::{render, OutputTable};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::advisor::{suggest_feedrate_adjustments, ACTION_REDUCE};
use crate::report::format_mm;

#[derive(clap::Args, Debug)]
pub struct FeedrateArgs {
    /// Mean deviation (mm) above which a reduction is advised (default: from config)
    #[arg(long)]
    pub max_dev: Option<f64>,

    /// Write to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: FeedrateArgs, global: &GlobalOpts) -> Result<()> {
    let (_, config, pipeline) = open_pipeline(global)?;
    let max_dev = args.max_dev.unwrap_or_else(|| config.max_allowed_dev());
    if max_dev.is_nan() || max_dev < 0.0 {
        return Err(miette::miette!("--max-dev must be a non-negative number, got {}", max_dev));
    }

    let records = pipeline.store().load_all()?;
    let advice = suggest_feedrate_adjustments(&records, max_dev);

    let color = global.format == OutputFormat::Auto && args.output.is_none();
    let mut table = OutputTable::new(["machine_id", "mean_dev_mm", "action"]);
    for a in &advice {
        let action = if color && a.action == ACTION_REDUCE {
            style(a.action).red().to_string()
        } else {
            a.action.to_string()
        };
        table.push([a.machine_id.clone(), format_mm(a.mean_dev_mm), action]);
    }

    let output = render(&table, &advice, global.format)?;
    write_output(&output, args.output)
}
