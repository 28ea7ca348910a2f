//! `bbt classify` command - deviation classes per point or per group

use miette::Result;
use std::path::PathBuf;

use crate::cli::helpers::{open_pipeline, write_output};
use crate::cli::table::{render, OutputTable};
use crate::cli::GlobalOpts;
use crate::core::classify::{
    aggregate_error_classes, classify_all, filter_class, summarize_groups, ErrorThresholds,
};
use crate::entities::DeviationClass;
use crate::report::export::ClassifiedRow;
use crate::report::format_mm;

#[derive(clap::Args, Debug)]
pub struct ClassifyArgs {
    /// Upper bound (mm) of the OK class (default: from config)
    #[arg(long)]
    pub small_dev: Option<f64>,

    /// Upper bound (mm) of the MEDIUM class (default: from config)
    #[arg(long)]
    pub medium_dev: Option<f64>,

    /// Only points of this class (ok, medium, high)
    #[arg(long, short = 'c')]
    pub class: Option<DeviationClass>,

    /// Show counts per machine, axis and class instead of points
    #[arg(long, conflicts_with = "summary")]
    pub counts: bool,

    /// Show point count and mean deviation per machine and axis
    #[arg(long)]
    pub summary: bool,

    /// Write to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

pub fn run(args: ClassifyArgs, global: &GlobalOpts) -> Result<()> {
    let (_, _, pipeline) = open_pipeline(global)?;
    let configured = *pipeline.thresholds();
    let pipeline = pipeline.with_thresholds(ErrorThresholds {
        small_dev: args.small_dev.unwrap_or(configured.small_dev),
        medium_dev: args.medium_dev.unwrap_or(configured.medium_dev),
    })?;

    let records = pipeline.store().load_all()?;
    let mut classified = classify_all(&records, pipeline.thresholds());
    if let Some(class) = args.class {
        classified = filter_class(&classified, class);
    }

    let output = if args.summary {
        let summary = summarize_groups(&classified);
        let mut table = OutputTable::new(["machine_id", "axis", "n_points", "mean_dev_mm"]);
        for g in &summary {
            table.push([
                g.machine_id.clone(),
                g.axis.clone(),
                g.n_points.to_string(),
                format_mm(g.mean_dev_mm),
            ]);
        }
        render(&table, &summary, global.format)?
    } else if args.counts {
        let counts = aggregate_error_classes(&classified);
        let mut table = OutputTable::new(["machine_id", "axis", "error_class", "count"]);
        for c in &counts {
            table.push([
                c.machine_id.clone(),
                c.axis.clone(),
                c.error_class.to_string(),
                c.count.to_string(),
            ]);
        }
        render(&table, &counts, global.format)?
    } else {
        let mut table = OutputTable::new([
            "test_id",
            "machine_id",
            "axis",
            "angle_deg",
            "deviation_mm",
            "error_class",
        ]);
        for c in &classified {
            table.push([
                c.record.test_id.clone(),
                c.record.machine_id.clone(),
                c.record.axis.clone(),
                c.record.angle_deg.to_string(),
                format_mm(c.record.deviation_mm),
                c.error_class.to_string(),
            ]);
        }
        let rows: Vec<ClassifiedRow<'_>> = classified.iter().map(ClassifiedRow::from).collect();
        render(&table, &rows, global.format)?
    };

    write_output(&output, args.output)
}
