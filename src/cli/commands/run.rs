//! `bbt run` command - the fixed collect-to-report pipeline
//!
//! Also what `bbt` does when invoked without a command. A project is
//! initialized in place when none is found.

use console::style;
use miette::Result;

use crate::cli::helpers::{open_or_init_project, print_written};
use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::device::SampleDevice;
use crate::entities::DeviationClass;
use crate::pipeline::{CollectOptions, Pipeline};

#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// Override the configured machine id
    #[arg(long, short = 'm')]
    pub machine: Option<String>,

    /// Override the configured operator
    #[arg(long)]
    pub operator: Option<String>,
}

pub fn run(args: RunArgs, global: &GlobalOpts) -> Result<()> {
    let project = open_or_init_project(global)?;
    let config = Config::load_for(Some(&project));
    let pipeline = Pipeline::new(project.layout(), &config)?;

    let mut opts = CollectOptions::from_config(&config);
    if let Some(machine) = args.machine {
        opts.machine_id = machine;
    }
    if let Some(operator) = args.operator {
        opts.operator = operator;
    }

    tracing::info!(machine = %opts.machine_id, "running ballbar pipeline");
    let (collect, analysis) = pipeline.run(SampleDevice, &opts)?;

    print_written(global, "Saved measurement", &collect.collected.path);
    if let Some(entry) = &collect.entry {
        if !global.quiet {
            println!(
                "{} Registered test {}",
                style("✓").green(),
                style(&entry.test_id).cyan()
            );
        }
    }
    print_written(global, "Control chart", &collect.control_chart);
    for artifact in &analysis.artifacts {
        print_written(global, "Wrote", artifact);
    }
    print_written(global, "Report", &analysis.report);

    if !global.quiet {
        let (mut ok, mut medium, mut high) = (0, 0, 0);
        for count in &analysis.class_counts {
            match count.error_class {
                DeviationClass::Ok => ok += count.count,
                DeviationClass::Medium => medium += count.count,
                DeviationClass::High => high += count.count,
            }
        }
        println!();
        println!(
            "{} points across {} machine/axis groups: {} OK, {} MEDIUM, {} HIGH",
            analysis.record_count,
            analysis.stats.len(),
            style(ok).green(),
            style(medium).yellow(),
            style(high).red()
        );
    }

    Ok(())
}
