//! `bbt collect` command - take one measurement from the ballbar

use console::style;
use miette::Result;

use crate::cli::helpers::{open_pipeline, print_written};
use crate::cli::GlobalOpts;
use crate::core::device::SampleDevice;
use crate::entities::DEFAULT_TEST_TYPE;
use crate::pipeline::{CollectOptions, DEFAULT_DESCRIPTION};

#[derive(clap::Args, Debug)]
pub struct CollectArgs {
    /// Machine id (default: from config)
    #[arg(long, short = 'm')]
    pub machine: Option<String>,

    /// Operator name (default: from config)
    #[arg(long)]
    pub operator: Option<String>,

    /// Test id (default: local time as YYYYMMDD_HHMMSS)
    #[arg(long)]
    pub test_id: Option<String>,

    /// Description stored in the metadata registry
    #[arg(long, short = 'd', default_value = DEFAULT_DESCRIPTION)]
    pub description: String,

    /// Test type stored in the metadata registry
    #[arg(long, default_value = DEFAULT_TEST_TYPE)]
    pub test_type: String,

    /// Do not append an entry to the metadata registry
    #[arg(long)]
    pub no_register: bool,
}

pub fn run(args: CollectArgs, global: &GlobalOpts) -> Result<()> {
    let (_, config, pipeline) = open_pipeline(global)?;
    pipeline.prepare()?;

    let defaults = CollectOptions::from_config(&config);
    let opts = CollectOptions {
        machine_id: args.machine.unwrap_or(defaults.machine_id),
        operator: args.operator.unwrap_or(defaults.operator),
        test_id: args.test_id,
        description: args.description,
        test_type: args.test_type,
        register: !args.no_register,
    };

    let outcome = pipeline.collect(SampleDevice, &opts)?;

    print_written(
        global,
        &format!("Saved {} points to", outcome.collected.set.len()),
        &outcome.collected.path,
    );
    if let Some(entry) = &outcome.entry {
        if !global.quiet {
            println!(
                "{} Registered test {}",
                style("✓").green(),
                style(&entry.test_id).cyan()
            );
        }
    }
    print_written(global, "Control chart", &outcome.control_chart);

    Ok(())
}
