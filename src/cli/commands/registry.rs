//! `bbt registry` command - inspect the test metadata registry

use clap::Subcommand;
use miette::Result;

use crate::cli::helpers::{open_project, truncate_str, write_output};
use crate::cli::table::{render, OutputTable};
use crate::cli::GlobalOpts;
use crate::core::registry::MetadataRegistry;
use crate::entities::TestMetadataEntry;

#[derive(Subcommand, Debug)]
pub enum RegistryCommands {
    /// List registered tests in registration order
    List {
        /// Only tests of this machine
        #[arg(long, short = 'm')]
        machine: Option<String>,
    },

    /// Show every entry registered under a test id
    Show {
        /// Test id (record file stem, e.g. CNC_01_20240101_120000)
        test_id: String,
    },
}

pub fn run(cmd: RegistryCommands, global: &GlobalOpts) -> Result<()> {
    let project = open_project(global)?;
    let registry = MetadataRegistry::new(project.layout().metadata_file());

    let entries = match cmd {
        RegistryCommands::List { machine } => {
            let mut entries = registry.load()?;
            if let Some(machine) = machine {
                entries.retain(|e| e.machine_id == machine);
            }
            entries
        }
        RegistryCommands::Show { test_id } => {
            let entries = registry.find(&test_id)?;
            if entries.is_empty() {
                return Err(miette::miette!("No registered test with id '{}'", test_id));
            }
            entries
        }
    };

    if entries.is_empty() {
        if !global.quiet {
            eprintln!("No tests registered yet.");
        }
        return Ok(());
    }

    let output = render(&entries_table(&entries), &entries, global.format)?;
    write_output(&output, None)
}

fn entries_table(entries: &[TestMetadataEntry]) -> OutputTable {
    let mut table = OutputTable::new([
        "test_id",
        "machine_id",
        "operator",
        "test_type",
        "created_at",
        "description",
    ]);
    for e in entries {
        table.push([
            e.test_id.clone(),
            e.machine_id.clone(),
            e.operator.clone(),
            e.test_type.clone(),
            e.created_at.clone(),
            truncate_str(&e.description, 40),
        ]);
    }
    table
}
