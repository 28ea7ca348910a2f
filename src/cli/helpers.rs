//! Shared helper functions for CLI commands

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::project::{Project, ProjectError};
use crate::pipeline::Pipeline;

/// Locate the project from `--project` or by walking up from the cwd
pub fn open_project(global: &GlobalOpts) -> Result<Project> {
    let project = match &global.project {
        Some(path) => Project::discover_from(path),
        None => Project::discover(),
    };
    project.map_err(|e| miette::miette!("{}", e))
}

/// Locate the project, initializing one in place when none exists
pub fn open_or_init_project(global: &GlobalOpts) -> Result<Project> {
    let start = match &global.project {
        Some(path) => path.clone(),
        None => std::env::current_dir().into_diagnostic()?,
    };
    match Project::discover_from(&start) {
        Ok(project) => Ok(project),
        Err(ProjectError::NotFound { .. }) => {
            std::fs::create_dir_all(&start).into_diagnostic()?;
            let project = Project::init(&start).map_err(|e| miette::miette!("{}", e))?;
            tracing::info!(root = %project.root().display(), "initialized new project");
            Ok(project)
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}

/// Open the project and build a pipeline from its configuration
pub fn open_pipeline(global: &GlobalOpts) -> Result<(Project, Config, Pipeline)> {
    let project = open_project(global)?;
    let config = Config::load_for(Some(&project));
    let pipeline = Pipeline::new(project.layout(), &config)?;
    Ok((project, config, pipeline))
}

/// Write content to a file, or to stdout when no path is given
pub fn write_output(content: &str, output_path: Option<PathBuf>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            eprintln!("Output written to: {}", path.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

/// Print a "✓ <what> <path>" line unless quiet
pub fn print_written(global: &GlobalOpts, what: &str, path: &Path) {
    if !global.quiet {
        println!(
            "{} {} {}",
            style("✓").green(),
            what,
            style(path.display()).cyan()
        );
    }
}

/// Truncate a string to max_len, adding "..." if truncated
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
