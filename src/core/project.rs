//! Project discovery and data directory layout

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the marker directory holding project configuration
pub const PROJECT_DIR: &str = ".bbt";

/// Represents a ballbar project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .bbt/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create a new project structure at the given path
    pub fn init(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        if root.join(PROJECT_DIR).exists() {
            return Err(ProjectError::AlreadyExists(root));
        }

        Self::init_force(&root)
    }

    /// Force initialization even if .bbt/ exists
    ///
    /// An existing config.yaml is left untouched.
    pub fn init_force(path: &Path) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        let bbt_dir = root.join(PROJECT_DIR);
        std::fs::create_dir_all(&bbt_dir).map_err(|e| ProjectError::IoError(e.to_string()))?;

        let config_path = bbt_dir.join("config.yaml");
        if !config_path.exists() {
            std::fs::write(&config_path, Self::default_config())
                .map_err(|e| ProjectError::IoError(e.to_string()))?;
        }

        let project = Self { root };
        project
            .layout()
            .ensure()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(project)
    }

    fn default_config() -> &'static str {
        r#"# Ballbar Toolkit Project Configuration

# Machine and operator used by `bbt run` and as `bbt collect` defaults
# machine_id: CNC_01
# operator: Operator

# Deviation class thresholds in mm (|dev| <= small_dev is OK, <= medium_dev is MEDIUM)
# thresholds:
#   small_dev: 0.01
#   medium_dev: 0.03

# Mean deviation above which `bbt feedrate` advises reducing the feedrate
# max_allowed_dev: 0.02

# Rows of measurement data included in the HTML report
# sample_rows: 50
"#
    }

    /// Get the project root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the .bbt configuration directory
    pub fn bbt_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    /// Data directory layout rooted at this project
    pub fn layout(&self) -> DataLayout {
        DataLayout::new(self.root.join("data"))
    }
}

/// Directory configuration shared by every pipeline component
///
/// Constructing a layout touches nothing on disk. Call [`DataLayout::ensure`]
/// once before running the pipeline.
#[derive(Debug, Clone)]
pub struct DataLayout {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub meta_dir: PathBuf,
    pub analysis_dir: PathBuf,
    pub reports_dir: PathBuf,
    pub plots_dir: PathBuf,
}

impl DataLayout {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            raw_dir: data_dir.join("raw"),
            processed_dir: data_dir.join("processed"),
            meta_dir: data_dir.join("meta"),
            analysis_dir: data_dir.join("analysis"),
            reports_dir: data_dir.join("reports"),
            plots_dir: data_dir.join("plots"),
        }
    }

    /// Create every data directory
    pub fn ensure(&self) -> std::io::Result<()> {
        for dir in self.dirs() {
            std::fs::create_dir_all(dir)?;
        }
        tracing::debug!(raw = %self.raw_dir.display(), "data directories ready");
        Ok(())
    }

    pub fn dirs(&self) -> [&Path; 6] {
        [
            &self.raw_dir,
            &self.processed_dir,
            &self.meta_dir,
            &self.analysis_dir,
            &self.reports_dir,
            &self.plots_dir,
        ]
    }

    /// Backing file of the metadata registry
    pub fn metadata_file(&self) -> PathBuf {
        self.meta_dir.join("tests_metadata.json")
    }
}

/// Errors that can occur during project operations
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("not a ballbar project (searched from {searched_from:?}). Run 'bbt init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("ballbar project already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}
