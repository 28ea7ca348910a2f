//! Pipeline error kinds

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the measurement-to-report pipeline
///
/// None of these are retried. Each one ends the current pipeline run.
#[derive(Debug, Error, Diagnostic)]
pub enum BallbarError {
    #[error("no records available: {what}")]
    #[diagnostic(
        code(bbt::empty_input),
        help("collect at least one record set first (`bbt collect` or `bbt run`)")
    )]
    EmptyInput { what: String },

    #[error("{} does not have the expected columns (missing: {})", .path.display(), .missing.join(", "))]
    #[diagnostic(
        code(bbt::schema_mismatch),
        help("record tables need the columns timestamp, machine_id, operator, test_id, axis, angle_deg, radius_nominal_mm, radius_measured_mm, deviation_mm")
    )]
    SchemaMismatch { path: PathBuf, missing: Vec<String> },

    #[error("duplicate join key ({machine_id}, {axis}, {angle_deg}) in {side} set")]
    #[diagnostic(
        code(bbt::duplicate_key),
        help("strict comparison requires (machine_id, axis, angle_deg) to be unique within each set")
    )]
    DuplicateKey {
        side: &'static str,
        machine_id: String,
        axis: String,
        angle_deg: f64,
    },

    #[error("invalid thresholds: small_dev ({small}) must be >= 0 and below medium_dev ({medium})")]
    #[diagnostic(code(bbt::thresholds))]
    InvalidThresholds { small: f64, medium: f64 },

    #[error("IO error: {0}")]
    #[diagnostic(code(bbt::io))]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    #[diagnostic(code(bbt::csv))]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    #[diagnostic(code(bbt::json))]
    Json(#[from] serde_json::Error),

    #[error("template rendering error: {0}")]
    #[diagnostic(code(bbt::template))]
    Template(#[from] tera::Error),
}

impl BallbarError {
    pub fn empty(what: impl Into<String>) -> Self {
        BallbarError::EmptyInput { what: what.into() }
    }
}

pub type Result<T, E = BallbarError> = std::result::Result<T, E>;
