//! Measurement record entity (one ballbar reading)

use serde::{Deserialize, Serialize};
use std::fmt;

/// Column order of a stored record set
pub const RECORD_COLUMNS: [&str; 9] = [
    "timestamp",
    "machine_id",
    "operator",
    "test_id",
    "axis",
    "angle_deg",
    "radius_nominal_mm",
    "radius_measured_mm",
    "deviation_mm",
];

/// A raw reading as returned by the ballbar device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    /// Plane of the circular move (e.g. "XY")
    pub axis: String,

    /// Angular position on the circle in degrees
    pub angle_deg: f64,

    /// Programmed radius in mm
    pub radius_nominal_mm: f64,

    /// Radius reported by the ballbar in mm
    pub radius_measured_mm: f64,
}

impl RawSample {
    pub fn new(axis: impl Into<String>, angle_deg: f64, nominal: f64, measured: f64) -> Self {
        Self {
            axis: axis.into(),
            angle_deg,
            radius_nominal_mm: nominal,
            radius_measured_mm: measured,
        }
    }
}

/// A single measurement row
///
/// `deviation_mm` is fixed when the record is built from a [`RawSample`] and is
/// carried as-is by every downstream component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementRecord {
    /// Collection timestamp (ISO-8601, local time)
    pub timestamp: String,

    pub machine_id: String,

    pub operator: String,

    pub test_id: String,

    pub axis: String,

    pub angle_deg: f64,

    pub radius_nominal_mm: f64,

    pub radius_measured_mm: f64,

    /// radius_measured_mm - radius_nominal_mm
    pub deviation_mm: f64,
}

impl MeasurementRecord {
    /// Build a record from a device sample, computing the deviation
    pub fn from_sample(
        sample: &RawSample,
        timestamp: &str,
        machine_id: &str,
        operator: &str,
        test_id: &str,
    ) -> Self {
        Self {
            timestamp: timestamp.to_string(),
            machine_id: machine_id.to_string(),
            operator: operator.to_string(),
            test_id: test_id.to_string(),
            axis: sample.axis.clone(),
            angle_deg: sample.angle_deg,
            radius_nominal_mm: sample.radius_nominal_mm,
            radius_measured_mm: sample.radius_measured_mm,
            deviation_mm: sample.radius_measured_mm - sample.radius_nominal_mm,
        }
    }
}

/// Identifies one stored record set: one file per (machine, test)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    pub machine_id: String,
    pub test_id: String,
}

impl StorageKey {
    pub fn new(machine_id: impl Into<String>, test_id: impl Into<String>) -> Self {
        Self {
            machine_id: machine_id.into(),
            test_id: test_id.into(),
        }
    }

    /// File stem used for the record file and derived artifacts
    ///
    /// Path separators and other characters not allowed in file names are
    /// replaced with `_`, so the stem never leaves its directory.
    pub fn file_stem(&self) -> String {
        format!(
            "{}_{}",
            sanitize_component(&self.machine_id),
            sanitize_component(&self.test_id)
        )
    }
}

fn sanitize_component(value: &str) -> String {
    value
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_stem())
    }
}

/// A loaded record with the name of the file it came from
#[derive(Debug, Clone, PartialEq)]
pub struct SourcedRecord {
    pub source_file: String,
    pub record: MeasurementRecord,
}

/// Records produced by one collection run
#[derive(Debug, Clone)]
pub struct RecordSet {
    pub key: StorageKey,
    pub records: Vec<MeasurementRecord>,
}

impl RecordSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
