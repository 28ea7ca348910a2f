//! Tabular export rows
//!
//! Flat, serializable views over upstream results. Rows copy values; they
//! never compute new ones.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

use crate::core::classify::{ClassifiedRecord, ErrorClassCount};
use crate::core::compare::{ComparisonRecord, DeltaSummary};
use crate::core::error::Result;
use crate::core::stats::AggregateStat;
use crate::entities::{DeviationClass, SourcedRecord, RECORD_COLUMNS};

/// A serializable export row with a fixed column list
///
/// The columns are written as the header even when there are no rows.
pub trait ExportRow: Serialize {
    const COLUMNS: &'static [&'static str];
}

impl<T: ExportRow> ExportRow for &T {
    const COLUMNS: &'static [&'static str] = T::COLUMNS;
}

/// `all_measurements.csv` row: record columns plus the source file name
#[derive(Debug, Serialize)]
pub struct SourcedRow<'a> {
    pub timestamp: &'a str,
    pub machine_id: &'a str,
    pub operator: &'a str,
    pub test_id: &'a str,
    pub axis: &'a str,
    pub angle_deg: f64,
    pub radius_nominal_mm: f64,
    pub radius_measured_mm: f64,
    pub deviation_mm: f64,
    pub source_file: &'a str,
}

impl<'a> From<&'a SourcedRecord> for SourcedRow<'a> {
    fn from(s: &'a SourcedRecord) -> Self {
        let r = &s.record;
        Self {
            timestamp: &r.timestamp,
            machine_id: &r.machine_id,
            operator: &r.operator,
            test_id: &r.test_id,
            axis: &r.axis,
            angle_deg: r.angle_deg,
            radius_nominal_mm: r.radius_nominal_mm,
            radius_measured_mm: r.radius_measured_mm,
            deviation_mm: r.deviation_mm,
            source_file: &s.source_file,
        }
    }
}

impl ExportRow for SourcedRow<'_> {
    const COLUMNS: &'static [&'static str] = &[
        RECORD_COLUMNS[0],
        RECORD_COLUMNS[1],
        RECORD_COLUMNS[2],
        RECORD_COLUMNS[3],
        RECORD_COLUMNS[4],
        RECORD_COLUMNS[5],
        RECORD_COLUMNS[6],
        RECORD_COLUMNS[7],
        RECORD_COLUMNS[8],
        "source_file",
    ];
}

/// `deviation_stats.csv` row
#[derive(Debug, Serialize)]
pub struct StatRow<'a> {
    pub machine_id: &'a str,
    pub axis: &'a str,
    pub deviation_mean_mm: f64,
    pub deviation_std_mm: Option<f64>,
    pub deviation_max_mm: f64,
    pub deviation_min_mm: f64,
    pub n_points: usize,
}

impl<'a> From<&'a AggregateStat> for StatRow<'a> {
    fn from(s: &'a AggregateStat) -> Self {
        Self {
            machine_id: &s.machine_id,
            axis: &s.axis,
            deviation_mean_mm: s.mean,
            deviation_std_mm: s.std,
            deviation_max_mm: s.max,
            deviation_min_mm: s.min,
            n_points: s.count,
        }
    }
}

impl ExportRow for StatRow<'_> {
    const COLUMNS: &'static [&'static str] = &[
        "machine_id",
        "axis",
        "deviation_mean_mm",
        "deviation_std_mm",
        "deviation_max_mm",
        "deviation_min_mm",
        "n_points",
    ];
}

/// Measurement columns plus `error_class`
#[derive(Debug, Serialize)]
pub struct ClassifiedRow<'a> {
    pub timestamp: &'a str,
    pub machine_id: &'a str,
    pub operator: &'a str,
    pub test_id: &'a str,
    pub axis: &'a str,
    pub angle_deg: f64,
    pub radius_nominal_mm: f64,
    pub radius_measured_mm: f64,
    pub deviation_mm: f64,
    pub error_class: DeviationClass,
}

impl<'a> From<&'a ClassifiedRecord> for ClassifiedRow<'a> {
    fn from(c: &'a ClassifiedRecord) -> Self {
        let r = &c.record;
        Self {
            timestamp: &r.timestamp,
            machine_id: &r.machine_id,
            operator: &r.operator,
            test_id: &r.test_id,
            axis: &r.axis,
            angle_deg: r.angle_deg,
            radius_nominal_mm: r.radius_nominal_mm,
            radius_measured_mm: r.radius_measured_mm,
            deviation_mm: r.deviation_mm,
            error_class: c.error_class,
        }
    }
}

impl ExportRow for ClassifiedRow<'_> {
    const COLUMNS: &'static [&'static str] = &[
        RECORD_COLUMNS[0],
        RECORD_COLUMNS[1],
        RECORD_COLUMNS[2],
        RECORD_COLUMNS[3],
        RECORD_COLUMNS[4],
        RECORD_COLUMNS[5],
        RECORD_COLUMNS[6],
        RECORD_COLUMNS[7],
        RECORD_COLUMNS[8],
        "error_class",
    ];
}

/// `pre_post_comparison.csv` row
#[derive(Debug, Serialize)]
pub struct ComparisonRow<'a> {
    pub machine_id: &'a str,
    pub axis: &'a str,
    pub angle_deg: f64,
    pub test_id_pre: &'a str,
    pub test_id_post: &'a str,
    pub radius_measured_mm_pre: f64,
    pub radius_measured_mm_post: f64,
    pub deviation_mm_pre: f64,
    pub deviation_mm_post: f64,
    pub delta_dev_mm: f64,
}

impl<'a> From<&'a ComparisonRecord> for ComparisonRow<'a> {
    fn from(c: &'a ComparisonRecord) -> Self {
        Self {
            machine_id: c.machine_id(),
            axis: c.axis(),
            angle_deg: c.angle_deg(),
            test_id_pre: &c.pre.test_id,
            test_id_post: &c.post.test_id,
            radius_measured_mm_pre: c.pre.radius_measured_mm,
            radius_measured_mm_post: c.post.radius_measured_mm,
            deviation_mm_pre: c.pre.deviation_mm,
            deviation_mm_post: c.post.deviation_mm,
            delta_dev_mm: c.delta_dev_mm,
        }
    }
}

impl ExportRow for ComparisonRow<'_> {
    const COLUMNS: &'static [&'static str] = &[
        "machine_id",
        "axis",
        "angle_deg",
        "test_id_pre",
        "test_id_post",
        "radius_measured_mm_pre",
        "radius_measured_mm_post",
        "deviation_mm_pre",
        "deviation_mm_post",
        "delta_dev_mm",
    ];
}

impl ExportRow for ErrorClassCount {
    const COLUMNS: &'static [&'static str] = &["machine_id", "axis", "error_class", "count"];
}

impl ExportRow for DeltaSummary {
    const COLUMNS: &'static [&'static str] = &["machine_id", "mean_delta_mm", "n_points"];
}

/// Error-class counts of one machine, summed over axes, zero-filled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPivotRow {
    pub machine_id: String,
    #[serde(rename = "OK")]
    pub ok: usize,
    #[serde(rename = "MEDIUM")]
    pub medium: usize,
    #[serde(rename = "HIGH")]
    pub high: usize,
}

impl ErrorPivotRow {
    pub fn get(&self, class: DeviationClass) -> usize {
        match class {
            DeviationClass::Ok => self.ok,
            DeviationClass::Medium => self.medium,
            DeviationClass::High => self.high,
        }
    }
}

impl ExportRow for ErrorPivotRow {
    const COLUMNS: &'static [&'static str] = &["machine_id", "OK", "MEDIUM", "HIGH"];
}

/// Pivot long-form counts to one row per machine
///
/// Classes absent for a machine are filled with zero here, on the consumer
/// side, as the counts themselves only list present combinations.
pub fn pivot_error_counts(counts: &[ErrorClassCount]) -> Vec<ErrorPivotRow> {
    let mut rows: BTreeMap<&str, ErrorPivotRow> = BTreeMap::new();
    for c in counts {
        let row = rows
            .entry(c.machine_id.as_str())
            .or_insert_with(|| ErrorPivotRow {
                machine_id: c.machine_id.clone(),
                ok: 0,
                medium: 0,
                high: 0,
            });
        match c.error_class {
            DeviationClass::Ok => row.ok += c.count,
            DeviationClass::Medium => row.medium += c.count,
            DeviationClass::High => row.high += c.count,
        }
    }
    rows.into_values().collect()
}

/// Serialize rows to a CSV file with a header line
///
/// An empty export still gets its header so the file keeps its schema.
pub fn write_csv<T: ExportRow>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut written = 0usize;
    for row in rows {
        writer.serialize(row)?;
        written += 1;
    }
    if written == 0 {
        writer.write_record(T::COLUMNS)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(machine: &str, axis: &str, class: DeviationClass, n: usize) -> ErrorClassCount {
        ErrorClassCount {
            machine_id: machine.into(),
            axis: axis.into(),
            error_class: class,
            count: n,
        }
    }

    #[test]
    fn test_pivot_zero_fills_and_sums_axes() {
        let counts = vec![
            count("CNC_01", "XY", DeviationClass::Medium, 3),
            count("CNC_01", "YZ", DeviationClass::Medium, 1),
            count("CNC_02", "XY", DeviationClass::High, 2),
        ];
        let pivot = pivot_error_counts(&counts);

        assert_eq!(
            pivot,
            vec![
                ErrorPivotRow { machine_id: "CNC_01".into(), ok: 0, medium: 4, high: 0 },
                ErrorPivotRow { machine_id: "CNC_02".into(), ok: 0, medium: 0, high: 2 },
            ]
        );
        assert_eq!(pivot[1].get(DeviationClass::High), 2);
    }

    #[test]
    fn test_undefined_std_is_empty_cell() {
        let stat = AggregateStat {
            machine_id: "CNC_01".into(),
            axis: "XY".into(),
            mean: 0.01,
            std: None,
            max: 0.01,
            min: 0.01,
            count: 1,
        };
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("stats.csv");
        write_csv(&path, [StatRow::from(&stat)]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "machine_id,axis,deviation_mean_mm,deviation_std_mm,deviation_max_mm,deviation_min_mm,n_points"
        );
        assert_eq!(lines.next().unwrap(), "CNC_01,XY,0.01,,0.01,0.01,1");
    }

    #[test]
    fn test_empty_export_keeps_header() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("pre_post_comparison.csv");
        write_csv(&path, Vec::<ComparisonRow<'_>>::new()).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim_end(), ComparisonRow::COLUMNS.join(","));
    }

    #[test]
    fn test_declared_columns_match_serialized_header() {
        let stat = AggregateStat {
            machine_id: "CNC_01".into(),
            axis: "XY".into(),
            mean: 0.0,
            std: Some(0.0),
            max: 0.0,
            min: 0.0,
            count: 2,
        };
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("stats.csv");
        write_csv(&path, [StatRow::from(&stat)]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().next().unwrap(), StatRow::COLUMNS.join(","));

        let sourced = SourcedRecord {
            source_file: "CNC_01_T1.csv".into(),
            record: crate::entities::MeasurementRecord::from_sample(
                &crate::entities::RawSample::new("XY", 0.0, 150.0, 149.98),
                "t",
                "CNC_01",
                "op",
                "T1",
            ),
        };
        let path = tmp.path().join("all.csv");
        write_csv(&path, [SourcedRow::from(&sourced)]).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), SourcedRow::COLUMNS.join(","));
        assert!(lines.next().unwrap().ends_with(",CNC_01_T1.csv"));
    }
}
