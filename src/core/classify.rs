//! Classifier: deviation severity against configurable thresholds

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::error::{BallbarError, Result};
use crate::entities::{DeviationClass, MeasurementRecord};

/// Tolerance applied at band boundaries (mm)
///
/// Decimal readings such as 149.97 - 150.0 land a few ulps of the radius
/// past 0.03. One ulp of a 150 mm radius is about 3e-14, so this absorbs
/// subtraction noise for radii up to a few metres and nothing coarser.
const BOUNDARY_EPSILON: f64 = 1e-12;

/// Upper bounds of the OK and MEDIUM bands in mm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ErrorThresholds {
    pub small_dev: f64,
    pub medium_dev: f64,
}

impl Default for ErrorThresholds {
    fn default() -> Self {
        Self {
            small_dev: 0.01,
            medium_dev: 0.03,
        }
    }
}

impl ErrorThresholds {
    /// Build thresholds, rejecting bands that are negative or out of order
    pub fn new(small_dev: f64, medium_dev: f64) -> Result<Self> {
        let thresholds = Self {
            small_dev,
            medium_dev,
        };
        thresholds.validate()?;
        Ok(thresholds)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.small_dev >= 0.0 && self.small_dev < self.medium_dev) {
            return Err(BallbarError::InvalidThresholds {
                small: self.small_dev,
                medium: self.medium_dev,
            });
        }
        Ok(())
    }
}

/// Classify one deviation; each band includes its upper bound
pub fn classify(deviation_mm: f64, thresholds: &ErrorThresholds) -> DeviationClass {
    let magnitude = deviation_mm.abs();
    if magnitude <= thresholds.small_dev + BOUNDARY_EPSILON {
        DeviationClass::Ok
    } else if magnitude <= thresholds.medium_dev + BOUNDARY_EPSILON {
        DeviationClass::Medium
    } else {
        DeviationClass::High
    }
}

/// A measurement paired with its error class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRecord {
    pub record: MeasurementRecord,
    pub error_class: DeviationClass,
}

/// Classify every record; the input is left untouched
pub fn classify_all(
    records: &[MeasurementRecord],
    thresholds: &ErrorThresholds,
) -> Vec<ClassifiedRecord> {
    records
        .iter()
        .map(|record| ClassifiedRecord {
            record: record.clone(),
            error_class: classify(record.deviation_mm, thresholds),
        })
        .collect()
}

/// Number of points in one (machine_id, axis, class) cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorClassCount {
    pub machine_id: String,
    pub axis: String,
    pub error_class: DeviationClass,
    pub count: usize,
}

/// Count classified records by (machine_id, axis, class)
///
/// Only combinations that occur are returned; there is no zero-fill.
pub fn aggregate_error_classes(classified: &[ClassifiedRecord]) -> Vec<ErrorClassCount> {
    let mut counts: BTreeMap<(&str, &str, DeviationClass), usize> = BTreeMap::new();
    for c in classified {
        *counts
            .entry((c.record.machine_id.as_str(), c.record.axis.as_str(), c.error_class))
            .or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((machine_id, axis, error_class), count)| ErrorClassCount {
            machine_id: machine_id.to_string(),
            axis: axis.to_string(),
            error_class,
            count,
        })
        .collect()
}

/// Records of a single class, e.g. the HIGH-only diagnostics view
pub fn filter_class(classified: &[ClassifiedRecord], class: DeviationClass) -> Vec<ClassifiedRecord> {
    classified
        .iter()
        .filter(|c| c.error_class == class)
        .cloned()
        .collect()
}

/// Point count and mean deviation of one (machine_id, axis) group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassGroupSummary {
    pub machine_id: String,
    pub axis: String,
    pub n_points: usize,
    pub mean_dev_mm: f64,
}

/// Group classified records by (machine_id, axis)
///
/// Usually applied after [`filter_class`] to see where HIGH points cluster.
pub fn summarize_groups(classified: &[ClassifiedRecord]) -> Vec<ClassGroupSummary> {
    let mut groups: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();
    for c in classified {
        groups
            .entry((c.record.machine_id.as_str(), c.record.axis.as_str()))
            .or_default()
            .push(c.record.deviation_mm);
    }

    groups
        .into_iter()
        .map(|((machine_id, axis), mut devs)| {
            devs.sort_by(|a, b| a.total_cmp(b));
            ClassGroupSummary {
                machine_id: machine_id.to_string(),
                axis: axis.to_string(),
                n_points: devs.len(),
                mean_dev_mm: devs.iter().sum::<f64>() / devs.len() as f64,
            }
        })
        .collect()
}
