//! Aggregator: descriptive statistics of deviation per machine and axis

use serde::Serialize;
use std::collections::BTreeMap;

use crate::core::error::{BallbarError, Result};
use crate::entities::MeasurementRecord;

/// Deviation statistics for one (machine_id, axis) group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateStat {
    pub machine_id: String,
    pub axis: String,
    pub mean: f64,
    /// Sample standard deviation (n - 1); `None` for single-point groups
    pub std: Option<f64>,
    pub max: f64,
    pub min: f64,
    pub count: usize,
}

/// Group deviations by (machine_id, axis) and describe each group
///
/// Groups come out sorted by machine id, then axis. Values are sorted before
/// summation so the result does not depend on input order.
pub fn compute_stats(records: &[MeasurementRecord]) -> Result<Vec<AggregateStat>> {
    if records.is_empty() {
        return Err(BallbarError::empty("cannot aggregate an empty record set"));
    }

    let mut groups: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.machine_id.as_str(), record.axis.as_str()))
            .or_default()
            .push(record.deviation_mm);
    }

    let stats = groups
        .into_iter()
        .map(|((machine_id, axis), mut values)| {
            values.sort_by(|a, b| a.total_cmp(b));
            let stat = describe(machine_id, axis, &values);
            if stat.std.is_none() {
                tracing::warn!(machine_id, axis, "single-point group, standard deviation undefined");
            }
            stat
        })
        .collect();

    Ok(stats)
}

/// Describe a non-empty, sorted list of deviations
fn describe(machine_id: &str, axis: &str, sorted: &[f64]) -> AggregateStat {
    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std = if n > 1 {
        let variance = sorted.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        Some(variance.sqrt())
    } else {
        None
    };

    AggregateStat {
        machine_id: machine_id.to_string(),
        axis: axis.to_string(),
        mean,
        std,
        max: sorted[n - 1],
        min: sorted[0],
        count: n,
    }
}
