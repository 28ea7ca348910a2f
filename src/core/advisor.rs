//! Feed-rate advice from mean deviation per machine

use serde::Serialize;
use std::collections::BTreeMap;

use crate::entities::MeasurementRecord;

/// Mean deviation (mm) above which a feed-rate reduction is advised
pub const DEFAULT_MAX_ALLOWED_DEV: f64 = 0.02;

pub const ACTION_REDUCE: &str = "reduce feedrate";
pub const ACTION_OK: &str = "ok";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedrateAdvice {
    pub machine_id: String,
    pub mean_dev_mm: f64,
    pub action: &'static str,
}

/// One advice row per machine, ordered by machine id
pub fn suggest_feedrate_adjustments(
    records: &[MeasurementRecord],
    max_allowed_dev: f64,
) -> Vec<FeedrateAdvice> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in records {
        groups.entry(r.machine_id.as_str()).or_default().push(r.deviation_mm);
    }

    groups
        .into_iter()
        .map(|(machine_id, mut devs)| {
            devs.sort_by(|a, b| a.total_cmp(b));
            let mean_dev_mm = devs.iter().sum::<f64>() / devs.len() as f64;
            let action = if mean_dev_mm.abs() > max_allowed_dev {
                ACTION_REDUCE
            } else {
                ACTION_OK
            };
            FeedrateAdvice {
                machine_id: machine_id.to_string(),
                mean_dev_mm,
                action,
            }
        })
        .collect()
}
