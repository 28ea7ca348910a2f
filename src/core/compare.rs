//! Comparator: pre/post calibration join on (machine_id, axis, angle_deg)

use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::core::error::{BallbarError, Result};
use crate::entities::MeasurementRecord;

/// How repeated join keys are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinMode {
    /// Emit every matching pre/post pair
    #[default]
    CrossProduct,
    /// Fail with `DuplicateKey` if a key repeats within either set
    Strict,
}

/// Hashable join key; the angle is keyed by its bit pattern
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct JoinKey<'a> {
    machine_id: &'a str,
    axis: &'a str,
    angle_bits: u64,
}

impl<'a> JoinKey<'a> {
    fn of(record: &'a MeasurementRecord) -> Self {
        // -0.0 and 0.0 must meet
        let angle = if record.angle_deg == 0.0 { 0.0 } else { record.angle_deg };
        Self {
            machine_id: &record.machine_id,
            axis: &record.axis,
            angle_bits: angle.to_bits(),
        }
    }
}

/// One matched pre/post pair
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonRecord {
    pub pre: MeasurementRecord,
    pub post: MeasurementRecord,
    /// post.deviation_mm - pre.deviation_mm
    pub delta_dev_mm: f64,
}

impl ComparisonRecord {
    pub fn machine_id(&self) -> &str {
        &self.pre.machine_id
    }

    pub fn axis(&self) -> &str {
        &self.pre.axis
    }

    pub fn angle_deg(&self) -> f64 {
        self.pre.angle_deg
    }
}

/// Inner-join pre and post records, emitting every matching pair
///
/// Rows without a partner are dropped and counted in a warning. Keys are expected to be
/// unique within each set; duplicates multiply (cross product).
pub fn compare(pre: &[MeasurementRecord], post: &[MeasurementRecord]) -> Vec<ComparisonRecord> {
    join(pre, post)
}

/// Like [`compare`], with explicit duplicate-key handling
pub fn compare_with(
    pre: &[MeasurementRecord],
    post: &[MeasurementRecord],
    mode: JoinMode,
) -> Result<Vec<ComparisonRecord>> {
    if mode == JoinMode::Strict {
        ensure_unique(pre, "pre")?;
        ensure_unique(post, "post")?;
    }
    Ok(join(pre, post))
}

fn join(pre: &[MeasurementRecord], post: &[MeasurementRecord]) -> Vec<ComparisonRecord> {
    let mut post_index: HashMap<JoinKey<'_>, Vec<&MeasurementRecord>> = HashMap::new();
    for record in post {
        post_index.entry(JoinKey::of(record)).or_default().push(record);
    }

    let mut out = Vec::new();
    let mut unmatched_pre = 0usize;
    for p in pre {
        match post_index.get(&JoinKey::of(p)) {
            Some(matches) => {
                for q in matches {
                    out.push(ComparisonRecord {
                        pre: p.clone(),
                        post: (*q).clone(),
                        delta_dev_mm: q.deviation_mm - p.deviation_mm,
                    });
                }
            }
            None => unmatched_pre += 1,
        }
    }

    let pre_keys: HashSet<JoinKey<'_>> = pre.iter().map(JoinKey::of).collect();
    let unmatched_post = post
        .iter()
        .filter(|q| !pre_keys.contains(&JoinKey::of(q)))
        .count();
    if unmatched_pre > 0 || unmatched_post > 0 {
        tracing::warn!(unmatched_pre, unmatched_post, "rows without a partner dropped from comparison");
    }

    out
}

fn ensure_unique(records: &[MeasurementRecord], side: &'static str) -> Result<()> {
    let mut seen = HashSet::new();
    for record in records {
        if !seen.insert(JoinKey::of(record)) {
            return Err(BallbarError::DuplicateKey {
                side,
                machine_id: record.machine_id.clone(),
                axis: record.axis.clone(),
                angle_deg: record.angle_deg,
            });
        }
    }
    Ok(())
}

/// Mean change of deviation per machine
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeltaSummary {
    pub machine_id: String,
    pub mean_delta_mm: f64,
    pub n_points: usize,
}

/// Summarize comparison rows per machine, ordered by machine id
pub fn summarize_deltas(comparisons: &[ComparisonRecord]) -> Vec<DeltaSummary> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for c in comparisons {
        groups.entry(c.machine_id()).or_default().push(c.delta_dev_mm);
    }

    groups
        .into_iter()
        .map(|(machine_id, mut deltas)| {
            deltas.sort_by(|a, b| a.total_cmp(b));
            DeltaSummary {
                machine_id: machine_id.to_string(),
                mean_delta_mm: deltas.iter().sum::<f64>() / deltas.len() as f64,
                n_points: deltas.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::RawSample;

    fn rec(machine: &str, angle: f64, measured: f64) -> MeasurementRecord {
        MeasurementRecord::from_sample(
            &RawSample::new("XY", angle, 150.0, measured),
            "2026-01-01T00:00:00",
            machine,
            "op",
            "T",
        )
    }

    #[test]
    fn test_identical_sets_have_zero_delta() {
        let set = vec![
            rec("m1", 0.0, 149.98),
            rec("m1", 90.0, 150.02),
            rec("m2", 0.0, 149.97),
        ];
        let result = compare(&set, &set);
        assert_eq!(result.len(), set.len());
        assert!(result.iter().all(|c| c.delta_dev_mm == 0.0));
    }

    #[test]
    fn test_unmatched_angle_yields_empty_result() {
        let pre = vec![rec("m1", 0.0, 149.98)];
        let post = vec![rec("m1", 90.0, 150.02)];
        assert!(compare(&pre, &post).is_empty());
    }

    #[test]
    fn test_delta_is_post_minus_pre() {
        let pre = vec![rec("m1", 0.0, 149.97), rec("m1", 90.0, 150.02)];
        let post = vec![rec("m1", 90.0, 150.005), rec("m1", 0.0, 149.99)];
        let result = compare(&pre, &post);

        assert_eq!(result.len(), 2);
        // pre order is kept
        assert_eq!(result[0].angle_deg(), 0.0);
        assert!((result[0].delta_dev_mm - 0.02).abs() < 1e-9);
        assert!((result[1].delta_dev_mm + 0.015).abs() < 1e-9);
    }

    #[test]
    fn test_keys_include_machine_and_axis() {
        let pre = vec![rec("m1", 0.0, 150.0)];
        let mut other_axis = rec("m1", 0.0, 150.0);
        other_axis.axis = "YZ".to_string();
        let post = vec![rec("m2", 0.0, 150.0), other_axis];
        assert!(compare(&pre, &post).is_empty());
    }

    #[test]
    fn test_negative_zero_angle_matches() {
        let pre = vec![rec("m1", -0.0, 150.0)];
        let post = vec![rec("m1", 0.0, 150.01)];
        assert_eq!(compare(&pre, &post).len(), 1);
    }

    #[test]
    fn test_duplicate_keys_cross_product() {
        let pre = vec![rec("m1", 0.0, 150.0), rec("m1", 0.0, 150.01)];
        let post = vec![
            rec("m1", 0.0, 150.02),
            rec("m1", 0.0, 150.03),
            rec("m1", 0.0, 150.04),
        ];
        assert_eq!(compare(&pre, &post).len(), 6);
    }

    #[test]
    fn test_strict_mode_rejects_duplicates() {
        let pre = vec![rec("m1", 0.0, 150.0)];
        let post = vec![rec("m1", 0.0, 150.02), rec("m1", 0.0, 150.03)];

        let err = compare_with(&pre, &post, JoinMode::Strict).unwrap_err();
        match err {
            BallbarError::DuplicateKey { side, machine_id, .. } => {
                assert_eq!(side, "post");
                assert_eq!(machine_id, "m1");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(compare_with(&pre, &post, JoinMode::CrossProduct).unwrap().len(), 2);
    }

    #[test]
    fn test_summarize_deltas_per_machine() {
        let pre = vec![rec("m2", 0.0, 150.0), rec("m1", 0.0, 150.0), rec("m1", 90.0, 150.0)];
        let post = vec![rec("m2", 0.0, 149.99), rec("m1", 0.0, 150.01), rec("m1", 90.0, 150.03)];
        let summary = summarize_deltas(&compare(&pre, &post));

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].machine_id, "m1");
        assert_eq!(summary[0].n_points, 2);
        assert!((summary[0].mean_delta_mm - 0.02).abs() < 1e-9);
        assert!((summary[1].mean_delta_mm + 0.01).abs() < 1e-9);
    }
}
