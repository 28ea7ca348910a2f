//! Collector: device readings to timestamped measurement records

use chrono::{DateTime, Local};
use std::path::PathBuf;

use crate::core::device::BallbarDevice;
use crate::core::error::Result;
use crate::core::storage::RecordStore;
use crate::entities::{MeasurementRecord, RecordSet, StorageKey};

/// Format of generated test ids (sortable date-time)
pub const TEST_ID_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Format of record and registry timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Outcome of one collection run
#[derive(Debug, Clone)]
pub struct Collected {
    pub set: RecordSet,
    /// Where the record set was stored
    pub path: PathBuf,
}

/// Turns raw device samples into stored record sets
pub struct Collector<D: BallbarDevice> {
    device: D,
    store: RecordStore,
}

impl<D: BallbarDevice> Collector<D> {
    pub fn new(device: D, store: RecordStore) -> Self {
        Self { device, store }
    }

    /// Collect one record set stamped with the current local time
    pub fn collect(
        &mut self,
        machine_id: &str,
        operator: &str,
        test_id: Option<&str>,
    ) -> Result<Collected> {
        self.collect_at(machine_id, operator, test_id, Local::now())
    }

    /// Collect one record set stamped with `now`
    pub fn collect_at(
        &mut self,
        machine_id: &str,
        operator: &str,
        test_id: Option<&str>,
        now: DateTime<Local>,
    ) -> Result<Collected> {
        let test_id = match test_id {
            Some(id) => id.to_string(),
            None => now.format(TEST_ID_FORMAT).to_string(),
        };
        let timestamp = now.format(TIMESTAMP_FORMAT).to_string();

        let records: Vec<MeasurementRecord> = self
            .device
            .read_samples()
            .iter()
            .map(|sample| {
                MeasurementRecord::from_sample(sample, &timestamp, machine_id, operator, &test_id)
            })
            .collect();
        tracing::debug!(machine_id, test_id = %test_id, rows = records.len(), "collected samples");

        let set = RecordSet {
            key: StorageKey::new(machine_id, test_id),
            records,
        };
        let path = self.store.save(&set)?;
        Ok(Collected { set, path })
    }
}
