//! Record-set files: one delimited table per (machine, test)

use std::path::{Path, PathBuf};

use crate::core::error::{BallbarError, Result};
use crate::entities::{MeasurementRecord, RecordSet, SourcedRecord, StorageKey, RECORD_COLUMNS};

/// File name of the empty header-only table
pub const TEMPLATE_FILE: &str = "ballbar_template.csv";

/// Reads and writes record sets under the raw data directory
#[derive(Debug, Clone)]
pub struct RecordStore {
    raw_dir: PathBuf,
}

impl RecordStore {
    pub fn new(raw_dir: impl Into<PathBuf>) -> Self {
        Self {
            raw_dir: raw_dir.into(),
        }
    }

    /// Path a record set with this key is stored at
    pub fn path_for(&self, key: &StorageKey) -> PathBuf {
        self.raw_dir.join(format!("{}.csv", key.file_stem()))
    }

    /// Persist a record set, replacing any file with the same key
    pub fn save(&self, set: &RecordSet) -> Result<PathBuf> {
        let path = self.path_for(&set.key);
        write_records(&path, &set.records)?;
        tracing::info!(path = %path.display(), rows = set.len(), "stored record set");
        Ok(path)
    }

    /// Load every stored record set, concatenated in file-name order
    pub fn load_all(&self) -> Result<Vec<MeasurementRecord>> {
        Ok(self
            .load_sourced()?
            .into_iter()
            .map(|sourced| sourced.record)
            .collect())
    }

    /// Like [`RecordStore::load_all`], keeping each row's file name
    pub fn load_sourced(&self) -> Result<Vec<SourcedRecord>> {
        let files = self.record_files();
        if files.is_empty() {
            return Err(BallbarError::empty(format!(
                "no record files in {}",
                self.raw_dir.display()
            )));
        }

        let mut records = Vec::new();
        for file in &files {
            let rows = read_records(file)?;
            tracing::debug!(path = %file.display(), rows = rows.len(), "loaded record file");
            let source_file = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            records.extend(rows.into_iter().map(|record| SourcedRecord {
                source_file: source_file.clone(),
                record,
            }));
        }

        if records.is_empty() {
            return Err(BallbarError::empty(format!(
                "record files in {} contain no rows",
                self.raw_dir.display()
            )));
        }
        Ok(records)
    }

    /// All `*.csv` files in the raw directory, sorted by name
    pub fn record_files(&self) -> Vec<PathBuf> {
        if !self.raw_dir.exists() {
            return Vec::new();
        }
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(&self.raw_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "csv"))
            .map(|e| e.path().to_path_buf())
            .collect();
        files.sort();
        files
    }
}

/// Write records as a table with exactly the record columns
pub fn write_records(path: &Path, records: &[MeasurementRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    if records.is_empty() {
        writer.write_record(RECORD_COLUMNS)?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a record table, checking its header first
///
/// Extra columns (e.g. `error_class` on classified exports) are ignored.
pub fn read_records(path: &Path) -> Result<Vec<MeasurementRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let missing: Vec<String> = RECORD_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h.trim() == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(BallbarError::SchemaMismatch {
            path: path.to_path_buf(),
            missing,
        });
    }

    let mut records = Vec::new();
    for row in reader.deserialize() {
        records.push(row?);
    }
    Ok(records)
}

/// Write the empty header-only table operators fill by hand
pub fn write_template(processed_dir: &Path) -> Result<PathBuf> {
    let path = processed_dir.join(TEMPLATE_FILE);
    write_records(&path, &[])?;
    tracing::debug!(path = %path.display(), "wrote record template");
    Ok(path)
}
