//! Metadata registry: append-only log of collection runs
//!
//! The whole list is rewritten on every save with no locking. Callers must
//! serialize registrations; concurrent writers lose updates (last one wins).

use chrono::Local;
use std::path::{Path, PathBuf};

use crate::core::collector::TIMESTAMP_FORMAT;
use crate::core::error::Result;
use crate::entities::TestMetadataEntry;

/// JSON-backed list of [`TestMetadataEntry`]
#[derive(Debug, Clone)]
pub struct MetadataRegistry {
    path: PathBuf,
}

impl MetadataRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries in registration order; a missing store is an empty list
    pub fn load(&self) -> Result<Vec<TestMetadataEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Overwrite the store with `entries`
    pub fn save(&self, entries: &[TestMetadataEntry]) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Append an entry for a stored record set
    ///
    /// The test id is the record file's stem. Duplicate ids are appended as
    /// separate entries; existing entries are never modified.
    pub fn register(
        &self,
        record_file: &Path,
        machine_id: &str,
        operator: &str,
        description: &str,
        test_type: &str,
    ) -> Result<TestMetadataEntry> {
        let mut entries = self.load()?;

        let test_id = record_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let entry = TestMetadataEntry {
            test_id,
            file: record_file.display().to_string(),
            machine_id: machine_id.to_string(),
            operator: operator.to_string(),
            description: description.to_string(),
            test_type: test_type.to_string(),
            created_at: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        };
        entries.push(entry.clone());
        self.save(&entries)?;

        tracing::info!(test_id = %entry.test_id, total = entries.len(), "registered test");
        Ok(entry)
    }

    /// Every entry registered under `test_id`
    pub fn find(&self, test_id: &str) -> Result<Vec<TestMetadataEntry>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|e| e.test_id == test_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::DEFAULT_TEST_TYPE;
    use tempfile::tempdir;

    fn registry() -> (tempfile::TempDir, MetadataRegistry) {
        let tmp = tempdir().unwrap();
        let registry = MetadataRegistry::new(tmp.path().join("tests_metadata.json"));
        (tmp, registry)
    }

    #[test]
    fn test_load_missing_store_is_empty() {
        let (_tmp, registry) = registry();
        assert!(registry.load().unwrap().is_empty());
    }

    #[test]
    fn test_register_preserves_insertion_order() {
        let (_tmp, registry) = registry();
        let a = registry
            .register(Path::new("raw/CNC_01_A.csv"), "CNC_01", "op", "first", DEFAULT_TEST_TYPE)
            .unwrap();
        let b = registry
            .register(Path::new("raw/CNC_02_B.csv"), "CNC_02", "op", "second", "linear")
            .unwrap();

        let entries = registry.load().unwrap();
        assert_eq!(entries, vec![a, b]);
        assert_eq!(entries[0].test_id, "CNC_01_A");
        assert_eq!(entries[0].test_type, "circular");
        assert_eq!(entries[1].test_type, "linear");
    }

    #[test]
    fn test_duplicate_test_id_is_appended() {
        let (_tmp, registry) = registry();
        let file = Path::new("raw/CNC_01_A.csv");
        registry.register(file, "CNC_01", "op", "a", DEFAULT_TEST_TYPE).unwrap();
        registry.register(Path::new("raw/CNC_02_B.csv"), "CNC_02", "op", "b", DEFAULT_TEST_TYPE).unwrap();
        registry.register(file, "CNC_01", "op", "c", DEFAULT_TEST_TYPE).unwrap();

        let entries = registry.load().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].description, "a");
        let dupes = registry.find("CNC_01_A").unwrap();
        assert_eq!(dupes.len(), 2);
        assert_eq!(dupes[1].description, "c");
    }

    #[test]
    fn test_save_rewrites_whole_list() {
        let (_tmp, registry) = registry();
        registry.register(Path::new("x/M_T.csv"), "M", "op", "d", DEFAULT_TEST_TYPE).unwrap();
        registry.save(&[]).unwrap();
        assert!(registry.load().unwrap().is_empty());

        let raw = std::fs::read_to_string(registry.path()).unwrap();
        assert_eq!(raw.trim(), "[]");
    }
}
