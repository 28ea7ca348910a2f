//! Test metadata entry (registry row)

use serde::{Deserialize, Serialize};

/// Default test type for ballbar runs
pub const DEFAULT_TEST_TYPE: &str = "circular";

/// Provenance of one collection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestMetadataEntry {
    /// Stem of the record file (`<machine_id>_<test_id>`)
    pub test_id: String,

    /// Path of the record file
    pub file: String,

    pub machine_id: String,

    pub operator: String,

    pub description: String,

    pub test_type: String,

    /// Registration time (ISO-8601, local time)
    pub created_at: String,
}
