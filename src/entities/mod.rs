//! Entity types for ballbar measurements and their provenance

pub mod classes;
pub mod measurement;
pub mod metadata;

pub use classes::DeviationClass;
pub use measurement::{
    MeasurementRecord, RawSample, RecordSet, SourcedRecord, StorageKey, RECORD_COLUMNS,
};
pub use metadata::{TestMetadataEntry, DEFAULT_TEST_TYPE};
