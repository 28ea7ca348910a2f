//! Core module - pipeline components and supporting infrastructure

pub mod advisor;
pub mod classify;
pub mod collector;
pub mod compare;
pub mod config;
pub mod device;
pub mod error;
pub mod project;
pub mod registry;
pub mod stats;
pub mod storage;

pub use advisor::{suggest_feedrate_adjustments, FeedrateAdvice};
pub use classify::{
    aggregate_error_classes, classify, classify_all, filter_class, summarize_groups,
    ClassGroupSummary, ClassifiedRecord, ErrorClassCount, ErrorThresholds,
};
pub use collector::{Collected, Collector};
pub use compare::{compare, compare_with, summarize_deltas, ComparisonRecord, DeltaSummary, JoinMode};
pub use config::Config;
pub use device::{BallbarDevice, ReplayDevice, SampleDevice};
pub use error::BallbarError;
pub use project::{DataLayout, Project, ProjectError};
pub use registry::MetadataRegistry;
pub use stats::{compute_stats, AggregateStat};
pub use storage::RecordStore;
