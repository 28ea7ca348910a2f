//! Fixed measurement-to-report pipeline
//!
//! Wires the components together over one [`DataLayout`]:
//! collect → register → aggregate/classify → export → report, plus the
//! optional pre/post comparison.

use std::path::{Path, PathBuf};

use crate::core::classify::{aggregate_error_classes, classify_all, ClassifiedRecord, ErrorClassCount, ErrorThresholds};
use crate::core::collector::{Collected, Collector};
use crate::core::compare::{compare_with, summarize_deltas, ComparisonRecord, DeltaSummary, JoinMode};
use crate::core::config::Config;
use crate::core::device::BallbarDevice;
use crate::core::error::Result;
use crate::core::project::DataLayout;
use crate::core::registry::MetadataRegistry;
use crate::core::stats::{compute_stats, AggregateStat};
use crate::core::storage::{read_records, write_template, RecordStore};
use crate::entities::{TestMetadataEntry, DEFAULT_TEST_TYPE};
use crate::report::{ReportInput, Reporter};

/// Description registered by the fixed pipeline run
pub const DEFAULT_DESCRIPTION: &str = "Initial circular motion test";

/// Parameters of one collection
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub machine_id: String,
    pub operator: String,
    pub test_id: Option<String>,
    pub description: String,
    pub test_type: String,
    /// Append an entry to the metadata registry
    pub register: bool,
}

impl CollectOptions {
    /// Options for the configured machine and operator
    pub fn from_config(config: &Config) -> Self {
        Self {
            machine_id: config.machine_id(),
            operator: config.operator(),
            test_id: None,
            description: DEFAULT_DESCRIPTION.to_string(),
            test_type: DEFAULT_TEST_TYPE.to_string(),
            register: true,
        }
    }
}

#[derive(Debug)]
pub struct CollectOutcome {
    pub collected: Collected,
    pub entry: Option<TestMetadataEntry>,
    pub control_chart: PathBuf,
}

/// Results and artifacts of the analysis stage
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub record_count: usize,
    pub stats: Vec<AggregateStat>,
    pub classified: Vec<ClassifiedRecord>,
    pub class_counts: Vec<ErrorClassCount>,
    pub artifacts: Vec<PathBuf>,
    pub report: PathBuf,
}

#[derive(Debug)]
pub struct ComparisonOutcome {
    pub comparisons: Vec<ComparisonRecord>,
    pub summary: Vec<DeltaSummary>,
    pub artifacts: Vec<PathBuf>,
}

/// All pipeline components bound to one data layout
pub struct Pipeline {
    layout: DataLayout,
    thresholds: ErrorThresholds,
    sample_rows: usize,
    store: RecordStore,
    registry: MetadataRegistry,
    reporter: Reporter,
}

impl Pipeline {
    /// Build the components; thresholds are validated here
    pub fn new(layout: DataLayout, config: &Config) -> Result<Self> {
        let thresholds = config.thresholds();
        thresholds.validate()?;

        Ok(Self {
            store: RecordStore::new(&layout.raw_dir),
            registry: MetadataRegistry::new(layout.metadata_file()),
            reporter: Reporter::new(layout.clone())?,
            thresholds,
            sample_rows: config.sample_rows(),
            layout,
        })
    }

    pub fn with_thresholds(mut self, thresholds: ErrorThresholds) -> Result<Self> {
        thresholds.validate()?;
        self.thresholds = thresholds;
        Ok(self)
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    pub fn thresholds(&self) -> &ErrorThresholds {
        &self.thresholds
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// One-time setup: data directories and the empty record template
    pub fn prepare(&self) -> Result<PathBuf> {
        self.layout.ensure()?;
        write_template(&self.layout.processed_dir)
    }

    /// Collect, store, optionally register, and chart one record set
    pub fn collect<D: BallbarDevice>(&self, device: D, opts: &CollectOptions) -> Result<CollectOutcome> {
        let mut collector = Collector::new(device, self.store.clone());
        let collected = collector.collect(&opts.machine_id, &opts.operator, opts.test_id.as_deref())?;

        let entry = if opts.register {
            Some(self.registry.register(
                &collected.path,
                &opts.machine_id,
                &opts.operator,
                &opts.description,
                &opts.test_type,
            )?)
        } else {
            None
        };

        let control_chart = self.reporter.control_chart(&collected.set)?;
        Ok(CollectOutcome {
            collected,
            entry,
            control_chart,
        })
    }

    /// Aggregate and classify everything stored, then write all exports
    pub fn analyse(&self) -> Result<AnalysisOutcome> {
        let sourced = self.store.load_sourced()?;
        let records: Vec<_> = sourced.iter().map(|s| s.record.clone()).collect();
        tracing::debug!(rows = records.len(), "loaded all measurements");

        let stats = compute_stats(&records)?;
        let classified = classify_all(&records, &self.thresholds);
        let class_counts = aggregate_error_classes(&classified);

        let mut artifacts = vec![
            self.reporter.export_records(&sourced)?,
            self.reporter.export_stats(&stats)?,
            self.reporter.stats_chart(&stats)?,
            self.reporter.export_classified(&classified)?,
        ];
        let (long, pivot) = self.reporter.export_error_counts(&class_counts)?;
        artifacts.push(long);
        artifacts.push(pivot);

        let error_chart = self.reporter.error_chart(&class_counts)?;
        let report = self.reporter.html_report(&ReportInput {
            stats: &stats,
            class_counts: &class_counts,
            classified: &classified,
            thresholds: &self.thresholds,
            sample_rows: self.sample_rows,
            chart: &error_chart,
        })?;
        artifacts.push(error_chart);

        Ok(AnalysisOutcome {
            record_count: records.len(),
            stats,
            classified,
            class_counts,
            artifacts,
            report,
        })
    }

    /// The fixed sequence: prepare, collect and register, analyse
    pub fn run<D: BallbarDevice>(&self, device: D, opts: &CollectOptions) -> Result<(CollectOutcome, AnalysisOutcome)> {
        self.prepare()?;
        let collected = self.collect(device, opts)?;
        let analysis = self.analyse()?;
        Ok((collected, analysis))
    }

    /// Join two record tables and export the deltas
    pub fn compare_files(&self, pre: &Path, post: &Path, mode: JoinMode) -> Result<ComparisonOutcome> {
        let pre_records = read_records(pre)?;
        let post_records = read_records(post)?;

        let comparisons = compare_with(&pre_records, &post_records, mode)?;
        let summary = summarize_deltas(&comparisons);

        let (rows, totals) = self.reporter.export_comparison(&comparisons, &summary)?;
        let mut artifacts = vec![rows, totals];
        if !summary.is_empty() {
            artifacts.push(self.reporter.delta_chart(&summary)?);
        }

        Ok(ComparisonOutcome {
            comparisons,
            summary,
            artifacts,
        })
    }
}
