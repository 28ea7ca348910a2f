//! Reporter: exports, charts and the HTML report
//!
//! Everything here formats results computed by the core components. No
//! statistic, class or delta is recomputed on this side.

pub mod chart;
pub mod export;
pub mod template;

use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::core::classify::{ClassifiedRecord, ErrorClassCount, ErrorThresholds};
use crate::core::compare::{ComparisonRecord, DeltaSummary};
use crate::core::error::Result;
use crate::core::project::DataLayout;
use crate::core::stats::AggregateStat;
use crate::entities::{DeviationClass, RecordSet, SourcedRecord};

use chart::{Bar, BarChart, LineChart, Segment};
use export::{pivot_error_counts, write_csv, ClassifiedRow, ComparisonRow, SourcedRow, StatRow};
use template::{TemplateRenderer, REPORT_TEMPLATE};

/// Rows of measurement data embedded in the HTML report
pub const DEFAULT_SAMPLE_ROWS: usize = 50;

pub const ALL_MEASUREMENTS_FILE: &str = "all_measurements.csv";
pub const STATS_FILE: &str = "deviation_stats.csv";
pub const CLASSIFIED_FILE: &str = "all_measurements_with_classes.csv";
pub const CLASS_COUNTS_FILE: &str = "error_class_counts.csv";
pub const CLASS_PIVOT_FILE: &str = "error_classes_by_machine.csv";
pub const COMPARISON_FILE: &str = "pre_post_comparison.csv";
pub const DELTA_SUMMARY_FILE: &str = "pre_post_delta_summary.csv";

pub const STATS_CHART_FILE: &str = "deviation_summary.svg";
pub const ERROR_CHART_FILE: &str = "error_classes_by_machine.svg";
pub const DELTA_CHART_FILE: &str = "post_calib_delta.svg";

pub const REPORT_FILE: &str = "ballbar_error_report.html";

const CLASS_COLORS: [&str; 3] = ["#2ca02c", "#ff7f0e", "#d62728"];

/// Inputs of the composite HTML report
pub struct ReportInput<'a> {
    pub stats: &'a [AggregateStat],
    pub class_counts: &'a [ErrorClassCount],
    pub classified: &'a [ClassifiedRecord],
    pub thresholds: &'a ErrorThresholds,
    pub sample_rows: usize,
    /// Chart embedded in the report, normally one under the plots directory
    pub chart: &'a Path,
}

/// Stat formatted for display
#[derive(Debug, Serialize)]
struct StatView<'a> {
    machine_id: &'a str,
    axis: &'a str,
    mean: String,
    std: String,
    max: String,
    min: String,
    count: usize,
}

impl<'a> From<&'a AggregateStat> for StatView<'a> {
    fn from(s: &'a AggregateStat) -> Self {
        Self {
            machine_id: &s.machine_id,
            axis: &s.axis,
            mean: format_mm(s.mean),
            std: s.std.map(format_mm).unwrap_or_else(|| "NaN".to_string()),
            max: format_mm(s.max),
            min: format_mm(s.min),
            count: s.count,
        }
    }
}

/// Millimetre value to micron resolution
pub fn format_mm(value: f64) -> String {
    format!("{:.4}", value)
}

/// Writes every pipeline artifact into a [`DataLayout`]
pub struct Reporter {
    layout: DataLayout,
    templates: TemplateRenderer,
}

impl Reporter {
    pub fn new(layout: DataLayout) -> Result<Self> {
        Ok(Self {
            layout,
            templates: TemplateRenderer::new()?,
        })
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    fn analysis_path(&self, file: &str) -> PathBuf {
        self.layout.analysis_dir.join(file)
    }

    /// Full record dump with the file each row was loaded from
    pub fn export_records(&self, records: &[SourcedRecord]) -> Result<PathBuf> {
        let path = self.analysis_path(ALL_MEASUREMENTS_FILE);
        write_csv(&path, records.iter().map(SourcedRow::from))?;
        tracing::info!(path = %path.display(), rows = records.len(), "exported measurements");
        Ok(path)
    }

    pub fn export_stats(&self, stats: &[AggregateStat]) -> Result<PathBuf> {
        let path = self.analysis_path(STATS_FILE);
        write_csv(&path, stats.iter().map(StatRow::from))?;
        tracing::info!(path = %path.display(), groups = stats.len(), "exported statistics");
        Ok(path)
    }

    pub fn export_classified(&self, classified: &[ClassifiedRecord]) -> Result<PathBuf> {
        let path = self.analysis_path(CLASSIFIED_FILE);
        write_csv(&path, classified.iter().map(ClassifiedRow::from))?;
        tracing::info!(path = %path.display(), rows = classified.len(), "exported classified measurements");
        Ok(path)
    }

    /// Long-form counts and the zero-filled per-machine pivot
    pub fn export_error_counts(&self, counts: &[ErrorClassCount]) -> Result<(PathBuf, PathBuf)> {
        let long = self.analysis_path(CLASS_COUNTS_FILE);
        write_csv(&long, counts)?;
        let pivot = self.analysis_path(CLASS_PIVOT_FILE);
        write_csv(&pivot, pivot_error_counts(counts))?;
        tracing::info!(path = %pivot.display(), "exported error class summary");
        Ok((long, pivot))
    }

    pub fn export_comparison(
        &self,
        comparisons: &[ComparisonRecord],
        summary: &[DeltaSummary],
    ) -> Result<(PathBuf, PathBuf)> {
        let rows = self.analysis_path(COMPARISON_FILE);
        write_csv(&rows, comparisons.iter().map(ComparisonRow::from))?;
        let totals = self.analysis_path(DELTA_SUMMARY_FILE);
        write_csv(&totals, summary)?;
        tracing::info!(path = %rows.display(), rows = comparisons.len(), "exported pre/post comparison");
        Ok((rows, totals))
    }

    fn write_chart(&self, file: &str, svg: String) -> Result<PathBuf> {
        let path = self.layout.plots_dir.join(file);
        std::fs::write(&path, svg)?;
        tracing::info!(path = %path.display(), "wrote chart");
        Ok(path)
    }

    /// Deviation over angle for one record set
    pub fn control_chart(&self, set: &RecordSet) -> Result<PathBuf> {
        let chart = LineChart {
            title: format!("Ballbar control chart: {}", set.key),
            x_label: "Angle [deg]".to_string(),
            y_label: "Radius deviation [mm]".to_string(),
            points: set
                .records
                .iter()
                .map(|r| (r.angle_deg, r.deviation_mm))
                .collect(),
            precision: 3,
        };
        let svg = self.templates.render_chart(&chart.layout())?;
        self.write_chart(&format!("{}_control_chart.svg", set.key.file_stem()), svg)
    }

    /// Mean deviation per machine/axis, colored by machine
    pub fn stats_chart(&self, stats: &[AggregateStat]) -> Result<PathBuf> {
        let mut machines: Vec<String> = stats.iter().map(|s| s.machine_id.clone()).collect();
        machines.dedup();

        let bars = stats
            .iter()
            .map(|s| Bar {
                label: format!("{}_{}", s.axis, s.machine_id),
                segments: vec![Segment {
                    series: machines.iter().position(|m| *m == s.machine_id).unwrap_or(0),
                    value: s.mean,
                }],
            })
            .collect();

        let chart = BarChart {
            title: "Mean ballbar deviation by machine and axis".to_string(),
            y_label: "Mean radius deviation [mm]".to_string(),
            series: machines,
            colors: Vec::new(),
            bars,
            precision: 3,
        };
        let svg = self.templates.render_chart(&chart.layout())?;
        self.write_chart(STATS_CHART_FILE, svg)
    }

    /// Stacked class counts per machine
    pub fn error_chart(&self, counts: &[ErrorClassCount]) -> Result<PathBuf> {
        let bars = pivot_error_counts(counts)
            .into_iter()
            .map(|row| Bar {
                segments: DeviationClass::ALL
                    .iter()
                    .enumerate()
                    .map(|(i, class)| Segment {
                        series: i,
                        value: row.get(*class) as f64,
                    })
                    .collect(),
                label: row.machine_id,
            })
            .collect();

        let chart = BarChart {
            title: "Ballbar error classes by machine".to_string(),
            y_label: "Measurement points".to_string(),
            series: DeviationClass::ALL.iter().map(|c| c.to_string()).collect(),
            colors: CLASS_COLORS.iter().map(|c| c.to_string()).collect(),
            bars,
            precision: 0,
        };
        let svg = self.templates.render_chart(&chart.layout())?;
        self.write_chart(ERROR_CHART_FILE, svg)
    }

    /// Mean post-minus-pre deviation per machine
    pub fn delta_chart(&self, summary: &[DeltaSummary]) -> Result<PathBuf> {
        let chart = BarChart {
            title: "Effect of calibration on ballbar deviation".to_string(),
            y_label: "Change of mean deviation [mm] (post - pre)".to_string(),
            series: vec!["mean delta".to_string()],
            colors: Vec::new(),
            bars: summary
                .iter()
                .map(|s| Bar {
                    label: s.machine_id.clone(),
                    segments: vec![Segment {
                        series: 0,
                        value: s.mean_delta_mm,
                    }],
                })
                .collect(),
            precision: 3,
        };
        let svg = self.templates.render_chart(&chart.layout())?;
        self.write_chart(DELTA_CHART_FILE, svg)
    }

    /// Composite HTML report: stats, class counts, data sample, chart
    pub fn html_report(&self, input: &ReportInput<'_>) -> Result<PathBuf> {
        let sample: Vec<ClassifiedRow<'_>> = input
            .classified
            .iter()
            .take(input.sample_rows)
            .map(ClassifiedRow::from)
            .collect();
        let stats: Vec<StatView<'_>> = input.stats.iter().map(StatView::from).collect();
        // reports/ and plots/ are siblings under the data directory
        let chart_src = match input.chart.strip_prefix(&self.layout.plots_dir) {
            Ok(rel) => format!("../plots/{}", rel.to_string_lossy()),
            Err(_) => input.chart.to_string_lossy().into_owned(),
        };

        let mut context = tera::Context::new();
        context.insert("title", "Ballbar error report");
        context.insert(
            "generated_at",
            &Local::now().format("%Y-%m-%d %H:%M").to_string(),
        );
        context.insert("total_rows", &input.classified.len());
        context.insert("small_dev", &input.thresholds.small_dev);
        context.insert("medium_dev", &input.thresholds.medium_dev);
        context.insert("stats", &stats);
        context.insert("class_counts", input.class_counts);
        context.insert("sample", &sample);
        context.insert("chart_src", &chart_src);

        let html = self.templates.render(REPORT_TEMPLATE, &context)?;
        let path = self.layout.reports_dir.join(REPORT_FILE);
        std::fs::write(&path, html)?;
        tracing::info!(path = %path.display(), "wrote HTML report");
        Ok(path)
    }
}
