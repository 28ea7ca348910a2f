//! BBT: Ballbar Toolkit
//!
//! Collects CNC ballbar circular-test measurements, aggregates and classifies
//! radius deviations, compares pre/post calibration runs and writes CSV
//! exports, SVG charts and an HTML report.

pub mod cli;
pub mod core;
pub mod entities;
pub mod pipeline;
pub mod report;
