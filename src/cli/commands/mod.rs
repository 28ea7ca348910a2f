//! CLI command implementations

pub mod classify;
pub mod collect;
pub mod compare;
pub mod completions;
pub mod feedrate;
pub mod init;
pub mod registry;
pub mod report;
pub mod run;
pub mod stats;
