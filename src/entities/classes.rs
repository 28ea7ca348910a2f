//! Deviation severity classes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity bucket of a deviation
///
/// Ordered from best to worst so sorted output reads OK, MEDIUM, HIGH.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviationClass {
    Ok,
    Medium,
    High,
}

impl DeviationClass {
    pub const ALL: [DeviationClass; 3] =
        [DeviationClass::Ok, DeviationClass::Medium, DeviationClass::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviationClass::Ok => "OK",
            DeviationClass::Medium => "MEDIUM",
            DeviationClass::High => "HIGH",
        }
    }
}

impl fmt::Display for DeviationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DeviationClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "OK" => Ok(DeviationClass::Ok),
            "MEDIUM" => Ok(DeviationClass::Medium),
            "HIGH" => Ok(DeviationClass::High),
            other => Err(format!("unknown error class '{}' (expected OK, MEDIUM or HIGH)", other)),
        }
    }
}
