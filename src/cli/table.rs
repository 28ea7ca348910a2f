//! Table output for list-style commands
//!
//! Markdown tables (tabled) for terminals, CSV/TSV for piping and JSON for
//! programs. Every command builds an [`OutputTable`] plus the typed rows for
//! JSON and hands both to [`render`].

use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use tabled::{builder::Builder, settings::Style};

use crate::cli::OutputFormat;

/// Pre-formatted cells of a table
#[derive(Debug, Clone, Default)]
pub struct OutputTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl OutputTable {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
    }

    pub fn to_markdown(&self) -> String {
        let mut builder = Builder::default();
        builder.push_record(self.headers.clone());
        for row in &self.rows {
            builder.push_record(row.clone());
        }
        let mut out = builder.build().with(Style::markdown()).to_string();
        out.push('\n');
        out
    }

    pub fn to_delimited(&self, delimiter: u8) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());
        writer.write_record(&self.headers).into_diagnostic()?;
        for row in &self.rows {
            writer.write_record(row).into_diagnostic()?;
        }
        let bytes = writer.into_inner().into_diagnostic()?;
        String::from_utf8(bytes).into_diagnostic()
    }
}

/// Render a table in the requested format
///
/// `json_rows` are serialized as-is so JSON keeps full numeric precision.
pub fn render<T: Serialize>(table: &OutputTable, json_rows: &[T], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Auto | OutputFormat::Md => Ok(table.to_markdown()),
        OutputFormat::Csv => table.to_delimited(b','),
        OutputFormat::Tsv => table.to_delimited(b'\t'),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(json_rows).into_diagnostic()?;
            json.push('\n');
            Ok(json)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> OutputTable {
        let mut t = OutputTable::new(["machine_id", "count"]);
        t.push(["CNC_01", "3"]);
        t.push(["CNC,02", "1"]);
        t
    }

    #[test]
    fn test_markdown_has_header_separator() {
        let md = table().to_markdown();
        let lines: Vec<&str> = md.lines().collect();
        assert!(lines[0].contains("machine_id"));
        assert!(lines[1].starts_with("|-"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_csv_quotes_delimiters() {
        let csv = render::<()>(&table(), &[], OutputFormat::Csv).unwrap();
        assert_eq!(csv, "machine_id,count\nCNC_01,3\n\"CNC,02\",1\n");
    }

    #[test]
    fn test_tsv() {
        let tsv = render::<()>(&table(), &[], OutputFormat::Tsv).unwrap();
        assert!(tsv.starts_with("machine_id\tcount\n"));
    }

    #[test]
    fn test_json_uses_typed_rows() {
        #[derive(Serialize)]
        struct Row {
            count: usize,
        }
        let json = render(&table(), &[Row { count: 3 }], OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["count"], 3);
    }
}
