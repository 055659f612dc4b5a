#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fs, path::Path};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use itertools::Itertools;
use tabled::{
    Table,
    settings::{Style, Width, object::Columns},
};

use super::results::{GradeRecord, SubmissionFailure};

/// How the aggregate results are written to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Comma separated values.
    Csv,
    /// Tab separated values.
    Tsv,
    /// A JSON array of records.
    Json,
}

impl ReportFormat {
    /// Picks the format from a file extension; anything unknown is CSV.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .as_deref()
        {
            Some("tsv") => ReportFormat::Tsv,
            Some("json") => ReportFormat::Json,
            _ => ReportFormat::Csv,
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "tsv" => Ok(ReportFormat::Tsv),
            "json" => Ok(ReportFormat::Json),
            other => bail!("Unknown report format `{other}`, expected csv, tsv or json"),
        }
    }
}

/// Quotes a delimited field when it holds the delimiter, a quote or a line
/// break.
fn quote(field: &str, delimiter: char) -> String {
    if field.contains([delimiter, '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Renders records as delimited text with a `Name, Score, Confidence,
/// Comments` header.
pub fn to_delimited(records: &[GradeRecord], delimiter: char) -> String {
    let sep = delimiter.to_string();
    let header = ["Name", "Score", "Confidence", "Comments"].join(&sep);
    let rows = records.iter().map(|r| {
        [
            quote(r.identity(), delimiter),
            r.score().to_string(),
            quote(r.confidence(), delimiter),
            quote(r.comments(), delimiter),
        ]
        .join(&sep)
    });

    std::iter::once(header).chain(rows).join("\n") + "\n"
}

/// Renders records in the given format.
pub fn render(records: &[GradeRecord], format: ReportFormat) -> Result<String> {
    Ok(match format {
        ReportFormat::Csv => to_delimited(records, ','),
        ReportFormat::Tsv => to_delimited(records, '\t'),
        ReportFormat::Json => serde_json::to_string_pretty(records)?,
    })
}

/// Writes the aggregate results file.
pub fn write_report(records: &[GradeRecord], path: &Path, format: ReportFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }
    fs::write(path, render(records, format)?)
        .with_context(|| format!("Something went wrong writing {}", path.display()))
}

/// Results table for the terminal.
pub fn results_table(records: &[GradeRecord]) -> String {
    Table::new(records)
        .with(Style::modern())
        .modify(Columns::last(), Width::wrap(60).keep_words(true))
        .to_string()
}

/// Colored summary of skipped submissions, empty when nothing failed.
pub fn failure_summary(failures: &[SubmissionFailure]) -> String {
    if failures.is_empty() {
        return String::new();
    }

    let mut out = format!(
        "{}\n",
        format!("{} submission(s) could not be graded:", failures.len())
            .red()
            .bold()
    );
    for failed in failures {
        out.push_str(&format!("  - {}\n", failed.to_string().yellow()));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::{grade::response::GradingResponse, java::style::StyleReport};

    fn record(name: &str, response: &str) -> GradeRecord {
        GradeRecord::from_parts(
            name,
            &GradingResponse::parse(response),
            &StyleReport::default(),
            None,
        )
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ReportFormat::from_path(Path::new("out/Graded.TSV")), ReportFormat::Tsv);
        assert_eq!(ReportFormat::from_path(Path::new("g.json")), ReportFormat::Json);
        assert_eq!(ReportFormat::from_path(Path::new("Graded")), ReportFormat::Csv);
        assert!("xlsx".parse::<ReportFormat>().is_err());
    }

    #[test]
    fn csv_quotes_when_needed() {
        let records = vec![
            record("Jane Doe", "SCORE:90COMMENTS:Good,clean\"code\"CONFIDENCE:4"),
            record("Bo", "nothing useful"),
        ];
        let csv = to_delimited(&records, ',');
        assert_eq!(
            csv,
            "Name,Score,Confidence,Comments\nJane Doe,90,4,\"Good,clean\"\"code\"\"\"\nBo,-100,,\n"
        );
    }

    #[test]
    fn json_uses_column_names() {
        let out = render(&[record("Kim", "SCORE:7COMMENTS:okCONFIDENCE:3")], ReportFormat::Json)
            .expect("render");
        let value: serde_json::Value = serde_json::from_str(&out).expect("json");
        assert_eq!(value[0]["Name"], "Kim");
        assert_eq!(value[0]["Score"], 7.0);
        assert_eq!(value[0]["Confidence"], "3");
    }

    #[test]
    fn failure_summary_lists_each_failure() {
        colored::control::set_override(false);
        let failures = vec![SubmissionFailure {
            path:     PathBuf::from("x/A.java"),
            identity: None,
            error:    "boom".into(),
        }];
        let summary = failure_summary(&failures);
        assert!(summary.contains("1 submission(s) could not be graded"));
        assert!(summary.contains("x/A.java: boom"));
        assert!(failure_summary(&[]).is_empty());
    }
}
