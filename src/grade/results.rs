#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{fmt::Display, path::PathBuf};

use bon::Builder;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

use super::{response::GradingResponse, score::aggregate};
use crate::java::style::StyleReport;

/// Formats a score for the results table.
fn display_score(score: &f64) -> String {
    format!("{score:.2}")
}

#[derive(Tabled, Clone, Debug, Builder, Serialize, Deserialize, PartialEq)]
#[builder(on(String, into))]
/// One graded submission.
pub struct GradeRecord {
    #[tabled(rename = "Name")]
    #[serde(rename = "Name")]
    /// * `identity`: student identity taken from the submission header
    pub(crate) identity:    String,
    #[tabled(rename = "Score", display = "display_score")]
    #[serde(rename = "Score")]
    /// * `score`: judge score minus style deductions
    pub(crate) score:       f64,
    #[tabled(rename = "Confidence")]
    #[serde(rename = "Confidence")]
    /// * `confidence`: the judge's confidence in its grade
    pub(crate) confidence:  String,
    #[tabled(rename = "Comments")]
    #[serde(rename = "Comments")]
    /// * `comments`: the judge's one-line summary
    pub(crate) comments:    String,
    #[tabled(skip)]
    #[serde(skip_serializing_if = "Option::is_none", default)]
    /// * `model_score`: score before style deductions
    pub(crate) model_score: Option<f64>,
    #[tabled(skip)]
    #[serde(skip_serializing_if = "Option::is_none", default)]
    /// * `deductions`: style deductions applied
    pub(crate) deductions:  Option<f64>,
    #[tabled(skip)]
    #[serde(skip)]
    /// * `path`: the graded file
    pub(crate) path:        Option<PathBuf>,
}

impl GradeRecord {
    /// Combines a parsed judge response with the style report.
    pub fn from_parts(
        identity: impl Into<String>,
        response: &GradingResponse,
        style: &StyleReport,
        path: Option<PathBuf>,
    ) -> Self {
        let model_score = response.score();
        GradeRecord::builder()
            .identity(identity)
            .score(aggregate(model_score, style.total()))
            .confidence(response.confidence())
            .comments(response.comments())
            .model_score(model_score)
            .deductions(style.total())
            .maybe_path(path)
            .build()
    }

    /// Student identity.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Final score.
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Judge confidence.
    pub fn confidence(&self) -> &str {
        &self.confidence
    }

    /// Judge comments.
    pub fn comments(&self) -> &str {
        &self.comments
    }

    /// Style deductions applied, if recorded.
    pub fn deductions(&self) -> Option<f64> {
        self.deductions
    }

    /// Judge score before deductions, if recorded.
    pub fn model_score(&self) -> Option<f64> {
        self.model_score
    }
}

/// A submission that could not be graded.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionFailure {
    /// the file that failed
    pub path:     PathBuf,
    /// identity, when the file could be read far enough to get one
    pub identity: Option<String>,
    /// what went wrong, with context
    pub error:    String,
}

impl Display for SubmissionFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.identity {
            Some(identity) if !identity.is_empty() => {
                write!(f, "{} ({}): {}", identity, self.path.display(), self.error)
            }
            _ => write!(f, "{}: {}", self.path.display(), self.error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_applies_deductions() {
        let response = GradingResponse::parse("SCORE:90COMMENTS:wellCONFIDENCE:4");
        let style = StyleReport {
            brace_violations:   3,
            boundary_violation: true,
            brace_deduction:    2.0,
            boundary_deduction: 5.0,
        };
        let record = GradeRecord::from_parts("Jane Doe", &response, &style, None);
        assert_eq!(record.score(), 83.0);
        assert_eq!(record.model_score(), Some(90.0));
        assert_eq!(record.deductions(), Some(7.0));
        assert_eq!(record.confidence(), "4");
        assert_eq!(record.comments(), "well");
    }

    #[test]
    fn failure_display_mentions_identity() {
        let failure = SubmissionFailure {
            path:     PathBuf::from("a/B.java"),
            identity: Some("Bo".into()),
            error:    "timed out".into(),
        };
        assert_eq!(failure.to_string(), "Bo (a/B.java): timed out");
    }
}
