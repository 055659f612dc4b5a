#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Assignment description, scoring sheet and prompt rendering.
pub mod assignment;
/// Batch grading with bounded fan-out.
pub mod batch;
/// The judge seam and its OpenAI-backed implementation.
pub mod judge;
/// Aggregate results export.
pub mod report;
/// Judge response contract parsing.
pub mod response;
/// Grade records and failures.
pub mod results;
/// Score aggregation.
pub mod score;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result, ensure};

pub use assignment::{Assignment, read_scoring_sheet, system_prompt};
pub use batch::{BatchOutcome, grade_submissions};
pub use judge::{Judge, JudgeError, OpenAiJudge, judge_with_retry};
pub use report::{ReportFormat, failure_summary, results_table, write_report};
pub use response::GradingResponse;
pub use results::{GradeRecord, SubmissionFailure};
pub use score::aggregate;

use crate::{config::GraderConfig, util::find_files};

/// Inputs of a grading run.
#[derive(Debug, Clone)]
pub struct GradingJob {
    /// scoring rubric, plain text
    pub scoring_sheet: PathBuf,
    /// assignment description, plain text
    pub assignment:    PathBuf,
    /// folder searched recursively for `.java` files
    pub submissions:   PathBuf,
}

impl GradingJob {
    /// Loads the shared inputs and renders the system prompt. Any failure here
    /// is fatal for the run since no submission could be graded without it.
    pub fn system_prompt(&self) -> Result<String> {
        let scoring_sheet = read_scoring_sheet(&self.scoring_sheet)?;
        let assignment = Assignment::from_file(&self.assignment)?;
        tracing::info!("Loaded assignment `{}`", assignment.name());
        Ok(assignment.system_prompt(&scoring_sheet))
    }

    /// Java files to grade, sorted by path.
    pub fn submission_files(&self) -> Result<Vec<PathBuf>> {
        let files = find_files("java", &self.submissions).with_context(|| {
            format!("Could not search {} for submissions", self.submissions.display())
        })?;
        ensure!(!files.is_empty(), "No .java files found under {}", self.submissions.display());
        Ok(files)
    }

    /// Runs the whole job with the given judge.
    pub async fn run_with<J: Judge + 'static>(
        &self,
        judge: Arc<J>,
        config: &GraderConfig,
    ) -> Result<BatchOutcome> {
        let system_prompt = self.system_prompt()?;
        let files = self.submission_files()?;
        grade_submissions(judge, config, &system_prompt, files).await
    }

    /// Runs the whole job against the configured OpenAI-compatible judge.
    pub async fn run(&self, config: &GraderConfig) -> Result<BatchOutcome> {
        let judge = OpenAiJudge::from_config(config)?;
        tracing::info!("Using model `{}`", judge.model());
        self.run_with(Arc::new(judge), config).await
    }
}
