#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Grades a set of submissions, one judge call each, with bounded fan-out.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::{Context, Result};
use futures::future::join_all;
use tokio::sync::Semaphore;

use super::{
    assignment::user_prompt,
    judge::{Judge, judge_with_retry},
    response::GradingResponse,
    results::{GradeRecord, SubmissionFailure},
};
use crate::{
    config::{GraderConfig, RetryPolicy},
    java::{
        style::{FormatScoring, analyze},
        submission::{RawSubmission, extract_identity},
    },
    util::claim_breakdown_name,
};

/// What every grading task needs, shared read-only across tasks.
struct TaskContext {
    /// system prompt sent with every submission
    system_prompt: String,
    /// style rule costs
    scoring:       FormatScoring,
    /// required boundary print
    boundary:      String,
    /// judge retry policy
    retry:         RetryPolicy,
    /// per-attempt judge timeout
    timeout:       Duration,
    /// breakdown folder, already created
    breakdown_dir: PathBuf,
}

/// Graded records and the submissions that could not be graded.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// one record per graded submission, sorted by identity
    pub records:  Vec<GradeRecord>,
    /// one entry per skipped submission
    pub failures: Vec<SubmissionFailure>,
}

/// Builds a failure entry, keeping the whole error chain.
fn failure(path: &Path, identity: Option<&str>, error: impl std::fmt::Display) -> SubmissionFailure {
    SubmissionFailure {
        path:     path.to_path_buf(),
        identity: identity.map(str::to_string),
        error:    format!("{error:#}"),
    }
}

/// Grades a single submission that was already read. Every error is turned
/// into a failure entry so the rest of the batch carries on.
async fn grade_one<J: Judge>(
    judge: &J,
    ctx: &TaskContext,
    raw: RawSubmission,
    breakdown_name: String,
) -> Result<GradeRecord, SubmissionFailure> {
    let path = raw.path();
    let normalized = raw.normalize();
    let identity = normalized.identity();
    let style = analyze(&raw, &ctx.scoring, &ctx.boundary);

    let response = judge_with_retry(
        judge,
        &ctx.system_prompt,
        &user_prompt(&normalized.render(), path),
        ctx.retry,
        ctx.timeout,
    )
    .await
    .map_err(|e| failure(path, Some(identity), e))?;

    let breakdown = ctx.breakdown_dir.join(breakdown_name);
    tokio::fs::write(&breakdown, &response)
        .await
        .with_context(|| format!("Could not write breakdown {}", breakdown.display()))
        .map_err(|e| failure(path, Some(identity), e))?;

    let parsed = GradingResponse::parse(&response);
    if !parsed.is_gradable() {
        tracing::warn!(
            "{}: the judge gave no usable score ({:?}), recording the sentinel for manual review",
            path.display(),
            parsed.score_text()
        );
    }

    let record = GradeRecord::from_parts(identity, &parsed, &style, Some(path.to_path_buf()));
    tracing::info!(
        "Graded {} ({}): {:.2}",
        record.identity(),
        path.display(),
        record.score()
    );
    Ok(record)
}

/// Grades every submission, with at most `max_concurrency` judge calls in
/// flight.
///
/// Only a failure to create the breakdown folder aborts the batch; anything
/// that goes wrong with an individual submission ends up in
/// [`BatchOutcome::failures`].
pub async fn grade_submissions<J>(
    judge: Arc<J>,
    config: &GraderConfig,
    system_prompt: &str,
    submissions: Vec<PathBuf>,
) -> Result<BatchOutcome>
where
    J: Judge + 'static,
{
    tokio::fs::create_dir_all(config.breakdown_dir())
        .await
        .with_context(|| {
            format!("Could not create breakdown folder {}", config.breakdown_dir().display())
        })?;

    let ctx = Arc::new(TaskContext {
        system_prompt: system_prompt.to_string(),
        scoring:       *config.format_scoring(),
        boundary:      config.required_boundary_print().to_string(),
        retry:         config.retry(),
        timeout:       config.request_timeout(),
        breakdown_dir: config.breakdown_dir().to_path_buf(),
    });
    let semaphore = Arc::new(Semaphore::new(config.max_concurrency()));

    tracing::info!(
        "Grading {} submission(s), {} at a time",
        submissions.len(),
        config.max_concurrency()
    );

    // Read up front so every breakdown name is claimed before any task writes.
    let mut outcome = BatchOutcome::default();
    let mut taken = HashSet::new();
    let mut readable = Vec::with_capacity(submissions.len());
    for path in submissions {
        match RawSubmission::read(&path) {
            Ok(raw) => {
                let identity = extract_identity(raw.lines());
                let name = claim_breakdown_name(&mut taken, &identity, &path);
                readable.push((raw, name));
            }
            Err(e) => {
                let failed = failure(&path, None, e);
                tracing::warn!("Skipping {}", failed);
                outcome.failures.push(failed);
            }
        }
    }

    let (paths, handles): (Vec<_>, Vec<_>) = readable
        .into_iter()
        .map(|(raw, name)| {
            let path = raw.path().to_path_buf();
            let judge = Arc::clone(&judge);
            let ctx = Arc::clone(&ctx);
            let semaphore = Arc::clone(&semaphore);
            let handle = tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| failure(raw.path(), None, e))?;
                grade_one(judge.as_ref(), &ctx, raw, name).await
            });
            (path, handle)
        })
        .unzip();

    for (path, joined) in paths.iter().zip(join_all(handles).await) {
        match joined {
            Ok(Ok(record)) => outcome.records.push(record),
            Ok(Err(failed)) => {
                tracing::warn!("Skipping {}", failed);
                outcome.failures.push(failed);
            }
            Err(e) => {
                let failed = failure(path, None, e);
                tracing::warn!("Skipping {}", failed);
                outcome.failures.push(failed);
            }
        }
    }

    outcome
        .records
        .sort_by(|a, b| a.identity().cmp(b.identity()));

    tracing::info!(
        "Graded {} submission(s), skipped {}",
        outcome.records.len(),
        outcome.failures.len()
    );
    Ok(outcome)
}
