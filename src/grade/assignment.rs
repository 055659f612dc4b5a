#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::Path;

use anyhow::{Context, Result, ensure};

use crate::constants::{PROMPT_TRUNCATE, RESPONSE_FORMAT};

/// An assignment description, already extracted to plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    /// first line of the description
    name:   String,
    /// everything after the first line
    prompt: String,
}

impl Assignment {
    /// Splits description text into a title line and a prompt body.
    pub fn from_text(text: &str) -> Result<Self> {
        let text = text.replace('\t', " ");
        let text = text.trim();
        ensure!(!text.is_empty(), "The assignment description is empty");

        let (name, prompt) = text.split_once('\n').unwrap_or((text, ""));
        Ok(Self {
            name:   name.trim().to_string(),
            prompt: prompt.trim().to_string(),
        })
    }

    /// Reads an assignment description from a text or markdown file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read assignment description {}", path.display()))?;
        Self::from_text(&text)
            .with_context(|| format!("Could not use assignment description {}", path.display()))
    }

    /// Assignment title.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Assignment prompt body.
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Renders the judge's system prompt for this assignment and rubric.
    pub fn system_prompt(&self, scoring_sheet: &str) -> String {
        system_prompt(&self.name, &self.prompt, scoring_sheet)
    }
}

/// Fills the embedded system prompt template.
pub fn system_prompt(assignment_name: &str, assignment_prompt: &str, scoring_sheet: &str) -> String {
    format!(
        include_str!("prompts/system_message.md"),
        assignment_name = assignment_name,
        assignment_prompt = assignment_prompt,
        scoring_sheet = scoring_sheet,
        response_format = RESPONSE_FORMAT,
    )
}

/// Reads the scoring sheet verbatim.
pub fn read_scoring_sheet(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let sheet = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read scoring sheet {}", path.display()))?;
    ensure!(!sheet.trim().is_empty(), "The scoring sheet {} is empty", path.display());
    Ok(sheet)
}

/// Builds the user message for one submission, truncated to a size the judge
/// will accept.
///
/// A truncated message gets its code fence closed again so the judge still
/// sees well-formed markdown.
pub fn user_prompt(rendered_submission: &str, source: &Path) -> String {
    let kept = crate::util::truncate_chars(rendered_submission, PROMPT_TRUNCATE);
    if kept.len() == rendered_submission.len() {
        return kept.to_string();
    }

    tracing::warn!(
        "{}: submission is longer than {} characters, the judge only sees the first part",
        source.display(),
        PROMPT_TRUNCATE
    );
    let mut prompt = kept.to_string();
    if !prompt.ends_with('\n') {
        prompt.push('\n');
    }
    prompt.push_str("```");
    prompt
}
