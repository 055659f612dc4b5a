#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    fmt,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use itertools::Itertools;

use super::lexer::{StructuralView, strip};

/// A student's source file exactly as submitted.
#[derive(Debug, Clone)]
pub struct RawSubmission {
    /// where the submission was read from
    path: PathBuf,
    /// full source text, line endings included
    text: String,
}

impl RawSubmission {
    /// Wraps already-loaded source text.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Reads a submission from disk. Invalid UTF-8 is replaced rather than
    /// rejected, students paste all sorts of things into their headers.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Could not read submission {}", path.display()))?;
        Ok(Self::new(path, String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Path of the submission.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Lines with their terminators, so joining them gives back the text.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.split_inclusive('\n')
    }

    /// Comment- and literal-free view of the source.
    pub fn structural_view(&self) -> StructuralView {
        strip(&self.text)
    }

    /// Splits the submission into identity and code segments.
    pub fn normalize(&self) -> NormalizedSubmission {
        normalize(self)
    }
}

/// A submission split into who wrote it and what they wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedSubmission {
    /// identity string taken from the first non-empty line
    identity: String,
    /// identity segment with comment markup removed
    header:   String,
    /// code segment, verbatim
    code:     String,
}

impl NormalizedSubmission {
    /// Identity string, usually the student's name and id.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Cleaned identity segment.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Code segment, from the first `import` or `public class` line onward.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Renders the header and code under labelled sections for the judge.
    pub fn render(&self) -> String {
        format!(
            "**HEADER:**\n{}\n\n**CODE:**\n```java\n{}```",
            self.header, self.code
        )
    }
}

impl fmt::Display for NormalizedSubmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Splits a raw submission into its identity string, cleaned header and code.
pub fn normalize(raw: &RawSubmission) -> NormalizedSubmission {
    let lines: Vec<&str> = raw.lines().collect();
    let boundary = code_start(&lines);

    NormalizedSubmission {
        identity: extract_identity(lines.iter().copied()),
        header:   clean_header(&lines[..boundary].concat()),
        code:     lines[boundary..].concat(),
    }
}

/// Index of the first line of code, or `lines.len()` when there is none.
pub fn code_start(lines: &[&str]) -> usize {
    let first = |prefix: &str| lines.iter().position(|l| l.trim().starts_with(prefix));

    [first("import"), first("public class")]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(lines.len())
}

/// First non-empty line with everything but word characters and whitespace
/// removed.
pub fn extract_identity<'a>(lines: impl IntoIterator<Item = &'a str>) -> String {
    lines
        .into_iter()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(|l| {
            l.chars()
                .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
                .collect::<String>()
                .trim()
                .to_string()
        })
        .unwrap_or_default()
}

/// Drops one leading whitespace character, if any.
fn drop_one_space(s: &str) -> &str {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_whitespace() => chars.as_str(),
        _ => s,
    }
}

/// Strips a leading `//`, `///`, ... marker and the space after it.
fn strip_slashes(line: &str) -> &str {
    let trimmed = line.trim_start();
    if trimmed.starts_with("//") {
        drop_one_space(trimmed.trim_start_matches('/'))
    } else {
        line
    }
}

/// Strips a leading `*` continuation marker and the space after it.
fn strip_star(line: &str) -> &str {
    match line.trim_start().strip_prefix('*') {
        Some(rest) => drop_one_space(rest),
        None => line,
    }
}

/// Removes comment syntax from the identity segment and drops blank lines.
pub fn clean_header(header: &str) -> String {
    header
        .lines()
        .map(|l| strip_slashes(l).replace("/*", "").replace("*/", ""))
        .map(|l| strip_star(&l).to_string())
        .filter(|l| !l.trim().is_empty())
        .join("\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(text: &str) -> RawSubmission {
        RawSubmission::new("Main.java", text)
    }

    #[test]
    fn splits_at_import() {
        let n = raw("Jane Doe 123\nimport java.util.*;\npublic class A\n{\n}\n").normalize();
        assert_eq!(n.identity(), "Jane Doe 123");
        assert_eq!(n.header(), "Jane Doe 123");
        assert_eq!(n.code(), "import java.util.*;\npublic class A\n{\n}\n");
    }

    #[test]
    fn splits_at_public_class_when_no_import() {
        let n = raw("// Sam\n\n  public class B {}\n").normalize();
        assert_eq!(n.identity(), "Sam");
        assert_eq!(n.code(), "  public class B {}\n");
    }

    #[test]
    fn earliest_marker_wins() {
        let n = raw("x\npublic class C\n{\n}\nimport a.b;\n").normalize();
        assert!(n.code().starts_with("public class C"));
    }

    #[test]
    fn no_boundary_means_no_code() {
        let n = raw("// just a note\n// nothing else\n").normalize();
        assert_eq!(n.code(), "");
        assert_eq!(n.header(), "just a note\nnothing else");
    }

    #[test]
    fn empty_file_has_empty_identity() {
        let n = raw("\n   \n").normalize();
        assert_eq!(n.identity(), "");
        assert_eq!(n.header(), "");
    }

    #[test]
    fn identity_drops_punctuation() {
        assert_eq!(extract_identity(["", "  /* Ana-María O'Neil, #42 */"]), "AnaMaría ONeil 42");
    }

    #[test]
    fn header_markup_is_removed() {
        let header = "/**\n * Name: Lee\n * Section 3\n */\n/// Lab 2\n\n";
        assert_eq!(clean_header(header), "Name: Lee\nSection 3\nLab 2");
    }

    #[test]
    fn render_labels_sections() {
        let n = raw("// Kim\nimport x;\n").normalize();
        assert_eq!(n.render(), "**HEADER:**\nKim\n\n**CODE:**\n```java\nimport x;\n```");
    }
}
