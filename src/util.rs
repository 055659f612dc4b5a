#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use glob::glob;

use crate::constants::BREAKDOWN_SUFFIX;

/// A glob utility function to find paths to files with certain extension
///
/// * `extension`: the file extension to find paths for
/// * `root_dir`: the root directory where search starts, searched recursively
pub fn find_files(extension: &str, root_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pattern = root_dir.to_path_buf();
    pattern.push("**");
    pattern.push(format!("*.{extension}"));
    let pattern = pattern
        .to_str()
        .context("Could not convert root_dir to string")?
        .to_string();

    let mut files: Vec<PathBuf> = glob(&pattern)
        .context("Could not create glob")?
        .filter_map(Result::ok)
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Cuts `text` down to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// File stem of a submission, `submission` when it has none.
fn file_stem(submission: &Path) -> String {
    submission
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "submission".to_string())
}

/// Name of the breakdown file for a submission: the identity with whitespace
/// removed, or the file stem when the identity is empty.
pub fn breakdown_file_name(identity: &str, submission: &Path) -> String {
    let stem: String = identity.chars().filter(|c| !c.is_whitespace()).collect();
    let stem = if stem.is_empty() { file_stem(submission) } else { stem };
    format!("{stem}{BREAKDOWN_SUFFIX}")
}

/// Picks a breakdown file name no other submission in `taken` uses, and
/// records it.
///
/// The first submission with a given identity gets the plain
/// [`breakdown_file_name`]. Later ones get the file stem appended, then a
/// counter if even that is taken.
pub fn claim_breakdown_name(
    taken: &mut HashSet<String>,
    identity: &str,
    submission: &Path,
) -> String {
    let plain = breakdown_file_name(identity, submission);
    if taken.insert(plain.clone()) {
        return plain;
    }

    let base = plain.trim_end_matches(BREAKDOWN_SUFFIX);
    let base = format!("{base}-{}", file_stem(submission));
    let mut n = 1;
    loop {
        let name = if n == 1 {
            format!("{base}{BREAKDOWN_SUFFIX}")
        } else {
            format!("{base}-{n}{BREAKDOWN_SUFFIX}")
        };
        if taken.insert(name.clone()) {
            return name;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn breakdown_names_drop_whitespace() {
        let path = Path::new("subs/Main.java");
        assert_eq!(breakdown_file_name("Jane Doe 123", path), "JaneDoe123-GradingBreakdown.txt");
        assert_eq!(breakdown_file_name("", path), "Main-GradingBreakdown.txt");
    }

    #[test]
    fn claimed_names_are_unique() {
        let mut taken = HashSet::new();
        let names = [
            claim_breakdown_name(&mut taken, "import javautilScanner", Path::new("a/A.java")),
            claim_breakdown_name(&mut taken, "import javautilScanner", Path::new("a/B.java")),
            claim_breakdown_name(&mut taken, "import javautilScanner", Path::new("b/B.java")),
            claim_breakdown_name(&mut taken, "", Path::new("c/A.java")),
        ];
        assert_eq!(names, [
            "importjavautilScanner-GradingBreakdown.txt",
            "importjavautilScanner-B-GradingBreakdown.txt",
            "importjavautilScanner-B-2-GradingBreakdown.txt",
            "A-GradingBreakdown.txt",
        ]);
        assert_eq!(taken.len(), 4);
    }
}
