#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::{Deserialize, Serialize};

use super::{lexer::StructuralView, submission::RawSubmission};
use crate::constants::PRINT_CALL_PREFIX;

/// Counts lines that hold a brace alongside anything else.
///
/// Only lines consisting of a lone `{` or `}` are accepted. A line with three
/// braces and some code is still a single violation. Nesting is not checked.
pub fn count_brace_violations(view: &StructuralView) -> usize {
    view.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| l.contains(['{', '}']))
        .filter(|l| *l != "{" && *l != "}")
        .count()
}

/// Checks that the first and last print statements are the required boundary
/// print.
///
/// Runs on raw lines, not the structural view, because the literal being
/// printed is what matters. A file without any print statement passes.
pub fn boundary_print_violation<'a>(
    lines: impl IntoIterator<Item = &'a str>,
    required: &str,
) -> bool {
    let required = required.trim();
    let mut prints = lines
        .into_iter()
        .map(str::trim)
        .filter(|l| l.starts_with(PRINT_CALL_PREFIX));

    let Some(first) = prints.next() else {
        return false;
    };
    let last = prints.last().unwrap_or(first);

    first != required || last != required
}

/// Cost of one style rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleCost {
    /// points taken off per violation
    pub per: f64,
    /// most points this rule can take off
    pub max: f64,
}

impl RuleCost {
    /// Creates a rule cost.
    pub fn new(per: f64, max: f64) -> Self {
        Self { per, max }
    }

    /// `min(max, count * per)`
    pub fn deduct(&self, count: usize) -> f64 {
        (count as f64 * self.per).min(self.max)
    }
}

/// Per-rule costs for the formatting checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatScoring {
    /// brace placement
    pub brackets:  RuleCost,
    /// boundary prints
    pub new_lines: RuleCost,
}

impl Default for FormatScoring {
    fn default() -> Self {
        Self {
            brackets:  RuleCost::new(1.0, 5.0),
            new_lines: RuleCost::new(5.0, 5.0),
        }
    }
}

/// Outcome of running every style rule on one submission.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StyleReport {
    /// lines with misplaced braces
    pub brace_violations:   usize,
    /// whether the boundary print rule failed
    pub boundary_violation: bool,
    /// points taken off for braces
    pub brace_deduction:    f64,
    /// points taken off for boundary prints
    pub boundary_deduction: f64,
}

impl StyleReport {
    /// Sum of all deductions.
    pub fn total(&self) -> f64 {
        self.brace_deduction + self.boundary_deduction
    }
}

/// Runs both style rules and prices them.
pub fn analyze(raw: &RawSubmission, scoring: &FormatScoring, required_print: &str) -> StyleReport {
    let brace_violations = count_brace_violations(&raw.structural_view());
    let boundary_violation = boundary_print_violation(raw.lines(), required_print);

    let report = StyleReport {
        brace_violations,
        boundary_violation,
        brace_deduction: scoring.brackets.deduct(brace_violations),
        boundary_deduction: scoring.new_lines.deduct(usize::from(boundary_violation)),
    };
    tracing::debug!(
        "{}: {} brace violation(s), boundary violation: {}, deduction {:.2}",
        raw.path().display(),
        report.brace_violations,
        report.boundary_violation,
        report.total()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constants::DEFAULT_BOUNDARY_PRINT, java::lexer::strip};

    const ALLMAN: &str = "public class A\n{\n    public static void main(String[] args)\n    \
                          {\n        int x = 1;\n    }\n}\n";

    #[test]
    fn allman_code_has_no_brace_violations() {
        assert_eq!(count_brace_violations(&strip(ALLMAN)), 0);
    }

    #[test]
    fn one_violation_per_line_not_per_brace() {
        let code = "public class A {\n  void f() { if (x) { } }\n}\n";
        assert_eq!(count_brace_violations(&strip(code)), 2);
    }

    #[test]
    fn braces_in_comments_and_strings_are_ignored() {
        let code = "class A\n{\n  // {\n  String s = \"}\";\n  char c = '{';\n}\n";
        assert_eq!(count_brace_violations(&strip(code)), 0);
    }

    #[test]
    fn no_prints_is_not_a_violation() {
        assert!(!boundary_print_violation(ALLMAN.lines(), DEFAULT_BOUNDARY_PRINT));
    }

    #[test]
    fn matching_boundaries_pass() {
        let code = format!(
            "  {DEFAULT_BOUNDARY_PRINT}\n  System.out.println(\"hi\");\n  {DEFAULT_BOUNDARY_PRINT}\n"
        );
        assert!(!boundary_print_violation(code.lines(), DEFAULT_BOUNDARY_PRINT));
    }

    #[test]
    fn single_matching_print_passes() {
        assert!(!boundary_print_violation([DEFAULT_BOUNDARY_PRINT], DEFAULT_BOUNDARY_PRINT));
    }

    #[test]
    fn either_boundary_missing_is_a_violation() {
        let missing_last = format!("{DEFAULT_BOUNDARY_PRINT}\nSystem.out.println(\"bye\");\n");
        let missing_first = format!("System.out.println(\"hi\");\n{DEFAULT_BOUNDARY_PRINT}\n");
        assert!(boundary_print_violation(missing_last.lines(), DEFAULT_BOUNDARY_PRINT));
        assert!(boundary_print_violation(missing_first.lines(), DEFAULT_BOUNDARY_PRINT));
    }

    #[test]
    fn deductions_are_capped() {
        let cost = RuleCost::new(2.0, 5.0);
        assert_eq!(cost.deduct(0), 0.0);
        assert_eq!(cost.deduct(2), 4.0);
        assert_eq!(cost.deduct(10), 5.0);
    }

    #[test]
    fn analyze_prices_both_rules() {
        let raw = RawSubmission::new(
            "A.java",
            "public class A {\n  void f() {\n    System.out.println(\"x\");\n  }\n}\n",
        );
        let report = analyze(&raw, &FormatScoring::default(), DEFAULT_BOUNDARY_PRINT);
        assert_eq!(report.brace_violations, 2);
        assert!(report.boundary_violation);
        assert_eq!(report.brace_deduction, 2.0);
        assert_eq!(report.boundary_deduction, 5.0);
        assert_eq!(report.total(), 7.0);
    }
}
