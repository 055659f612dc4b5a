#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Score assigned when the judge's response carries no parseable score.
/// Kept far outside the normal range so affected rows stand out.
pub const SENTINEL_SCORE: f64 = -100.0;

/// Print statement students must emit first and last in their output.
pub const DEFAULT_BOUNDARY_PRINT: &str = r#"System.out.println("\n\n\n");"#;

/// Prefix identifying a console print statement for the boundary rule.
pub const PRINT_CALL_PREFIX: &str = "System.out.println(";

/// Suffix appended to breakdown file names.
pub const BREAKDOWN_SUFFIX: &str = "-GradingBreakdown.txt";

/// Default folder for per-submission judge breakdowns.
pub const DEFAULT_BREAKDOWN_DIR: &str = "GradingBreakdowns";

/// Default aggregate results file.
pub const DEFAULT_OUTPUT_FILE: &str = "Graded.csv";

/// Submission code is truncated to this many characters before being sent to
/// the judge.
pub const PROMPT_TRUNCATE: usize = 60_000;

/// Grading-format instructions appended to every system prompt.
pub const RESPONSE_FORMAT: &str = "SCORE:[score]\nCOMMENTS:[a single sentence \
                                   summary]\nCONFIDENCE:[score from 1-5 for the confidence you \
                                   have in your given grade]";
