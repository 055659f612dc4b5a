#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Comment and literal blanking.
pub mod lexer;
/// Deterministic style rules.
pub mod style;
/// Reading and splitting student submissions.
pub mod submission;

pub use lexer::{StructuralView, strip};
pub use style::{FormatScoring, RuleCost, StyleReport, analyze};
pub use submission::{NormalizedSubmission, RawSubmission, normalize};
