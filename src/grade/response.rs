#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::{Deserialize, Serialize};

use crate::{constants::SENTINEL_SCORE, parsers::parser};

/// The three fields pulled out of a judge response. Any of them may be
/// missing; none of that is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradingResponse {
    /// raw score text, before numeric coercion
    score:      Option<String>,
    /// one-line summary
    comments:   Option<String>,
    /// confidence, usually 1 to 5 but kept as text
    confidence: Option<String>,
}

impl GradingResponse {
    /// Parses a judge response. See [`parse`].
    pub fn parse(response: &str) -> Self {
        parse(response)
    }

    /// Score text, empty when the markers were missing.
    pub fn score_text(&self) -> &str {
        self.score.as_deref().unwrap_or_default()
    }

    /// Numeric score, or [`SENTINEL_SCORE`] when the score is absent or not a
    /// number.
    pub fn score(&self) -> f64 {
        self.score
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(SENTINEL_SCORE)
    }

    /// Whether the judge gave a usable score.
    pub fn is_gradable(&self) -> bool {
        self.score
            .as_deref()
            .is_some_and(|s| s.parse::<f64>().is_ok())
    }

    /// Comments, empty when missing.
    pub fn comments(&self) -> &str {
        self.comments.as_deref().unwrap_or_default()
    }

    /// Confidence, empty when missing.
    pub fn confidence(&self) -> &str {
        self.confidence.as_deref().unwrap_or_default()
    }
}

/// Removes whitespace and the `#`/`*` characters markdown adds around
/// headings and bold text.
pub fn clean(response: &str) -> String {
    response
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '#' && *c != '*')
        .collect()
}

/// Extracts score, comments and confidence from a free-text judge response.
pub fn parse(response: &str) -> GradingResponse {
    let cleaned = clean(response);

    GradingResponse {
        score:      parser::score_field(&cleaned).ok().map(str::to_string),
        comments:   parser::comments_field(&cleaned).ok().map(str::to_string),
        confidence: parser::confidence_field(&cleaned).ok().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_response() {
        let r = parse("SCORE:85\nCOMMENTS: good job\nCONFIDENCE:4");
        assert_eq!(r.score(), 85.0);
        assert_eq!(r.score_text(), "85");
        assert_eq!(r.comments(), "goodjob");
        assert_eq!(r.confidence(), "4");
        assert!(r.is_gradable());
    }

    #[test]
    fn tolerates_markdown() {
        let r = parse("### **SCORE:** 92.5\n**COMMENTS:** Nice.\n**CONFIDENCE:** 5\n");
        assert_eq!(r.score(), 92.5);
        assert_eq!(r.comments(), "Nice.");
        assert_eq!(r.confidence(), "5");
    }

    #[test]
    fn missing_score_marker_gives_sentinel() {
        let r = parse("COMMENTS: fine\nCONFIDENCE: 3");
        assert_eq!(r.score_text(), "");
        assert_eq!(r.score(), SENTINEL_SCORE);
        assert!(!r.is_gradable());
        assert_eq!(r.comments(), "fine");
    }

    #[test]
    fn non_numeric_score_gives_sentinel() {
        let r = parse("SCORE: 85/100\nCOMMENTS: ok\nCONFIDENCE: 2");
        assert_eq!(r.score_text(), "85/100");
        assert_eq!(r.score(), SENTINEL_SCORE);
    }

    #[test]
    fn empty_response_is_all_empty() {
        let r = parse("");
        assert_eq!(r, GradingResponse::default());
        assert_eq!(r.score(), SENTINEL_SCORE);
    }
}
