#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

peg::parser! {
    /// grammars for the judge's SCORE/COMMENTS/CONFIDENCE response.
    ///
    /// Every rule expects text that already had whitespace, `#` and `*`
    /// removed.
    pub grammar parser() for str {
        /// matches the score marker
        rule score_marker() = "SCORE:"

        /// matches the comments marker
        rule comments_marker() = "COMMENTS:"

        /// matches the confidence marker
        rule confidence_marker() = "CONFIDENCE:"

        /// anything up to the next comments marker
        rule before_comments() -> &'input str
            = s:$((!comments_marker() [_])*) { s }

        /// anything up to the next confidence marker
        rule before_confidence() -> &'input str
            = s:$((!confidence_marker() [_])*) { s }

        /// text between the first `SCORE:` and the `COMMENTS:` after it
        pub rule score_field() -> &'input str
            = (!score_marker() [_])* score_marker() s:before_comments() comments_marker() [_]*
            { s }

        /// text between the first `COMMENTS:` and the `CONFIDENCE:` after it
        pub rule comments_field() -> &'input str
            = (!comments_marker() [_])* comments_marker() c:before_confidence() confidence_marker() [_]*
            { c }

        /// everything after the first `CONFIDENCE:`
        pub rule confidence_field() -> &'input str
            = (!confidence_marker() [_])* confidence_marker() c:$([_]*)
            { c }
    }
}

#[cfg(test)]
mod tests {
    use super::parser;

    #[test]
    fn extracts_each_field() {
        let text = "SCORE:85COMMENTS:goodjobCONFIDENCE:4";
        assert_eq!(parser::score_field(text).ok(), Some("85"));
        assert_eq!(parser::comments_field(text).ok(), Some("goodjob"));
        assert_eq!(parser::confidence_field(text).ok(), Some("4"));
    }

    #[test]
    fn skips_leading_reasoning() {
        let text = "Point1:-2SCORE:18COMMENTS:okCONFIDENCE:5";
        assert_eq!(parser::score_field(text).ok(), Some("18"));
    }

    #[test]
    fn missing_closing_marker_fails() {
        assert!(parser::score_field("SCORE:10CONFIDENCE:3").is_err());
        assert!(parser::comments_field("COMMENTS:fine").is_err());
        assert!(parser::confidence_field("SCORE:1").is_err());
    }

    #[test]
    fn empty_fields_are_allowed() {
        assert_eq!(parser::score_field("SCORE:COMMENTS:").ok(), Some(""));
        assert_eq!(parser::confidence_field("CONFIDENCE:").ok(), Some(""));
    }
}
