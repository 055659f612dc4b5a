use aigrade::{
    constants::{DEFAULT_BOUNDARY_PRINT, SENTINEL_SCORE},
    grade::{GradingResponse, aggregate},
    java::{FormatScoring, RawSubmission, RuleCost, analyze, strip, style::count_brace_violations},
};
use proptest::prelude::*;

// Java-ish text: enough quotes, slashes and escapes to hit every state.
fn java_like() -> impl Strategy<Value = String> {
    proptest::string::string_regex(r#"[a-z{}();/*"'\\ \n\t]{0,200}"#).expect("valid regex")
}

proptest! {
    #[test]
    fn strip_keeps_line_shape(code in java_like()) {
        let view = strip(&code);
        let src: Vec<usize> = code.split('\n').map(|l| l.chars().count()).collect();
        let out: Vec<usize> = view.lines().map(|l| l.chars().count()).collect();
        prop_assert_eq!(src, out);
    }

    #[test]
    fn strip_only_ever_blanks(code in java_like()) {
        let view = strip(&code);
        for (src, out) in code.chars().zip(view.text().chars()) {
            prop_assert!(out == src || out == ' ', "{:?} became {:?}", src, out);
        }
    }

    #[test]
    fn arithmetic_is_not_a_comment(code in r"([a-z]{1,3} [/*+-] ){0,20}[a-z]{1,3};") {
        let view = strip(&code);
        prop_assert_eq!(view.text(), code.as_str());
    }

    #[test]
    fn strip_leaves_plain_code_alone(code in r"[a-z{}();=+ \n]{0,200}") {
        let view = strip(&code);
        prop_assert_eq!(view.text(), code.as_str());
    }

    #[test]
    fn stripped_text_has_no_comment_markers(code in java_like()) {
        let view = strip(&code);
        prop_assert!(!view.text().contains('"'));
        prop_assert!(!view.text().contains("//"));
    }

    #[test]
    fn allman_lines_never_violate(lines in proptest::collection::vec(prop_oneof![
        Just("{"), Just("}"), Just("    {"), Just("  }  "), Just("int x = 1;"), Just(""),
    ], 0..40)) {
        let code = lines.join("\n");
        prop_assert_eq!(count_brace_violations(&strip(&code)), 0);
    }

    #[test]
    fn deduction_is_capped(count in 0usize..1000, per in 0.0f64..10.0, max in 0.0f64..50.0) {
        let cost = RuleCost::new(per, max);
        let taken = cost.deduct(count);
        prop_assert!(taken <= max);
        prop_assert!(taken >= 0.0);
        prop_assert!(cost.deduct(count + 1) >= taken);
    }

    #[test]
    fn style_deduction_stays_within_rule_caps(code in java_like()) {
        let scoring = FormatScoring::default();
        let report = analyze(&RawSubmission::new("Gen.java", code), &scoring, DEFAULT_BOUNDARY_PRINT);
        prop_assert!(report.total() <= scoring.brackets.max + scoring.new_lines.max);
    }

    #[test]
    fn well_formed_scores_parse(score in 0u32..=100, confidence in 1u32..=5) {
        let response = format!(
            "## SCORE: {score}\n**COMMENTS:** Looks fine overall.\n**CONFIDENCE:** {confidence}"
        );
        let parsed = GradingResponse::parse(&response);
        prop_assert_eq!(parsed.score(), f64::from(score));
        prop_assert_eq!(parsed.confidence(), confidence.to_string());
        prop_assert_eq!(parsed.comments(), "Looksfineoverall.");
    }

    #[test]
    fn code_segment_is_a_suffix(header in r"(// [A-Za-z ]{0,12}\n){0,4}", body in r"[a-z{};\n ]{0,80}") {
        let text = format!("{header}public class Gen\n{body}");
        let raw = RawSubmission::new("Gen.java", text.clone());
        let normalized = raw.normalize();
        prop_assert!(text.ends_with(normalized.code()));
        prop_assert!(normalized.code().starts_with("public class Gen"));
    }
}

#[test]
fn operators_next_to_literals_survive() {
    let code = r#"x = "a/b" / 2 * 'c' / n; // done"#;
    let view = strip(code);
    assert_eq!(view.text(), format!("x = {} / 2 * {} / n; {}", " ".repeat(5), " ".repeat(3), " ".repeat(7)));
}

#[test]
fn unparseable_score_is_sentinel() {
    for response in ["", "SCORE: ninety COMMENTS: ok CONFIDENCE: 2", "COMMENTS: only"] {
        let parsed = GradingResponse::parse(response);
        assert_eq!(parsed.score(), SENTINEL_SCORE);
        assert!(!parsed.is_gradable());
    }
}

#[test]
fn sentinel_stays_below_any_real_score() {
    let scoring = FormatScoring::default();
    let worst = scoring.brackets.max + scoring.new_lines.max;
    assert!(aggregate(SENTINEL_SCORE, worst) <= SENTINEL_SCORE);
    assert!(aggregate(SENTINEL_SCORE, 0.0) < aggregate(0.0, worst));
}
