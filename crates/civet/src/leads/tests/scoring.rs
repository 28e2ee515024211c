use super::common::{intake_rules, responses, text};
use crate::leads::scoring::{score, ResponseValue, RuleOperator, ScoringRule};

fn rule(field: &str, operator: RuleOperator, value: ResponseValue, points: i64) -> ScoringRule {
    ScoringRule {
        field: field.to_string(),
        operator,
        value,
        points,
    }
}

#[test]
fn empty_rule_set_scores_zero() {
    let submission = responses(&[("case_type", text("Personal Injury"))]);
    assert_eq!(score(&submission, &[]), 0);
}

#[test]
fn empty_submission_scores_zero() {
    assert_eq!(score(&responses(&[]), &intake_rules()), 0);
}

#[test]
fn equals_awards_points_on_exact_match() {
    let rules = [rule(
        "case_type",
        RuleOperator::Equals,
        text("Personal Injury"),
        10,
    )];
    let submission = responses(&[("case_type", text("Personal Injury"))]);
    assert_eq!(score(&submission, &rules), 10);
}

#[test]
fn equals_is_case_sensitive() {
    let rules = [rule(
        "case_type",
        RuleOperator::Equals,
        text("Personal Injury"),
        10,
    )];
    let submission = responses(&[("case_type", text("personal injury"))]);
    assert_eq!(score(&submission, &rules), 0);
}

#[test]
fn equals_never_crosses_types() {
    let rules = [rule("budget", RuleOperator::Equals, text("9"), 10)];
    let submission = responses(&[("budget", ResponseValue::from(9.0))]);
    assert_eq!(score(&submission, &rules), 0);

    let rules = [rule(
        "urgent",
        RuleOperator::Equals,
        ResponseValue::from(true),
        10,
    )];
    let submission = responses(&[("urgent", text("true"))]);
    assert_eq!(score(&submission, &rules), 0);
}

#[test]
fn equals_matches_booleans() {
    let rules = [rule(
        "urgent",
        RuleOperator::Equals,
        ResponseValue::from(true),
        4,
    )];
    let submission = responses(&[("urgent", ResponseValue::from(true))]);
    assert_eq!(score(&submission, &rules), 4);
}

#[test]
fn contains_is_case_insensitive() {
    let rules = [rule("description", RuleOperator::Contains, text("injury"), 5)];
    let submission = responses(&[("description", text("Personal Injury Case"))]);
    assert_eq!(score(&submission, &rules), 5);
}

#[test]
fn contains_stringifies_numbers() {
    let rules = [rule("phone", RuleOperator::Contains, text("555"), 2)];
    let submission = responses(&[("phone", ResponseValue::from(5551234.0))]);
    assert_eq!(score(&submission, &rules), 2);
}

#[test]
fn greater_than_coerces_numeric_text() {
    let rules = [rule(
        "employees",
        RuleOperator::GreaterThan,
        ResponseValue::from(2.0),
        3,
    )];
    let submission = responses(&[("employees", text("9"))]);
    assert_eq!(score(&submission, &rules), 3);
}

#[test]
fn greater_than_is_strict() {
    let rules = [rule(
        "budget",
        RuleOperator::GreaterThan,
        ResponseValue::from(5000.0),
        5,
    )];
    let submission = responses(&[("budget", ResponseValue::from(5000.0))]);
    assert_eq!(score(&submission, &rules), 0);
}

#[test]
fn less_than_compares_numerically() {
    let rules = [rule(
        "timeline_weeks",
        RuleOperator::LessThan,
        ResponseValue::from(4.0),
        6,
    )];
    let submission = responses(&[("timeline_weeks", text("2"))]);
    assert_eq!(score(&submission, &rules), 6);
}

#[test]
fn non_numeric_text_never_matches_comparisons() {
    let rules = [
        rule(
            "budget",
            RuleOperator::GreaterThan,
            ResponseValue::from(2.0),
            3,
        ),
        rule(
            "budget",
            RuleOperator::LessThan,
            ResponseValue::from(1000.0),
            3,
        ),
    ];
    let submission = responses(&[("budget", text("not sure yet"))]);
    assert_eq!(score(&submission, &rules), 0);
}

#[test]
fn blank_text_never_matches_comparisons() {
    // Blank input is not zero. A greater-than rule with a negative threshold
    // would otherwise match leads that left the field empty.
    let rules = [rule(
        "budget",
        RuleOperator::GreaterThan,
        ResponseValue::from(-1.0),
        3,
    )];
    assert_eq!(score(&responses(&[("budget", text(""))]), &rules), 0);
    assert_eq!(score(&responses(&[("budget", text("   "))]), &rules), 0);
}

#[test]
fn missing_field_skips_the_rule() {
    let rules = [rule("budget", RuleOperator::GreaterThan, text("100"), 7)];
    let submission = responses(&[("name", text("Dana"))]);
    assert_eq!(score(&submission, &rules), 0);
}

#[test]
fn matching_rules_accumulate() {
    let rules = [
        rule("a", RuleOperator::Equals, text("yes"), 5),
        rule("b", RuleOperator::Equals, text("yes"), 5),
        rule("c", RuleOperator::Equals, text("yes"), 20),
    ];
    let submission = responses(&[("a", text("yes")), ("b", text("yes")), ("c", text("no"))]);
    assert_eq!(score(&submission, &rules), 10);
}

#[test]
fn negative_points_subtract() {
    let rules = [
        rule("a", RuleOperator::Equals, text("yes"), 10),
        rule("spam", RuleOperator::Equals, text("yes"), -15),
    ];
    let submission = responses(&[("a", text("yes")), ("spam", text("yes"))]);
    assert_eq!(score(&submission, &rules), -5);
}

#[test]
fn unrecognized_operator_deserializes_and_scores_zero() {
    let rule: ScoringRule = serde_json::from_value(serde_json::json!({
        "field": "description",
        "operator": "matches_regex",
        "value": "injury",
        "points": 50,
    }))
    .expect("rule deserializes");
    assert_eq!(rule.operator, RuleOperator::Unknown);

    let submission = responses(&[("description", text("injury"))]);
    assert_eq!(score(&submission, &[rule]), 0);
}

#[test]
fn evaluation_is_deterministic() {
    let rules = intake_rules();
    let submission = responses(&[
        ("case_type", text("Personal Injury")),
        ("description", text("Slipped at work, injured my back")),
        ("budget", text("8000")),
    ]);

    let first = score(&submission, &rules);
    for _ in 0..10 {
        assert_eq!(score(&submission, &rules), first);
    }
    assert_eq!(first, 20);
}

#[test]
fn intake_scenario_matches_two_of_three_rules() {
    // Equals and contains hit; budget is below the threshold.
    let submission = responses(&[
        ("case_type", text("Personal Injury")),
        ("description", text("Car accident, minor injuries")),
        ("budget", text("2500")),
    ]);
    assert_eq!(score(&submission, &intake_rules()), 15);
}

#[test]
fn untagged_response_values_deserialize_by_shape() {
    let submission: crate::leads::scoring::FormResponses = serde_json::from_value(
        serde_json::json!({ "name": "Dana", "budget": 9000, "urgent": true }),
    )
    .expect("responses deserialize");

    assert_eq!(submission.get("name"), Some(&text("Dana")));
    assert_eq!(submission.get("budget"), Some(&ResponseValue::from(9000.0)));
    assert_eq!(submission.get("urgent"), Some(&ResponseValue::from(true)));
}
