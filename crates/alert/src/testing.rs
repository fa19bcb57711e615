//! Shared test fixtures: the canonical criteria set covering every
//! comparator, and the clause shapes they must produce.

use serde_json::{json, Value};
use thresher_core::{Comparator, CountCondition, Criterion, RuleParams, TimeUnit};

pub(crate) const TIMESTAMP_FIELD: &str = "@timestamp";

// 2022-01-01T00:00:00.000Z
pub(crate) const EXECUTION_LTE: i64 = 1_640_995_200_000;

pub(crate) fn positive_criteria() -> Vec<Criterion> {
    vec![
        Criterion {
            field: "numericField".into(),
            comparator: Comparator::Gt,
            value: json!(10),
        },
        Criterion {
            field: "numericField".into(),
            comparator: Comparator::GtOrEq,
            value: json!(10),
        },
        Criterion {
            field: "numericField".into(),
            comparator: Comparator::Lt,
            value: json!(10),
        },
        Criterion {
            field: "numericField".into(),
            comparator: Comparator::LtOrEq,
            value: json!(10),
        },
        Criterion {
            field: "keywordField".into(),
            comparator: Comparator::Eq,
            value: json!("error"),
        },
        Criterion {
            field: "textField".into(),
            comparator: Comparator::Match,
            value: json!("Something went wrong"),
        },
        Criterion {
            field: "textField".into(),
            comparator: Comparator::MatchPhrase,
            value: json!("Something went wrong"),
        },
    ]
}

pub(crate) fn negative_criteria() -> Vec<Criterion> {
    vec![
        Criterion {
            field: "keywordField".into(),
            comparator: Comparator::NotEq,
            value: json!("error"),
        },
        Criterion {
            field: "textField".into(),
            comparator: Comparator::NotMatch,
            value: json!("Something went wrong"),
        },
        Criterion {
            field: "textField".into(),
            comparator: Comparator::NotMatchPhrase,
            value: json!("Something went wrong"),
        },
    ]
}

pub(crate) fn expected_positive_clauses() -> Vec<Value> {
    vec![
        json!({ "range": { "numericField": { "gt": 10 } } }),
        json!({ "range": { "numericField": { "gte": 10 } } }),
        json!({ "range": { "numericField": { "lt": 10 } } }),
        json!({ "range": { "numericField": { "lte": 10 } } }),
        json!({ "term": { "keywordField": { "value": "error" } } }),
        json!({ "match": { "textField": "Something went wrong" } }),
        json!({ "match_phrase": { "textField": "Something went wrong" } }),
    ]
}

pub(crate) fn expected_negative_clauses() -> Vec<Value> {
    vec![
        json!({ "term": { "keywordField": { "value": "error" } } }),
        json!({ "match": { "textField": "Something went wrong" } }),
        json!({ "match_phrase": { "textField": "Something went wrong" } }),
    ]
}

/// `count > 5` over a 5-minute window.
pub(crate) fn base_params(criteria: Vec<Criterion>) -> RuleParams {
    RuleParams {
        count: CountCondition {
            comparator: Comparator::Gt,
            value: 5.0,
        },
        time_size: 5,
        time_unit: TimeUnit::Minutes,
        criteria,
        group_by: None,
    }
}
