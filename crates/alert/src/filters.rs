//! Criteria → query-clause translation.
//!
//! Each comparator maps to exactly one clause shape; the match below is
//! exhaustive, so adding a comparator without a clause mapping fails to
//! compile. Positive comparators accumulate into the `must` set,
//! negative comparators into `must_not`, both in criteria order.

use serde_json::{json, Value};
use thresher_core::{Comparator, Criterion, ExecutionTimeRange, RuleParams};

/// Filter clauses derived from a rule's criteria and evaluation window.
#[derive(Debug, Clone, PartialEq)]
pub struct CriteriaFilters {
    /// Positive criteria clauses, in criteria order.
    pub must_filters: Vec<Value>,
    /// Negative criteria clauses, in criteria order.
    pub must_not_filters: Vec<Value>,
    /// Window range clause for the top-level query.
    pub range_filter: Value,
    /// Identical range clause, shaped for use inside a per-bucket
    /// filter aggregation.
    pub grouped_range_filter: Value,
}

/// Translate a rule's criteria plus the evaluation window into filter sets.
///
/// Total over well-typed input; an empty criteria list yields only the
/// range filters.
pub fn build_filters_from_criteria(
    params: &RuleParams,
    timestamp_field: &str,
    execution_time_range: ExecutionTimeRange,
) -> CriteriaFilters {
    let mut must_filters = Vec::new();
    let mut must_not_filters = Vec::new();

    for criterion in &params.criteria {
        let clause = clause_for(criterion);
        if criterion.comparator.is_negative() {
            must_not_filters.push(clause);
        } else {
            must_filters.push(clause);
        }
    }

    let range_filter = range_clause(timestamp_field, params, execution_time_range);
    let grouped_range_filter = range_filter.clone();

    CriteriaFilters {
        must_filters,
        must_not_filters,
        range_filter,
        grouped_range_filter,
    }
}

/// The one clause shape for each comparator.
fn clause_for(criterion: &Criterion) -> Value {
    let field = criterion.field.as_str();
    let value = &criterion.value;
    match criterion.comparator {
        Comparator::Gt => json!({ "range": { (field): { "gt": value } } }),
        Comparator::GtOrEq => json!({ "range": { (field): { "gte": value } } }),
        Comparator::Lt => json!({ "range": { (field): { "lt": value } } }),
        Comparator::LtOrEq => json!({ "range": { (field): { "lte": value } } }),
        Comparator::Eq | Comparator::NotEq => {
            json!({ "term": { (field): { "value": value } } })
        }
        Comparator::Match | Comparator::NotMatch => json!({ "match": { (field): value } }),
        Comparator::MatchPhrase | Comparator::NotMatchPhrase => {
            json!({ "match_phrase": { (field): value } })
        }
    }
}

fn range_clause(
    timestamp_field: &str,
    params: &RuleParams,
    execution_time_range: ExecutionTimeRange,
) -> Value {
    json!({
        "range": {
            (timestamp_field): {
                "gte": execution_time_range.gte(params),
                "lte": execution_time_range.lte,
                "format": "epoch_millis",
            }
        }
    })
}

// ── Tests ───────────────────────────────────────────────────────────
