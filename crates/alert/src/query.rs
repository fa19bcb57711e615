//! Search-body assembly for ungrouped and grouped evaluations.
//!
//! The emitted JSON must match the documented shapes byte-for-byte
//! (field names and nesting) for compatibility with the search service.
//! Keys are only emitted when they have content (`must_not` is dropped
//! when empty); `runtime_mappings` passes through verbatim.

use serde_json::{json, Map, Value};
use thresher_core::{Comparator, CountCondition, ExecutionTimeRange, Result, RuleParams, ThresherError};

use crate::filters::build_filters_from_criteria;

/// Composite aggregation page size. A single page only: rules whose
/// group-by cardinality exceeds this silently truncate.
pub const COMPOSITE_GROUP_SIZE: u64 = 2000;

/// Build the ungrouped (simple count) search body.
pub fn ungrouped_query(
    params: &RuleParams,
    timestamp_field: &str,
    index: &str,
    runtime_mappings: &Value,
    execution_time_range: ExecutionTimeRange,
) -> Value {
    let filters = build_filters_from_criteria(params, timestamp_field, execution_time_range);

    let mut filter = vec![filters.range_filter];
    filter.extend(filters.must_filters);

    json!({
        "index": index,
        "allow_no_indices": true,
        "ignore_unavailable": true,
        "track_total_hits": true,
        "aggregations": {},
        "query": bool_query(filter, filters.must_not_filters),
        "runtime_mappings": runtime_mappings,
        "size": 0,
    })
}

/// Build the grouped (composite aggregation) search body.
///
/// Optimizable thresholds pre-filter at the query level and compare each
/// bucket's own doc count; everything else applies the criteria inside a
/// per-bucket `filtered_results` aggregation so the comparison sees the
/// filtered count. A rule without group-by fields is a configuration
/// fault.
pub fn grouped_query(
    params: &RuleParams,
    timestamp_field: &str,
    index: &str,
    runtime_mappings: &Value,
    execution_time_range: ExecutionTimeRange,
) -> Result<Value> {
    let group_by = params
        .group_by_fields()
        .ok_or_else(|| ThresherError::InvalidRule("grouped query requires groupBy fields".into()))?;

    let filters = build_filters_from_criteria(params, timestamp_field, execution_time_range);
    let context_agg = additional_context_aggregation(group_by);

    let (query, group_aggregations) = if is_optimizable_grouped_threshold(&params.count) {
        // Filtering before counting is equivalent here, so the criteria
        // move to the top-level query and buckets carry the context
        // top-hits directly.
        let mut filter = vec![filters.range_filter];
        filter.extend(filters.must_filters);
        (
            bool_query(filter, filters.must_not_filters),
            json!({ "additionalContext": context_agg }),
        )
    } else {
        // The threshold compares against the filtered share of each
        // bucket, so the bucket population must stay unfiltered and the
        // criteria apply inside the aggregation.
        let mut filter = vec![filters.grouped_range_filter];
        filter.extend(filters.must_filters);
        (
            bool_query(vec![filters.range_filter], Vec::new()),
            json!({
                "filtered_results": {
                    "filter": bool_query(filter, filters.must_not_filters),
                    "aggregations": { "additionalContext": context_agg },
                }
            }),
        )
    };

    Ok(json!({
        "index": index,
        "allow_no_indices": true,
        "ignore_unavailable": true,
        "query": query,
        "aggregations": {
            "groups": {
                "composite": {
                    "size": COMPOSITE_GROUP_SIZE,
                    "sources": composite_sources(group_by),
                },
                "aggregations": group_aggregations,
            }
        },
        "runtime_mappings": runtime_mappings,
        "size": 0,
    }))
}

/// Whether bucket doc counts can be compared against the threshold after
/// pre-filtering at the query level. True for `more than`, and for
/// `more than or equals` with a threshold above zero (a zero threshold
/// must still see groups the filters would drop entirely).
pub fn is_optimizable_grouped_threshold(count: &CountCondition) -> bool {
    match count.comparator {
        Comparator::Gt => true,
        Comparator::GtOrEq => count.value > 0.0,
        _ => false,
    }
}

fn bool_query(filter: Vec<Value>, must_not: Vec<Value>) -> Value {
    let mut body = Map::new();
    body.insert("filter".to_string(), Value::Array(filter));
    if !must_not.is_empty() {
        body.insert("must_not".to_string(), Value::Array(must_not));
    }
    json!({ "bool": body })
}

/// One composite source per group-by field, named `group-{i}-{field}`.
fn composite_sources(group_by: &[String]) -> Vec<Value> {
    group_by
        .iter()
        .enumerate()
        .map(|(index, field)| {
            json!({
                (format!("group-{}-{}", index, field)): {
                    "terms": { "field": field }
                }
            })
        })
        .collect()
}

/// Per-bucket top-hits aggregation surfacing extra context fields: one
/// document, no `_source`, only fields under the group-by root segments.
fn additional_context_aggregation(group_by: &[String]) -> Value {
    let mut patterns: Vec<String> = Vec::new();
    for field in group_by {
        let root = field.split('.').next().unwrap_or(field);
        let pattern = format!("{}.*", root);
        if !patterns.contains(&pattern) {
            patterns.push(pattern);
        }
    }

    json!({
        "top_hits": {
            "size": 1,
            "fields": patterns,
            "_source": false,
        }
    })
}

// ── Tests ───────────────────────────────────────────────────────────
