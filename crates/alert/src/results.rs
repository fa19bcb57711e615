//! Search-result processing and alert emission.
//!
//! Consumes the raw ungrouped total or the grouped composite buckets,
//! fires the configured reporter for every group whose count satisfies
//! the threshold, and keeps the alert budget honest. Buckets are
//! processed strictly in arrival order; this layer never re-sorts.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use thresher_core::{Result, RuleParams};

use crate::clients::{AlertReporter, AlertsClient};
use crate::fields::{set_nested, unflatten, unwrap_single};
use crate::reason::{conditions_text, reason_text};

/// Action group attached to every fired alert.
pub const ACTION_GROUP_FIRED: &str = "logs.threshold.fired";

/// Reporter id used for the single ungrouped alert of a rule.
pub const UNGROUPED_ALERT_ID: &str = "*";

// ── Response shapes ─────────────────────────────────────────────────

/// Response to an ungrouped count query (`track_total_hits`).
#[derive(Debug, Clone, Deserialize)]
pub struct UngroupedSearchResponse {
    pub hits: ResponseHits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseHits {
    pub total: TotalHits,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TotalHits {
    pub value: u64,
}

/// Response to a grouped composite-aggregation query.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupedSearchResponse {
    pub aggregations: GroupAggregations,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupAggregations {
    pub groups: CompositeGroups,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompositeGroups {
    pub buckets: Vec<GroupBucket>,
}

/// One composite bucket: the group-by key tuple plus its counts.
///
/// `additionalContext` sits directly on the bucket for optimized
/// queries; non-optimized queries nest it (and the count that matters)
/// under `filtered_results`. Key order is the composite source order,
/// which drives group naming.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupBucket {
    pub key: IndexMap<String, String>,
    pub doc_count: u64,
    #[serde(default)]
    pub filtered_results: Option<FilteredResults>,
    #[serde(rename = "additionalContext", default)]
    pub additional_context: Option<TopHitsAggregation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilteredResults {
    pub doc_count: u64,
    #[serde(rename = "additionalContext", default)]
    pub additional_context: Option<TopHitsAggregation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopHitsAggregation {
    pub hits: TopHitsEnvelope,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopHitsEnvelope {
    #[serde(default)]
    pub hits: Vec<TopHit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopHit {
    /// Flattened dotted-path fields, each value an array.
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl GroupBucket {
    /// The count the threshold compares against: the filtered share when
    /// present, the whole bucket otherwise.
    fn matching_documents(&self) -> u64 {
        self.filtered_results
            .as_ref()
            .map(|f| f.doc_count)
            .unwrap_or(self.doc_count)
    }

    /// First context top-hit fields, wherever the query nested them.
    fn context_fields(&self) -> Option<&Map<String, Value>> {
        let aggregation = match &self.filtered_results {
            Some(filtered) => filtered.additional_context.as_ref(),
            None => self.additional_context.as_ref(),
        }?;
        aggregation.hits.hits.first().map(|hit| &hit.fields)
    }
}

// ── Alert context ───────────────────────────────────────────────────

/// One firing condition, handed to the alerting framework.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AlertContext {
    #[serde(rename = "actionGroup")]
    pub action_group: String,
    pub context: Value,
}

// ── Processors ──────────────────────────────────────────────────────

/// Evaluate an ungrouped result against the rule's count condition.
///
/// Fires at most one alert (`group: null`); the limit is considered
/// reached when the matching count exceeds the alert budget.
pub fn process_ungrouped_results(
    response: &UngroupedSearchResponse,
    params: &RuleParams,
    reporter: &mut dyn AlertReporter,
    alerts_client: &mut dyn AlertsClient,
) -> Result<()> {
    let count = &params.count;
    let matching_documents = response.hits.total.value;

    if !count
        .comparator
        .evaluate_count(matching_documents as f64, count.value)?
    {
        alerts_client.set_alert_limit_reached(false);
        return Ok(());
    }

    let reason = reason_text(matching_documents, params, None);
    tracing::debug!(matching_documents, %reason, "Ungrouped threshold fired");

    let mut context = Map::new();
    context.insert("conditions".to_string(), json!(conditions_text(&params.criteria)));
    context.insert("group".to_string(), Value::Null);
    context.insert("matchingDocuments".to_string(), json!(matching_documents));
    context.insert("isRatio".to_string(), json!(false));
    context.insert("reason".to_string(), json!(reason));

    reporter.report(
        UNGROUPED_ALERT_ID,
        &reason,
        matching_documents,
        count.value,
        vec![AlertContext {
            action_group: ACTION_GROUP_FIRED.to_string(),
            context: Value::Object(context),
        }],
    );

    let limit = alerts_client.get_alert_limit_value();
    alerts_client.set_alert_limit_reached(matching_documents > limit);
    Ok(())
}

/// Evaluate grouped buckets against the rule's count condition.
///
/// One reporter call per firing bucket, in bucket order, each with its
/// own single-element context list. Reporting stops once the alert
/// budget is spent; the scan only continues far enough to know the
/// budget ran out.
pub fn process_group_by_results(
    buckets: &[GroupBucket],
    params: &RuleParams,
    reporter: &mut dyn AlertReporter,
    alerts_client: &mut dyn AlertsClient,
) -> Result<()> {
    let count = &params.count;
    let mut remaining_budget = alerts_client.get_alert_limit_value();

    for bucket in buckets {
        if remaining_budget == 0 {
            break;
        }

        let matching_documents = bucket.matching_documents();
        if !count
            .comparator
            .evaluate_count(matching_documents as f64, count.value)?
        {
            continue;
        }
        remaining_budget -= 1;

        let group_name = bucket.key.values().cloned().collect::<Vec<_>>().join(", ");
        let reason = reason_text(matching_documents, params, Some(&group_name));
        tracing::debug!(group = %group_name, matching_documents, "Grouped threshold fired");

        let mut context = Map::new();
        context.insert("conditions".to_string(), json!(conditions_text(&params.criteria)));
        context.insert("group".to_string(), json!(group_name));
        context.insert(
            "groupByKeys".to_string(),
            Value::Object(unflatten(
                bucket
                    .key
                    .iter()
                    .map(|(field, value)| (field.as_str(), json!(value))),
            )),
        );
        context.insert("matchingDocuments".to_string(), json!(matching_documents));
        context.insert("isRatio".to_string(), json!(false));
        context.insert("reason".to_string(), json!(reason));

        // Extra fields from the bucket's top hit (e.g. host.os.name)
        // surface at the context top level.
        if let Some(fields) = bucket.context_fields() {
            for (path, value) in fields {
                set_nested(&mut context, path, unwrap_single(value));
            }
        }

        reporter.report(
            &group_name,
            &reason,
            matching_documents,
            count.value,
            vec![AlertContext {
                action_group: ACTION_GROUP_FIRED.to_string(),
                context: Value::Object(context),
            }],
        );
    }

    alerts_client.set_alert_limit_reached(remaining_budget == 0);
    Ok(())
}

// ── Tests ───────────────────────────────────────────────────────────
