//! Alert reason and condition strings.
//!
//! These strings end up verbatim in notifications, so their exact shape
//! is load-bearing: `"{count} log entries in the last {duration}{ for
//! group}. Alert when {comparator} {threshold}."`.

use serde_json::Value;
use thresher_core::{Criterion, RuleParams};

/// Format a threshold the way the stored rule documents render numbers:
/// integral values print without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Render a criterion value without JSON quoting for strings.
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Human-readable summary of a rule's criteria, e.g.
/// `log.level equals error and http.status more than 500`.
pub fn conditions_text(criteria: &[Criterion]) -> String {
    criteria
        .iter()
        .map(|c| format!("{} {} {}", c.field, c.comparator.phrase(), format_value(&c.value)))
        .collect::<Vec<_>>()
        .join(" and ")
}

/// The alert reason string for a firing evaluation.
///
/// `group` is `None` for ungrouped rules; grouped rules pass the
/// comma-joined group name.
pub fn reason_text(matching_documents: u64, params: &RuleParams, group: Option<&str>) -> String {
    let duration = params.time_unit.label(params.time_size);
    let group_part = match group {
        Some(name) => format!(" for {}", name),
        None => String::new(),
    };
    format!(
        "{} log entries in the last {}{}. Alert when {} {}.",
        matching_documents,
        duration,
        group_part,
        params.count.comparator.symbol(),
        format_number(params.count.value)
    )
}

// ── Tests ───────────────────────────────────────────────────────────
