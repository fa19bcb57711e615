//! Rule schema types with serde deserialization.
//!
//! Defines the vocabulary shared by the query builder and the result
//! processor: comparators, criteria, the count condition, time units and
//! the rule params document itself. Field names on the wire stay camelCase
//! so persisted rule params remain compatible with existing documents.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ThresherError};

// ── Comparators ─────────────────────────────────────────────────────

/// Operator comparing a field's value (or a document count) against a
/// threshold. Serialized with the human-readable phrase values used by
/// the stored rule documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "more than")]
    Gt,
    #[serde(rename = "more than or equals")]
    GtOrEq,
    #[serde(rename = "less than")]
    Lt,
    #[serde(rename = "less than or equals")]
    LtOrEq,
    #[serde(rename = "equals")]
    Eq,
    #[serde(rename = "does not equal")]
    NotEq,
    #[serde(rename = "matches")]
    Match,
    #[serde(rename = "does not match")]
    NotMatch,
    #[serde(rename = "matches phrase")]
    MatchPhrase,
    #[serde(rename = "does not match phrase")]
    NotMatchPhrase,
}

impl Comparator {
    /// Every comparator, in declaration order.
    pub const ALL: [Comparator; 10] = [
        Comparator::Gt,
        Comparator::GtOrEq,
        Comparator::Lt,
        Comparator::LtOrEq,
        Comparator::Eq,
        Comparator::NotEq,
        Comparator::Match,
        Comparator::NotMatch,
        Comparator::MatchPhrase,
        Comparator::NotMatchPhrase,
    ];

    /// Negative comparators produce `must_not` clauses; everything else
    /// lands in the positive `must` set.
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            Comparator::NotEq | Comparator::NotMatch | Comparator::NotMatchPhrase
        )
    }

    /// Whether the comparator compares numbers, and can therefore gate a
    /// document count.
    pub fn is_numeric(&self) -> bool {
        !matches!(
            self,
            Comparator::Match
                | Comparator::NotMatch
                | Comparator::MatchPhrase
                | Comparator::NotMatchPhrase
        )
    }

    /// The human-readable phrase, as stored in rule documents and used in
    /// the `conditions` context string (e.g. `more than`).
    pub fn phrase(&self) -> &'static str {
        match self {
            Comparator::Gt => "more than",
            Comparator::GtOrEq => "more than or equals",
            Comparator::Lt => "less than",
            Comparator::LtOrEq => "less than or equals",
            Comparator::Eq => "equals",
            Comparator::NotEq => "does not equal",
            Comparator::Match => "matches",
            Comparator::NotMatch => "does not match",
            Comparator::MatchPhrase => "matches phrase",
            Comparator::NotMatchPhrase => "does not match phrase",
        }
    }

    /// Short symbol used in alert reason strings (e.g. `>`).
    /// Text comparators have no symbol and fall back to the phrase.
    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::Gt => ">",
            Comparator::GtOrEq => ">=",
            Comparator::Lt => "<",
            Comparator::LtOrEq => "<=",
            Comparator::Eq => "=",
            Comparator::NotEq => "!=",
            other => other.phrase(),
        }
    }

    /// Evaluate a document count against a threshold.
    ///
    /// Only the numeric comparators are meaningful here; a text comparator
    /// configured as a count threshold is a configuration fault.
    pub fn evaluate_count(&self, count: f64, threshold: f64) -> Result<bool> {
        match self {
            Comparator::Gt => Ok(count > threshold),
            Comparator::GtOrEq => Ok(count >= threshold),
            Comparator::Lt => Ok(count < threshold),
            Comparator::LtOrEq => Ok(count <= threshold),
            Comparator::Eq => Ok(count == threshold),
            Comparator::NotEq => Ok(count != threshold),
            other => Err(ThresherError::NonNumericCountComparator(
                other.phrase().to_string(),
            )),
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.phrase())
    }
}

// ── Time units ──────────────────────────────────────────────────────

/// Evaluation window unit, stored as the single-character form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    #[serde(rename = "s")]
    Seconds,
    #[serde(rename = "m")]
    Minutes,
    #[serde(rename = "h")]
    Hours,
    #[serde(rename = "d")]
    Days,
}

impl TimeUnit {
    /// Window length for `size` units of this unit.
    pub fn to_duration(&self, size: u64) -> chrono::Duration {
        let size = size as i64;
        match self {
            TimeUnit::Seconds => chrono::Duration::seconds(size),
            TimeUnit::Minutes => chrono::Duration::minutes(size),
            TimeUnit::Hours => chrono::Duration::hours(size),
            TimeUnit::Days => chrono::Duration::days(size),
        }
    }

    /// Reason-string label: `5 mins`, `1 hr`, `0 sec`.
    /// Pluralized only when the size is above one.
    pub fn label(&self, size: u64) -> String {
        let stem = match self {
            TimeUnit::Seconds => "sec",
            TimeUnit::Minutes => "min",
            TimeUnit::Hours => "hr",
            TimeUnit::Days => "day",
        };
        let plural = if size > 1 { "s" } else { "" };
        format!("{} {}{}", size, stem, plural)
    }
}

// ── Rule params ─────────────────────────────────────────────────────

/// One condition in a rule: a field compared against a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Criterion {
    pub field: String,
    pub comparator: Comparator,
    /// Number or string, depending on the comparator/field.
    pub value: serde_json::Value,
}

/// The document-count threshold a rule fires on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountCondition {
    pub comparator: Comparator,
    pub value: f64,
}

/// One log-threshold rule instance, as loaded from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleParams {
    pub count: CountCondition,
    #[serde(rename = "timeSize")]
    pub time_size: u64,
    #[serde(rename = "timeUnit")]
    pub time_unit: TimeUnit,
    pub criteria: Vec<Criterion>,
    #[serde(rename = "groupBy", default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<String>>,
}

impl RuleParams {
    /// Group-by fields, when the rule is grouped and the list is non-empty.
    pub fn group_by_fields(&self) -> Option<&[String]> {
        match self.group_by.as_deref() {
            Some(fields) if !fields.is_empty() => Some(fields),
            _ => None,
        }
    }

    /// Evaluation window length.
    pub fn window(&self) -> chrono::Duration {
        self.time_unit.to_duration(self.time_size)
    }
}

/// Upper bound of the evaluation window; the lower bound is derived from
/// the rule's window length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionTimeRange {
    /// Epoch millis, inclusive.
    pub lte: i64,
}

impl ExecutionTimeRange {
    /// Inclusive lower bound for the given rule's window.
    pub fn gte(&self, params: &RuleParams) -> i64 {
        self.lte - params.window().num_milliseconds()
    }
}

// ── Tests ───────────────────────────────────────────────────────────
