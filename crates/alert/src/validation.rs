//! Rule-params validation with structured errors.
//!
//! Validation runs before query building; a rule that fails here never
//! reaches the search engine. Errors carry a JSON-path-like location so
//! callers can point at the offending field.

use serde::{Deserialize, Serialize};
use thresher_core::RuleParams;

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// JSON-path-like location, e.g. `"criteria[2].field"`.
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    /// All errors as one `path: message; path: message` line.
    pub fn describe(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

// ── Validation ──────────────────────────────────────────────────────

/// Validate a rule's params ahead of evaluation.
pub fn validate_rule_params(params: &RuleParams) -> ValidationResult {
    let mut result = ValidationResult::new();

    if params.time_size == 0 {
        result.error("timeSize", "must be greater than zero");
    }

    if !params.count.comparator.is_numeric() {
        result.error(
            "count.comparator",
            format!(
                "'{}' is a text comparator and cannot gate a document count",
                params.count.comparator.phrase()
            ),
        );
    }

    for (index, criterion) in params.criteria.iter().enumerate() {
        if criterion.field.trim().is_empty() {
            result.error(format!("criteria[{}].field", index), "must not be empty");
        }
        if criterion.value.is_null() {
            result.error(format!("criteria[{}].value", index), "must not be null");
        }
    }

    if let Some(group_by) = &params.group_by {
        for (index, field) in group_by.iter().enumerate() {
            if field.trim().is_empty() {
                result.error(format!("groupBy[{}]", index), "must not be empty");
            }
        }
    }

    result
}

// ── Tests ───────────────────────────────────────────────────────────
