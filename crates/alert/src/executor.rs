//! One-shot rule evaluation.
//!
//! Ties the pipeline together the way the owning scheduler invokes it:
//! validate the rule, build the grouped or ungrouped query, run it
//! through the injected search client, and feed the results to the
//! processors. The executor holds no per-rule state; concurrent
//! evaluations of different rules are independent.

use serde_json::Value;
use thresher_core::{Config, ExecutionTimeRange, Result, RuleParams, ThresherError};

use crate::clients::{AlertReporter, AlertsClient, LogSearchClient};
use crate::query::{grouped_query, ungrouped_query};
use crate::results::{
    process_group_by_results, process_ungrouped_results, GroupedSearchResponse,
    UngroupedSearchResponse,
};
use crate::validation::validate_rule_params;

/// Evaluates log-threshold rules against an injected search client.
///
/// Create one per server instance; scheduling, retries and evaluation
/// timeouts belong to the caller.
pub struct ThresholdExecutor {
    search: Box<dyn LogSearchClient>,
}

impl ThresholdExecutor {
    pub fn new(search: Box<dyn LogSearchClient>) -> Self {
        Self { search }
    }

    /// Run one evaluation cycle for a rule.
    ///
    /// Grouped rules (non-empty `groupBy`) go through the composite
    /// aggregation path; everything else is a single count query.
    pub async fn evaluate(
        &self,
        params: &RuleParams,
        timestamp_field: &str,
        index_pattern: &str,
        runtime_mappings: &Value,
        execution_time_range: ExecutionTimeRange,
        reporter: &mut dyn AlertReporter,
        alerts_client: &mut dyn AlertsClient,
    ) -> Result<()> {
        let validation = validate_rule_params(params);
        if !validation.valid {
            return Err(ThresherError::InvalidRule(validation.describe()));
        }

        if params.group_by_fields().is_some() {
            let query = grouped_query(
                params,
                timestamp_field,
                index_pattern,
                runtime_mappings,
                execution_time_range,
            )?;
            tracing::debug!(index = index_pattern, "Running grouped threshold query");

            let raw = self.search.search(&query).await?;
            let response: GroupedSearchResponse =
                serde_json::from_value(raw).map_err(|e| ThresherError::Response(e.to_string()))?;

            let buckets = &response.aggregations.groups.buckets;
            tracing::info!(buckets = buckets.len(), "Grouped threshold query completed");
            process_group_by_results(buckets, params, reporter, alerts_client)
        } else {
            let query = ungrouped_query(
                params,
                timestamp_field,
                index_pattern,
                runtime_mappings,
                execution_time_range,
            );
            tracing::debug!(index = index_pattern, "Running ungrouped threshold query");

            let raw = self.search.search(&query).await?;
            let response: UngroupedSearchResponse =
                serde_json::from_value(raw).map_err(|e| ThresherError::Response(e.to_string()))?;

            tracing::info!(
                total = response.hits.total.value,
                "Ungrouped threshold query completed"
            );
            process_ungrouped_results(&response, params, reporter, alerts_client)
        }
    }

    /// [`evaluate`](Self::evaluate) with the deployment-wide index and
    /// timestamp defaults from [`Config`].
    pub async fn evaluate_with_defaults(
        &self,
        params: &RuleParams,
        config: &Config,
        runtime_mappings: &Value,
        execution_time_range: ExecutionTimeRange,
        reporter: &mut dyn AlertReporter,
        alerts_client: &mut dyn AlertsClient,
    ) -> Result<()> {
        self.evaluate(
            params,
            &config.timestamp_field,
            &config.index_pattern,
            runtime_mappings,
            execution_time_range,
            reporter,
            alerts_client,
        )
        .await
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::AlertContext;
    use crate::testing::{base_params, positive_criteria, EXECUTION_LTE, TIMESTAMP_FIELD};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    struct CannedSearch {
        response: Value,
        requests: Arc<Mutex<Vec<Value>>>,
    }

    impl CannedSearch {
        fn new(response: Value) -> Self {
            Self {
                response,
                requests: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl LogSearchClient for CannedSearch {
        async fn search(&self, body: &Value) -> Result<Value> {
            self.requests.lock().unwrap().push(body.clone());
            Ok(self.response.clone())
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl LogSearchClient for FailingSearch {
        async fn search(&self, _body: &Value) -> Result<Value> {
            Err(ThresherError::Search("connection refused".to_string()))
        }
    }

    #[derive(Default)]
    struct MockReporter {
        calls: Vec<(String, Vec<AlertContext>)>,
    }

    impl AlertReporter for MockReporter {
        fn report(
            &mut self,
            id: &str,
            _reason: &str,
            _value: u64,
            _threshold: f64,
            alerts: Vec<AlertContext>,
        ) {
            self.calls.push((id.to_string(), alerts));
        }
    }

    struct MockAlertsClient {
        limit: u64,
        limit_reached: Option<bool>,
    }

    impl AlertsClient for MockAlertsClient {
        fn get_alert_limit_value(&self) -> u64 {
            self.limit
        }

        fn set_alert_limit_reached(&mut self, reached: bool) {
            self.limit_reached = Some(reached);
        }
    }

    #[tokio::test]
    async fn ungrouped_end_to_end() {
        let search = CannedSearch::new(json!({ "hits": { "total": { "value": 10 } } }));
        let executor = ThresholdExecutor::new(Box::new(search));

        let mut reporter = MockReporter::default();
        let mut alerts_client = MockAlertsClient {
            limit: 100,
            limit_reached: None,
        };

        executor
            .evaluate(
                &base_params(vec![positive_criteria()[0].clone()]),
                TIMESTAMP_FIELD,
                "filebeat-*",
                &json!({}),
                ExecutionTimeRange { lte: EXECUTION_LTE },
                &mut reporter,
                &mut alerts_client,
            )
            .await
            .unwrap();

        assert_eq!(reporter.calls.len(), 1);
        assert_eq!(reporter.calls[0].0, "*");
        assert_eq!(alerts_client.limit_reached, Some(false));
    }

    #[tokio::test]
    async fn grouped_end_to_end_sends_composite_query() {
        let search = CannedSearch::new(json!({
            "aggregations": {
                "groups": {
                    "buckets": [
                        {
                            "key": { "host.name": "web-01" },
                            "doc_count": 12,
                        },
                        {
                            "key": { "host.name": "web-02" },
                            "doc_count": 3,
                        }
                    ]
                }
            }
        }));
        let requests = Arc::clone(&search.requests);
        let executor = ThresholdExecutor::new(Box::new(search));

        let mut params = base_params(vec![]);
        params.group_by = Some(vec!["host.name".to_string()]);

        let mut reporter = MockReporter::default();
        let mut alerts_client = MockAlertsClient {
            limit: 100,
            limit_reached: None,
        };

        executor
            .evaluate(
                &params,
                TIMESTAMP_FIELD,
                "filebeat-*",
                &json!({}),
                ExecutionTimeRange { lte: EXECUTION_LTE },
                &mut reporter,
                &mut alerts_client,
            )
            .await
            .unwrap();

        assert_eq!(reporter.calls.len(), 1);
        assert_eq!(reporter.calls[0].0, "web-01");

        let sent = requests.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0]["aggregations"]["groups"]["composite"]["size"],
            json!(2000)
        );
    }

    #[tokio::test]
    async fn defaults_come_from_config() {
        let search = CannedSearch::new(json!({ "hits": { "total": { "value": 0 } } }));
        let requests = Arc::clone(&search.requests);
        let executor = ThresholdExecutor::new(Box::new(search));

        let mut reporter = MockReporter::default();
        let mut alerts_client = MockAlertsClient {
            limit: 100,
            limit_reached: None,
        };

        let config = Config {
            index_pattern: "logs-prod-*".to_string(),
            timestamp_field: "event.ingested".to_string(),
        };

        executor
            .evaluate_with_defaults(
                &base_params(vec![]),
                &config,
                &json!({}),
                ExecutionTimeRange { lte: EXECUTION_LTE },
                &mut reporter,
                &mut alerts_client,
            )
            .await
            .unwrap();

        let sent = requests.lock().unwrap();
        assert_eq!(sent[0]["index"], json!("logs-prod-*"));
        assert!(sent[0]["query"]["bool"]["filter"][0]["range"]["event.ingested"].is_object());
    }

    #[tokio::test]
    async fn invalid_rule_never_searches() {
        let search = CannedSearch::new(json!({}));
        let executor = ThresholdExecutor::new(Box::new(search));

        let mut params = base_params(vec![]);
        params.time_size = 0;

        let mut reporter = MockReporter::default();
        let mut alerts_client = MockAlertsClient {
            limit: 100,
            limit_reached: None,
        };

        let result = executor
            .evaluate(
                &params,
                TIMESTAMP_FIELD,
                "filebeat-*",
                &json!({}),
                ExecutionTimeRange { lte: EXECUTION_LTE },
                &mut reporter,
                &mut alerts_client,
            )
            .await;

        assert!(matches!(result, Err(ThresherError::InvalidRule(_))));
        assert!(reporter.calls.is_empty());
    }

    #[tokio::test]
    async fn search_failure_propagates() {
        let executor = ThresholdExecutor::new(Box::new(FailingSearch));

        let mut reporter = MockReporter::default();
        let mut alerts_client = MockAlertsClient {
            limit: 100,
            limit_reached: None,
        };

        let result = executor
            .evaluate(
                &base_params(vec![]),
                TIMESTAMP_FIELD,
                "filebeat-*",
                &json!({}),
                ExecutionTimeRange { lte: EXECUTION_LTE },
                &mut reporter,
                &mut alerts_client,
            )
            .await;

        assert!(matches!(result, Err(ThresherError::Search(_))));
        assert_eq!(alerts_client.limit_reached, None);
    }

    #[tokio::test]
    async fn malformed_response_is_a_response_error() {
        let search = CannedSearch::new(json!({ "hits": {} }));
        let executor = ThresholdExecutor::new(Box::new(search));

        let mut reporter = MockReporter::default();
        let mut alerts_client = MockAlertsClient {
            limit: 100,
            limit_reached: None,
        };

        let result = executor
            .evaluate(
                &base_params(vec![]),
                TIMESTAMP_FIELD,
                "filebeat-*",
                &json!({}),
                ExecutionTimeRange { lte: EXECUTION_LTE },
                &mut reporter,
                &mut alerts_client,
            )
            .await;

        assert!(matches!(result, Err(ThresherError::Response(_))));
    }
}
