//! Injected collaborator traits.
//!
//! The pipeline performs no I/O itself: query execution and alert
//! delivery go through these seams, so the crate stays SDK-free and the
//! server (or a test) injects the real implementations.

use async_trait::async_trait;
use thresher_core::Result;

use crate::results::AlertContext;

/// The slice of the alerting framework's client this pipeline drives.
///
/// Alert delivery, recovered-alert bookkeeping and per-alert data are
/// owned by the framework wrapper around [`AlertReporter`]; evaluation
/// only reads the alert budget and reports whether it was exhausted.
pub trait AlertsClient {
    /// Maximum number of alerts one evaluation may report.
    fn get_alert_limit_value(&self) -> u64;
    /// Record whether the evaluation hit that limit.
    fn set_alert_limit_reached(&mut self, reached: bool);
}

/// Reports one firing group (or the ungrouped match) to the alerting
/// framework. Called once per firing group, in bucket order; the final
/// argument always carries a single [`AlertContext`].
pub trait AlertReporter {
    fn report(
        &mut self,
        id: &str,
        reason: &str,
        value: u64,
        threshold: f64,
        alerts: Vec<AlertContext>,
    );
}

/// Abstraction over the search engine HTTP client.
///
/// Takes the full search body (index routing included) and returns the
/// raw response JSON; transport failures surface as
/// [`ThresherError::Search`](thresher_core::ThresherError::Search).
#[async_trait]
pub trait LogSearchClient: Send + Sync {
    async fn search(&self, body: &serde_json::Value) -> Result<serde_json::Value>;
}
