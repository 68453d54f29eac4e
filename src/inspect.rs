//! Query plan inspection
//!
//! Asks the store how it would execute a filter. The request runs on a worker
//! thread and is abandoned after a deadline, so a slow or wedged plan call
//! can only ever produce an [`ExplainInfo::Failed`] marker.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::audit::ExplainInfo;
use crate::error::{StoreError, StoreResult};
use crate::models::Filter;
use crate::store::{Collection, QueryPlan};

/// Default upper bound on a single inspection
pub const DEFAULT_EXPLAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Best-effort plan capture for reads
#[derive(Clone)]
pub struct QueryPlanInspector {
    collection: Arc<dyn Collection>,
    timeout: Duration,
}

impl QueryPlanInspector {
    pub fn new(collection: Arc<dyn Collection>) -> Self {
        Self {
            collection,
            timeout: DEFAULT_EXPLAIN_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Plan metadata for `filter`, or a failure marker
    pub fn explain_filter(&self, filter: &Filter) -> ExplainInfo {
        match self.plan(filter) {
            Ok(plan) => {
                debug!(stage = %plan.winning_plan.stage, "Query plan captured");
                ExplainInfo::from(plan)
            }
            Err(e) => {
                warn!(error = %e, "Query plan inspection failed");
                ExplainInfo::failed(e.to_string())
            }
        }
    }

    /// Run `explain` on a worker; deadline and worker failures are
    /// [`StoreError::Inspection`], store refusals pass through unchanged
    pub fn plan(&self, filter: &Filter) -> StoreResult<QueryPlan> {
        let (tx, rx) = mpsc::channel();
        let collection = Arc::clone(&self.collection);
        let filter = filter.clone();

        thread::Builder::new()
            .name("explain".to_string())
            .spawn(move || {
                // The receiver may already have given up
                let _ = tx.send(collection.explain(&filter));
            })
            .map_err(|e| StoreError::Inspection(format!("could not start worker: {}", e)))?;

        match rx.recv_timeout(self.timeout) {
            Ok(outcome) => outcome,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(StoreError::Inspection(format!(
                "timed out after {} ms",
                self.timeout.as_millis()
            ))),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(StoreError::Inspection(
                "worker stopped before producing a plan".to_string(),
            )),
        }
    }
}
