//! Solve many independent requests in parallel. Every request gets its own
//! solver call sequence and exclusion set; nothing is shared between them
//! except the read-only configuration.

use rayon::prelude::*;
use serde::Serialize;

use crate::config::DispatchConfig;
use crate::model::DispatchRequest;
use crate::optimizer::{run_optimisation, OverallResult};
use crate::parallel::pool::WorkerPool;

#[derive(Debug, Clone, Serialize)]
pub struct BatchItem {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<OverallResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<BatchError>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchError {
    pub code: &'static str,
    pub message: String,
}

/// Results come back in input order.
pub fn solve_batch(
    requests: &[(String, DispatchRequest)],
    config: &DispatchConfig,
    pool: &WorkerPool,
) -> Vec<BatchItem> {
    pool.install(|| {
        requests
            .par_iter()
            .map(|(name, request)| match run_optimisation(request, config) {
                Ok(result) => BatchItem {
                    name: name.clone(),
                    result: Some(result),
                    error: None,
                },
                Err(err) => {
                    tracing::warn!(request = %name, code = err.code(), %err, "batch item failed");
                    BatchItem {
                        name: name.clone(),
                        result: None,
                        error: Some(BatchError {
                            code: err.code(),
                            message: err.to_string(),
                        }),
                    }
                }
            })
            .collect()
    })
}
