//! Degrade-on-failure helper shared by the pipeline stages.
//!
//! Query expansion, reranking and answer generation all follow the same
//! policy: try the upstream call, and if it fails log the error and
//! continue with a well-defined degraded value instead of failing the
//! request.

use std::future::Future;

use crate::error::RagErr;
use crate::error::Result;

/// Await `attempt`; on error log it under `stage` and return
/// `degrade(&err)` instead.
pub async fn or_degrade<T, F, D>(stage: &'static str, attempt: F, degrade: D) -> T
where
    F: Future<Output = Result<T>>,
    D: FnOnce(&RagErr) -> T,
{
    match attempt.await {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(stage, error = %err, "Upstream call failed, using degraded result");
            degrade(&err)
        }
    }
}

#[cfg(test)]
#[path = "fallback.test.rs"]
mod tests;
