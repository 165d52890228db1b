//! Batch executors: one vendor-side mutation applied to a list of items.
//!
//! Every executor follows the same contract. Each item resolves to exactly one
//! [`OperationResult`], a failing item never stops the ones after it, and results come back in
//! input order. Items go through a [`BatchRunner`], a worker pool whose bound defaults to 1 so
//! the vendor sees one request at a time.

pub mod add_to_group;
pub mod drivers;
pub mod removal;
pub mod setup;
pub mod share;

use crate::mzone::{VehicleRef, VendorApi};
use common::model::operation::OperationResult;
use futures_util::stream::{self, StreamExt};
use log::{info, warn};
use std::future::Future;

/// Called after each item with `(processed, total, result)`.
pub type Progress<'a> = &'a (dyn Fn(usize, usize, &OperationResult) + Send + Sync);

pub(crate) const VEHICLE_NOT_FOUND: &str = "Veículo não encontrado";

#[derive(Debug, Clone, Copy)]
pub struct BatchRunner {
    concurrency: usize,
}

impl BatchRunner {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub fn sequential() -> Self {
        Self::new(1)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Runs `operation` over `items` with at most `concurrency` in flight.
    pub async fn run<T, F, Fut>(
        &self,
        label: &str,
        items: Vec<T>,
        mut operation: F,
        progress: Option<Progress<'_>>,
    ) -> Vec<OperationResult>
    where
        F: FnMut(usize, T) -> Fut,
        Fut: Future<Output = OperationResult>,
    {
        let total = items.len();
        let mut results = Vec::with_capacity(total);
        let mut pending = std::pin::pin!(stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| operation(index, item))
            .buffered(self.concurrency));

        while let Some(result) = pending.next().await {
            if let OperationResult::Failure { identifier, error } = &result {
                warn!("{}: '{}' failed: {}", label, identifier, error);
            }
            if let Some(report) = progress {
                report(results.len() + 1, total, &result);
            }
            results.push(result);
        }

        let failures = results.iter().filter(|r| !r.is_success()).count();
        info!(
            "{}: {} processed, {} failed",
            label,
            results.len(),
            failures
        );
        results
    }
}

impl Default for BatchRunner {
    fn default() -> Self {
        Self::sequential()
    }
}

/// What every executor needs to talk to the vendor for one batch.
pub struct BatchContext<'a> {
    pub vendor: &'a dyn VendorApi,
    pub token: &'a str,
    pub runner: BatchRunner,
    pub progress: Option<Progress<'a>>,
}

/// Finds the vendor vehicle behind a VIN or description. Not found is an item failure.
pub(crate) async fn resolve_vehicle(
    vendor: &dyn VendorApi,
    token: &str,
    identifier: &str,
) -> Result<VehicleRef, String> {
    match vendor.find_vehicle(token, identifier).await {
        Ok(Some(vehicle)) => Ok(vehicle),
        Ok(None) => Err(VEHICLE_NOT_FOUND.to_string()),
        Err(e) => Err(e.to_string()),
    }
}

pub(crate) fn into_result(identifier: String, outcome: Result<Option<String>, String>) -> OperationResult {
    match outcome {
        Ok(Some(detail)) => OperationResult::success_with(identifier, detail),
        Ok(None) => OperationResult::success(identifier),
        Err(error) => OperationResult::failure(identifier, error),
    }
}
