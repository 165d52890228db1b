use common::model::operation::{BatchReport, OperationResult, ReportDetails};

/// Reduces per-item results into counts and success/failure buckets. Input order is kept
/// inside each bucket.
pub fn assemble(results: &[OperationResult]) -> BatchReport {
    let mut details = ReportDetails::default();
    for result in results {
        if result.is_success() {
            details.success.push(result.clone());
        } else {
            details.failure.push(result.clone());
        }
    }

    BatchReport {
        total: results.len(),
        successes: details.success.len(),
        failures: details.failure.len(),
        details,
    }
}
