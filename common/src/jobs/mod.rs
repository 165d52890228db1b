use crate::model::operation::BatchReport;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    InProgress { processed: usize, total: usize },
    Completed(BatchReport),
    Failed(String),
}
