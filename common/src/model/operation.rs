use serde::{Deserialize, Serialize};

/// Outcome of one remote operation for one identifier.
///
/// Exactly one of these is produced per identifier an executor is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OperationResult {
    Success {
        identifier: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        detail: Option<String>,
    },
    Failure {
        identifier: String,
        error: String,
    },
}

impl OperationResult {
    pub fn success(identifier: impl Into<String>) -> Self {
        OperationResult::Success {
            identifier: identifier.into(),
            detail: None,
        }
    }

    pub fn success_with(identifier: impl Into<String>, detail: impl Into<String>) -> Self {
        OperationResult::Success {
            identifier: identifier.into(),
            detail: Some(detail.into()),
        }
    }

    pub fn failure(identifier: impl Into<String>, error: impl Into<String>) -> Self {
        OperationResult::Failure {
            identifier: identifier.into(),
            error: error.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        match self {
            OperationResult::Success { identifier, .. } => identifier,
            OperationResult::Failure { identifier, .. } => identifier,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDetails {
    #[serde(rename = "sucesso")]
    pub success: Vec<OperationResult>,
    #[serde(rename = "falha")]
    pub failure: Vec<OperationResult>,
}

/// Aggregate of a batch: counts plus the results split by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub total: usize,
    #[serde(rename = "sucessos")]
    pub successes: usize,
    #[serde(rename = "falhas")]
    pub failures: usize,
    #[serde(rename = "detalhes")]
    pub details: ReportDetails,
}
