use crate::model::operation::BatchReport;
use crate::model::spreadsheet::ErrorReportEntry;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    #[serde(rename = "TEST")]
    Test,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_excel_rows: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_routines: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<RunMode>,
}

/// What a dry run reports in place of calling the vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedAction {
    pub simulated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_group_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_group_id: Option<String>,
    pub vehicles: Vec<String>,
    pub total_vehicles: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionOutcome {
    Simulated(SimulatedAction),
    Executed(BatchReport),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineActions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_vehicle_to_group: Option<ActionOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_vehicle: Option<ActionOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineReport {
    pub routine_id: String,
    pub routine_name: String,
    pub client_name: String,
    pub vehicles: Vec<String>,
    pub total_vehicles: usize,
    pub actions: RoutineActions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of one engine run over an uploaded spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineReport {
    pub summary: RunSummary,
    pub routines: Vec<RoutineReport>,
    pub errors: Vec<ErrorReportEntry>,
}
