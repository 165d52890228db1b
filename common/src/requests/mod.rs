use serde::Deserialize;

/// Request payload for `POST /api/batches/add-to-group`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToGroupRequest {
    pub client_id: String,
    pub vehicle_group_id: String,
    pub vehicles: Vec<String>,
}

/// Request payload for `POST /api/batches/share`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRequest {
    pub client_id: String,
    pub share_group_id: String,
    pub vehicles: Vec<String>,
}

/// Request payload for `POST /api/batches/removal`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovalRequest {
    pub client_id: String,
    pub vehicles: Vec<String>,
    #[serde(default)]
    pub strip_groups: bool,
    #[serde(default)]
    pub removed_group_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupItem {
    pub model: String,
    pub vin: String,
    #[serde(default)]
    pub plate: Option<String>,
    /// Secondary devices get an " II" suffix on the description.
    #[serde(default)]
    pub secondary: bool,
    #[serde(default)]
    pub vehicle_group: Option<String>,
}

/// Request payload for `POST /api/batches/setup`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupRequest {
    pub client_id: String,
    pub items: Vec<SetupItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DriverItem {
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Request payload for `POST /api/batches/drivers`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverBatchRequest {
    pub client_id: String,
    pub drivers: Vec<DriverItem>,
}
