//! Access to the Mzone telematics API.
//!
//! [`VendorApi`] is the seam the executors and the routine engine talk through. The real
//! implementation is [`client::MzoneClient`]; tests substitute an in-memory fake.

pub mod client;
pub mod credentials;
#[cfg(test)]
pub(crate) mod fake;
pub mod odata;

use crate::error::MzoneError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The subset of a vehicle the executors need after a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRef {
    pub id: String,
    #[serde(default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleGroup {
    pub id: String,
    pub description: String,
}

/// Partial update of a vehicle. Absent fields are left untouched by the vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_group_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDriver {
    pub first_name: String,
    pub last_name: String,
    pub driver_key: u64,
}

/// Operations the back-office performs against the vendor.
///
/// Tokens are passed in explicitly on every call; the implementation keeps no login state.
#[async_trait]
pub trait VendorApi: Send + Sync {
    /// Password grant for a client login. Returns the bearer token.
    async fn authenticate(&self, login: &str, password: &str) -> Result<String, MzoneError>;

    /// Looks a vehicle up by VIN or by description, exact match.
    async fn find_vehicle(
        &self,
        token: &str,
        identifier: &str,
    ) -> Result<Option<VehicleRef>, MzoneError>;

    async fn patch_vehicle(
        &self,
        token: &str,
        vehicle_id: &str,
        patch: &VehiclePatch,
    ) -> Result<(), MzoneError>;

    /// Ids of the groups the vehicle currently belongs to.
    async fn vehicle_group_ids(
        &self,
        token: &str,
        vehicle_id: &str,
    ) -> Result<Vec<String>, MzoneError>;

    async fn remove_vehicle_groups(
        &self,
        token: &str,
        vehicle_id: &str,
        group_ids: &[String],
    ) -> Result<(), MzoneError>;

    async fn add_vehicles_to_group(
        &self,
        token: &str,
        group_id: &str,
        vehicle_ids: &[String],
    ) -> Result<(), MzoneError>;

    async fn share_vehicle(
        &self,
        token: &str,
        vehicle_id: &str,
        user_group_id: &str,
    ) -> Result<(), MzoneError>;

    /// Every vehicle group visible to the token, all pages.
    async fn list_vehicle_groups(&self, token: &str) -> Result<Vec<VehicleGroup>, MzoneError>;

    /// Creates a driver and returns its vendor id.
    async fn create_driver(&self, token: &str, driver: &NewDriver) -> Result<String, MzoneError>;
}
