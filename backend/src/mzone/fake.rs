//! In-memory [`VendorApi`] used by tests.

use super::{NewDriver, VehicleGroup, VehiclePatch, VehicleRef, VendorApi};
use crate::error::MzoneError;
use async_trait::async_trait;
use common::model::routine::{Client, ClientType, Password};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub(crate) fn sample_client(id: &str, login: &str) -> Client {
    Client {
        id: id.to_string(),
        name: format!("Client {}", login),
        login: login.to_string(),
        password: Password::new("pw"),
        client_type: ClientType::Client,
    }
}

/// Vehicles are known by identifier (VIN). Any call touching an identifier or vehicle id listed
/// in `failing` returns a 500.
#[derive(Default)]
pub(crate) struct FakeVendor {
    vehicles: Mutex<HashMap<String, VehicleRef>>,
    memberships: Mutex<HashMap<String, Vec<String>>>,
    groups: Vec<VehicleGroup>,
    failing: HashSet<String>,
    failing_logins: HashSet<String>,
    calls: Mutex<Vec<String>>,
}

impl FakeVendor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers a vehicle whose vendor id is `id-<vin>`.
    pub(crate) fn with_vehicle(self, vin: &str, description: &str) -> Self {
        self.vehicles.lock().unwrap().insert(
            vin.to_string(),
            VehicleRef {
                id: format!("id-{}", vin),
                vin: Some(vin.to_string()),
                description: Some(description.to_string()),
            },
        );
        self
    }

    pub(crate) fn with_membership(self, vehicle_id: &str, groups: &[&str]) -> Self {
        self.memberships.lock().unwrap().insert(
            vehicle_id.to_string(),
            groups.iter().map(|g| g.to_string()).collect(),
        );
        self
    }

    pub(crate) fn with_group(mut self, id: &str, description: &str) -> Self {
        self.groups.push(VehicleGroup {
            id: id.to_string(),
            description: description.to_string(),
        });
        self
    }

    pub(crate) fn failing_on(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    pub(crate) fn failing_login(mut self, login: &str) -> Self {
        self.failing_logins.insert(login.to_string());
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_named(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.split(':').next() == Some(name))
            .count()
    }

    pub(crate) fn description_of(&self, vin: &str) -> Option<String> {
        self.vehicles
            .lock()
            .unwrap()
            .get(vin)
            .and_then(|v| v.description.clone())
    }

    pub(crate) fn groups_of(&self, vehicle_id: &str) -> Vec<String> {
        self.memberships
            .lock()
            .unwrap()
            .get(vehicle_id)
            .cloned()
            .unwrap_or_default()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, key: &str) -> Result<(), MzoneError> {
        if self.failing.contains(key) {
            Err(MzoneError::Status {
                status: 500,
                body: format!("forced failure for {}", key),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl VendorApi for FakeVendor {
    async fn authenticate(&self, login: &str, _password: &str) -> Result<String, MzoneError> {
        self.record(format!("authenticate:{}", login));
        if self.failing_logins.contains(login) {
            return Err(MzoneError::Auth("invalid_grant".to_string()));
        }
        Ok(format!("token-{}", login))
    }

    async fn find_vehicle(
        &self,
        _token: &str,
        identifier: &str,
    ) -> Result<Option<VehicleRef>, MzoneError> {
        self.record(format!("find_vehicle:{}", identifier));
        self.check(identifier)?;
        let vehicles = self.vehicles.lock().unwrap();
        Ok(vehicles.get(identifier).cloned().or_else(|| {
            vehicles
                .values()
                .find(|v| v.description.as_deref() == Some(identifier))
                .cloned()
        }))
    }

    async fn patch_vehicle(
        &self,
        _token: &str,
        vehicle_id: &str,
        patch: &VehiclePatch,
    ) -> Result<(), MzoneError> {
        self.record(format!("patch_vehicle:{}", vehicle_id));
        self.check(vehicle_id)?;
        let mut vehicles = self.vehicles.lock().unwrap();
        if let Some(vehicle) = vehicles.values_mut().find(|v| v.id == vehicle_id) {
            if let Some(description) = &patch.description {
                vehicle.description = Some(description.clone());
            }
        }
        if let Some(group_ids) = &patch.vehicle_group_ids {
            self.memberships
                .lock()
                .unwrap()
                .insert(vehicle_id.to_string(), group_ids.clone());
        }
        Ok(())
    }

    async fn vehicle_group_ids(
        &self,
        _token: &str,
        vehicle_id: &str,
    ) -> Result<Vec<String>, MzoneError> {
        self.record(format!("vehicle_group_ids:{}", vehicle_id));
        Ok(self.groups_of(vehicle_id))
    }

    async fn remove_vehicle_groups(
        &self,
        _token: &str,
        vehicle_id: &str,
        group_ids: &[String],
    ) -> Result<(), MzoneError> {
        self.record(format!("remove_vehicle_groups:{}", vehicle_id));
        let mut memberships = self.memberships.lock().unwrap();
        if let Some(current) = memberships.get_mut(vehicle_id) {
            current.retain(|g| !group_ids.contains(g));
        }
        Ok(())
    }

    async fn add_vehicles_to_group(
        &self,
        _token: &str,
        group_id: &str,
        vehicle_ids: &[String],
    ) -> Result<(), MzoneError> {
        self.record(format!("add_vehicles_to_group:{}", group_id));
        self.check(group_id)?;
        let mut memberships = self.memberships.lock().unwrap();
        for vehicle_id in vehicle_ids {
            memberships
                .entry(vehicle_id.clone())
                .or_default()
                .push(group_id.to_string());
        }
        Ok(())
    }

    async fn share_vehicle(
        &self,
        _token: &str,
        vehicle_id: &str,
        user_group_id: &str,
    ) -> Result<(), MzoneError> {
        self.record(format!("share_vehicle:{}:{}", vehicle_id, user_group_id));
        self.check(vehicle_id)
    }

    async fn list_vehicle_groups(&self, _token: &str) -> Result<Vec<VehicleGroup>, MzoneError> {
        self.record("list_vehicle_groups".to_string());
        Ok(self.groups.clone())
    }

    async fn create_driver(&self, _token: &str, driver: &NewDriver) -> Result<String, MzoneError> {
        self.record(format!(
            "create_driver:{}|{}|{}",
            driver.first_name, driver.last_name, driver.driver_key
        ));
        self.check(&driver.first_name)?;
        Ok(format!("driver-{}", driver.driver_key))
    }
}
