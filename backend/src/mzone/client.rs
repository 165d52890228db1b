use super::{odata, NewDriver, VehicleGroup, VehiclePatch, VehicleRef, VendorApi};
use crate::config::MzoneConfig;
use crate::error::MzoneError;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// OData collections come wrapped in `{ "value": [...] }`.
#[derive(Deserialize)]
struct Collection<T> {
    value: Vec<T>,
}

#[derive(Deserialize)]
struct IdOnly {
    id: String,
}

/// reqwest-backed [`VendorApi`].
pub struct MzoneClient {
    http_client: Client,
    config: MzoneConfig,
}

impl MzoneClient {
    pub fn new(config: MzoneConfig) -> Result<Self, MzoneError> {
        let http_client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            config,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, MzoneError> {
        let response = request.send().await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Err(MzoneError::Status { status, body })
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MzoneError> {
        debug!("GET {}", path);
        let response = self
            .send(
                self.http_client
                    .get(self.url(path))
                    .bearer_auth(token)
                    .query(query),
            )
            .await?;
        response
            .json::<T>()
            .await
            .map_err(|e| MzoneError::Decode(e.to_string()))
    }

    async fn post_action(
        &self,
        token: &str,
        path: &str,
        body: serde_json::Value,
    ) -> Result<(), MzoneError> {
        debug!("POST {}", path);
        self.send(
            self.http_client
                .post(self.url(path))
                .bearer_auth(token)
                .json(&body),
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl VendorApi for MzoneClient {
    async fn authenticate(&self, login: &str, password: &str) -> Result<String, MzoneError> {
        debug!("Requesting token for {}", login);
        let response = self
            .http_client
            .post(&self.config.auth_url)
            .form(&[
                ("grant_type", "password"),
                ("username", login),
                ("password", password),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("scope", self.config.scope.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MzoneError::Auth(format!("HTTP {}: {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| MzoneError::Decode(e.to_string()))?;
        Ok(token.access_token)
    }

    async fn find_vehicle(
        &self,
        token: &str,
        identifier: &str,
    ) -> Result<Option<VehicleRef>, MzoneError> {
        let filter = odata::any_of(&[
            odata::eq("vin", identifier),
            odata::eq("description", identifier),
        ]);
        let page: Collection<VehicleRef> = self
            .get_json(
                token,
                "Vehicles",
                &[
                    ("$filter", filter),
                    ("$select", "id,vin,description".to_string()),
                    ("$top", "1".to_string()),
                ],
            )
            .await?;
        Ok(page.value.into_iter().next())
    }

    async fn patch_vehicle(
        &self,
        token: &str,
        vehicle_id: &str,
        patch: &VehiclePatch,
    ) -> Result<(), MzoneError> {
        let path = format!("Vehicles({})", vehicle_id);
        debug!("PATCH {}", path);
        self.send(
            self.http_client
                .patch(self.url(&path))
                .bearer_auth(token)
                .json(patch),
        )
        .await?;
        Ok(())
    }

    async fn vehicle_group_ids(
        &self,
        token: &str,
        vehicle_id: &str,
    ) -> Result<Vec<String>, MzoneError> {
        let path = format!("Vehicles({})/vehicleGroups", vehicle_id);
        let page: Collection<IdOnly> = self
            .get_json(token, &path, &[("$select", "id".to_string())])
            .await?;
        Ok(page.value.into_iter().map(|g| g.id).collect())
    }

    async fn remove_vehicle_groups(
        &self,
        token: &str,
        vehicle_id: &str,
        group_ids: &[String],
    ) -> Result<(), MzoneError> {
        let path = format!("Vehicles({})/_.removeVehicleGroups", vehicle_id);
        self.post_action(token, &path, json!({ "vehicleGroupIds": group_ids }))
            .await
    }

    async fn add_vehicles_to_group(
        &self,
        token: &str,
        group_id: &str,
        vehicle_ids: &[String],
    ) -> Result<(), MzoneError> {
        let path = format!("VehicleGroups({})/_.addVehicles", group_id);
        self.post_action(token, &path, json!({ "vehicleIds": vehicle_ids }))
            .await
    }

    async fn share_vehicle(
        &self,
        token: &str,
        vehicle_id: &str,
        user_group_id: &str,
    ) -> Result<(), MzoneError> {
        let path = format!("VehicleShareManagement({})/_.share", vehicle_id);
        self.post_action(token, &path, json!({ "userGroupIds": [user_group_id] }))
            .await
    }

    async fn list_vehicle_groups(&self, token: &str) -> Result<Vec<VehicleGroup>, MzoneError> {
        let page_size = self.config.page_size.max(1);
        let mut groups = Vec::new();
        let mut skip = 0usize;

        loop {
            let page: Collection<VehicleGroup> = self
                .get_json(
                    token,
                    "VehicleGroups",
                    &[
                        ("$select", "id,description".to_string()),
                        ("$top", page_size.to_string()),
                        ("$skip", skip.to_string()),
                    ],
                )
                .await?;
            let fetched = page.value.len();
            groups.extend(page.value);
            if fetched < page_size {
                break;
            }
            skip += fetched;
            // Keep paging gentle on the vendor.
            tokio::time::sleep(self.config.page_delay).await;
        }

        Ok(groups)
    }

    async fn create_driver(&self, token: &str, driver: &NewDriver) -> Result<String, MzoneError> {
        debug!("POST Drivers");
        let response = self
            .send(
                self.http_client
                    .post(self.url("Drivers"))
                    .bearer_auth(token)
                    .json(driver),
            )
            .await?;
        let created: IdOnly = response
            .json()
            .await
            .map_err(|e| MzoneError::Decode(e.to_string()))?;
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, page_size: usize) -> MzoneClient {
        MzoneClient::new(MzoneConfig {
            auth_url: format!("{}/connect/token", server.uri()),
            api_url: server.uri(),
            client_id: "fleet".to_string(),
            client_secret: "secret".to_string(),
            scope: "openid mz6-api.all".to_string(),
            page_size,
            page_delay: Duration::from_millis(1),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn password_grant_returns_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/connect/token"))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("username=acme"))
            .and(body_string_contains("client_id=fleet"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "access_token": "tok-1", "expires_in": 3600 })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let token = client_for(&server, 500).authenticate("acme", "pw").await.unwrap();
        assert_eq!(token, "tok-1");
    }

    #[tokio::test]
    async fn rejected_login_is_an_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/connect/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
            .mount(&server)
            .await;

        let err = client_for(&server, 500)
            .authenticate("acme", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, MzoneError::Auth(msg) if msg.contains("invalid_grant")));
    }

    #[tokio::test]
    async fn vehicle_lookup_sends_escaped_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Vehicles"))
            .and(header("authorization", "Bearer tok"))
            .and(query_param(
                "$filter",
                "vin eq 'O''Brien''s Van' or description eq 'O''Brien''s Van'",
            ))
            .and(query_param("$top", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{ "id": "v-1", "vin": null, "description": "O'Brien's Van" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let vehicle = client_for(&server, 500)
            .find_vehicle("tok", "O'Brien's Van")
            .await
            .unwrap();
        assert_eq!(vehicle.map(|v| v.id), Some("v-1".to_string()));
    }

    #[tokio::test]
    async fn empty_collection_means_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Vehicles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "value": [] })))
            .mount(&server)
            .await;

        let vehicle = client_for(&server, 500).find_vehicle("tok", "VIN1").await.unwrap();
        assert_eq!(vehicle, None);
    }

    #[tokio::test]
    async fn non_success_status_carries_code_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/VehicleGroups(G1)/_.addVehicles"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/Vehicles(v-1)"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server, 500);
        let err = client
            .add_vehicles_to_group("tok", "G1", &["v-1".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, MzoneError::Status { status: 403, ref body } if body == "forbidden"));

        let err = client
            .patch_vehicle("tok", "v-1", &VehiclePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MzoneError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn share_posts_user_group_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/VehicleShareManagement(v-1)/_.share"))
            .and(body_string_contains("\"userGroupIds\":[\"U1\"]"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        client_for(&server, 500)
            .share_vehicle("tok", "v-1", "U1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn group_listing_pages_until_a_short_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/VehicleGroups"))
            .and(query_param("$top", "2"))
            .and(query_param("$skip", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [
                    { "id": "g1", "description": "Vans" },
                    { "id": "g2", "description": "Trucks" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/VehicleGroups"))
            .and(query_param("$top", "2"))
            .and(query_param("$skip", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "value": [{ "id": "g3", "description": "Removidos" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let groups = client_for(&server, 2).list_vehicle_groups("tok").await.unwrap();
        let ids: Vec<&str> = groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["g1", "g2", "g3"]);
    }

    #[tokio::test]
    async fn created_driver_returns_vendor_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Drivers"))
            .and(body_string_contains("\"driverKey\":1001"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": "d-9" })))
            .mount(&server)
            .await;

        let id = client_for(&server, 500)
            .create_driver(
                "tok",
                &NewDriver {
                    first_name: "Ana".to_string(),
                    last_name: "Souza".to_string(),
                    driver_key: 1001,
                },
            )
            .await
            .unwrap();
        assert_eq!(id, "d-9");
    }
}
