//! HTTP surface of the back-office.
//!
//! Each sub-module owns one `/api/...` scope and returns it from `configure_routes`, which
//! `main.rs` mounts on the Actix `App`.

pub mod batches;
pub mod clients;
pub mod routines;
mod upload;

use crate::config::AppConfig;
use crate::error::StorageError;
use crate::mzone::VendorApi;
use crate::storage::SqliteRoutineRepository;
use actix_web::HttpResponse;
use log::error;
use serde_json::json;
use std::sync::Arc;

/// Long-lived collaborators shared by every handler.
pub struct AppState {
    pub config: AppConfig,
    pub repository: Arc<SqliteRoutineRepository>,
    pub vendor: Arc<dyn VendorApi>,
}

/// Maps store failures onto HTTP statuses with a `{ "error": ... }` body.
pub(crate) fn storage_error_response(err: &StorageError) -> HttpResponse {
    let body = json!({ "error": err.to_string() });
    match err {
        StorageError::NotFound(_) => HttpResponse::NotFound().json(body),
        StorageError::Invalid(_) => HttpResponse::BadRequest().json(body),
        StorageError::Sqlite(e) => {
            error!("Database failure: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job_controller::state::{start_job_updater, JobsState};
    use crate::mzone::fake::FakeVendor;
    use actix_web::http::{header, StatusCode};
    use actix_web::web;
    use actix_web::{test, App};
    use common::jobs::JobStatus;
    use serde_json::Value;
    use std::time::Duration;
    use tempfile::TempDir;

    const BOUNDARY: &str = "fleetboundary";

    fn app_state(dir: &TempDir, vendor: Arc<FakeVendor>) -> web::Data<AppState> {
        let upload_dir = dir.path().join("uploads");
        std::fs::create_dir_all(&upload_dir).unwrap();
        let db = dir.path().join("fleet.sqlite");
        let config = AppConfig::from_lookup(|name| match name {
            "MZONE_AUTH_URL" => Some("https://auth.example/token".to_string()),
            "MZONE_API_URL" => Some("https://api.example/mzone".to_string()),
            "MZONE_CLIENT_ID" => Some("fleet".to_string()),
            "MZONE_CLIENT_SECRET" => Some("secret".to_string()),
            "FLEET_DATABASE" => Some(db.display().to_string()),
            "FLEET_UPLOAD_DIR" => Some(upload_dir.display().to_string()),
            _ => None,
        })
        .unwrap();
        web::Data::new(AppState {
            repository: Arc::new(SqliteRoutineRepository::open(&config.database_path).unwrap()),
            config,
            vendor,
        })
    }

    fn multipart(filename: &str, content: &str) -> (String, String) {
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
             Content-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
            b = BOUNDARY,
            f = filename,
            c = content
        );
        (format!("multipart/form-data; boundary={}", BOUNDARY), body)
    }

    #[actix_web::test]
    async fn clients_are_listed_without_passwords() {
        let dir = TempDir::new().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(app_state(&dir, Arc::new(FakeVendor::new())))
                .service(clients::configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/clients")
            .set_json(serde_json::json!({
                "name": "Acme", "login": "acme", "password": "pw", "type": "client"
            }))
            .to_request();
        let created: Value = test::call_and_read_body_json(&app, req).await;
        assert!(!created["id"].as_str().unwrap().is_empty());

        let req = test::TestRequest::get().uri("/api/clients").to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed[0]["login"], "acme");
        assert!(listed[0].get("password").is_none());
    }

    #[actix_web::test]
    async fn deleting_an_unknown_routine_is_not_found() {
        let dir = TempDir::new().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(app_state(&dir, Arc::new(FakeVendor::new())))
                .service(routines::configure_routes()),
        )
        .await;

        let req = test::TestRequest::delete().uri("/api/routines/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_run_echoes_the_matched_routine() {
        let dir = TempDir::new().unwrap();
        let vendor = Arc::new(FakeVendor::new());
        let state = app_state(&dir, vendor.clone());
        let client = state
            .repository
            .save_client(&crate::mzone::fake::sample_client("", "acme"))
            .unwrap();
        state
            .repository
            .save_routine(&common::model::routine::RoutineInput {
                id: None,
                name: "Acme trucks".to_string(),
                client_id: client.id,
                client_identificator: "ACME".to_string(),
                group_identificator: None,
                add_vehicle_to_group: true,
                vehicle_group: Some("G1".to_string()),
                share_vehicle: false,
                share_group: None,
            })
            .unwrap();
        let app = test::init_service(
            App::new()
                .app_data(state)
                .service(routines::configure_routes()),
        )
        .await;

        let (content_type, body) = multipart(
            "sheet.csv",
            "Chassi;Cliente;Grupo de Veículos\nVIN1;Acme;\nVIN2;Other;\n",
        );
        let req = test::TestRequest::post()
            .uri("/api/routines/test")
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
            .to_request();
        let report: Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(report["summary"]["mode"], "TEST");
        assert_eq!(report["summary"]["totalExcelRows"], 2);
        assert_eq!(report["routines"][0]["vehicles"][0], "VIN1");
        assert_eq!(report["errors"].as_array().unwrap().len(), 1);
        // Nothing reached the vendor, not even a login.
        assert!(vendor.calls().is_empty());
        assert!(dir.path().join("uploads").read_dir().unwrap().next().is_none());
    }

    #[actix_web::test]
    async fn upload_without_a_file_field_is_rejected() {
        let dir = TempDir::new().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(app_state(&dir, Arc::new(FakeVendor::new())))
                .service(routines::configure_routes()),
        )
        .await;

        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nx\r\n--{b}--\r\n",
            b = BOUNDARY
        );
        let req = test::TestRequest::post()
            .uri("/api/routines/execute")
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn batch_for_unknown_client_is_not_scheduled() {
        let dir = TempDir::new().unwrap();
        let (jobs, _rx) = JobsState::new(8);
        let app = test::init_service(
            App::new()
                .app_data(app_state(&dir, Arc::new(FakeVendor::new())))
                .app_data(web::Data::new(jobs.clone()))
                .service(batches::configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/batches/share")
            .set_json(serde_json::json!({
                "clientId": "ghost", "shareGroupId": "U1", "vehicles": ["VIN1"]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(jobs.jobs.read().await.is_empty());
    }

    #[actix_web::test]
    async fn batch_job_completes_with_a_report() {
        let dir = TempDir::new().unwrap();
        let state = app_state(&dir, Arc::new(FakeVendor::new().with_vehicle("VIN1", "Truck 1")));
        let client = state
            .repository
            .save_client(&crate::mzone::fake::sample_client("", "acme"))
            .unwrap();
        let (jobs, rx) = JobsState::new(8);
        actix_web::rt::spawn(start_job_updater(
            jobs.jobs.clone(),
            rx,
            Duration::from_secs(60),
        ));
        let app = test::init_service(
            App::new()
                .app_data(state)
                .app_data(web::Data::new(jobs.clone()))
                .service(batches::configure_routes()),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/batches/add-to-group")
            .set_json(serde_json::json!({
                "clientId": client.id, "vehicleGroupId": "G1", "vehicles": ["VIN1", "VIN404"]
            }))
            .to_request();
        let started: Value = test::call_and_read_body_json(&app, req).await;
        let job_id = started["job_id"].as_str().unwrap().to_string();

        let mut status = None;
        for _ in 0..50 {
            let req = test::TestRequest::get()
                .uri(&format!("/api/batches/status/{}", job_id))
                .to_request();
            let current: JobStatus = test::call_and_read_body_json(&app, req).await;
            if matches!(current, JobStatus::Completed(_) | JobStatus::Failed(_)) {
                status = Some(current);
                break;
            }
            actix_web::rt::time::sleep(Duration::from_millis(20)).await;
        }

        match status {
            Some(JobStatus::Completed(report)) => {
                assert_eq!(report.total, 2);
                assert_eq!(report.successes, 1);
                assert_eq!(report.failures, 1);
            }
            other => panic!("job did not complete: {:?}", other),
        }
    }

    #[actix_web::test]
    async fn unknown_job_is_not_found() {
        let (jobs, _rx) = JobsState::new(1);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(jobs))
                .service(batches::configure_routes()),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/batches/status/missing").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
