//! Spreadsheet runs, production and dry-run.
//!
//! The uploaded file lives in a temporary file for the duration of the run and is removed when
//! the handler returns, whatever the outcome.

use crate::engine::{ExecutionMode, RoutineEngine};
use crate::error::UploadError;
use crate::executors::BatchRunner;
use crate::services::upload::receive_spreadsheet;
use crate::services::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use log::{error, info};
use serde_json::json;

pub(crate) async fn production(state: web::Data<AppState>, payload: Multipart) -> impl Responder {
    run(state, payload, ExecutionMode::Production).await
}

pub(crate) async fn dry_run(state: web::Data<AppState>, payload: Multipart) -> impl Responder {
    run(state, payload, ExecutionMode::DryRun).await
}

async fn run(state: web::Data<AppState>, payload: Multipart, mode: ExecutionMode) -> HttpResponse {
    let sheet = match receive_spreadsheet(payload, &state.config.upload_dir).await {
        Ok(sheet) => sheet,
        Err(UploadError::Io(e)) => {
            error!("Could not store upload: {}", e);
            return HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }));
        }
        Err(e) => return HttpResponse::BadRequest().json(json!({ "error": e.to_string() })),
    };
    info!(
        "Received '{}' ({} bytes, md5 {})",
        sheet.filename, sheet.size, sheet.md5
    );

    let engine = RoutineEngine::new(
        state.repository.as_ref(),
        state.vendor.as_ref(),
        BatchRunner::new(state.config.batch_concurrency),
    );
    match engine.execute(sheet.file.path(), mode).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => {
            error!("Routine run on '{}' failed: {}", sheet.filename, e);
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}
