//! Routine management and spreadsheet runs.
//!
//! Routes:
//! - `GET /api/routines`: every stored routine with its client.
//! - `POST /api/routines`: creates or replaces a routine (`RoutineInput` JSON).
//! - `DELETE /api/routines/{routine_id}`
//! - `POST /api/routines/execute`: multipart upload with a `file` field; runs every matching
//!   routine against the vendor and answers with the full report.
//! - `POST /api/routines/test`: same upload, test template, nothing is sent to the vendor.

use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

mod crud;
mod execute;

const API_PATH: &str = "/api/routines";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(crud::list))
        .route("", post().to(crud::save))
        .route("/execute", post().to(execute::production))
        .route("/test", post().to(execute::dry_run))
        .route("/{routine_id}", delete().to(crud::remove))
}
