//! Background batch jobs against the vendor.
//!
//! Every `POST` validates the client, registers a job and answers `{ "job_id": ... }` at once.
//! The work runs after the response; its progress and final `BatchReport` are polled through
//! `GET /api/batches/status/{job_id}`.
//!
//! - `POST /api/batches/add-to-group`
//! - `POST /api/batches/share`
//! - `POST /api/batches/removal`
//! - `POST /api/batches/setup`
//! - `POST /api/batches/drivers`

use actix_web::web::{get, post, scope};
use actix_web::Scope;

mod get_status;
mod start;

const API_PATH: &str = "/api/batches";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/add-to-group", post().to(start::add_to_group))
        .route("/share", post().to(start::share))
        .route("/removal", post().to(start::removal))
        .route("/setup", post().to(start::setup))
        .route("/drivers", post().to(start::drivers))
        .route("/status/{job_id}", get().to(get_status::process))
}
