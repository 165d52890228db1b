//! Vendor client accounts used by routines.
//!
//! - `GET /api/clients`: every client, passwords omitted.
//! - `POST /api/clients`: creates a client, or replaces it when `id` is given.

use crate::services::{storage_error_response, AppState};
use actix_web::web::{get, post, scope};
use actix_web::{web, HttpResponse, Responder, Scope};
use common::model::routine::Client;

const API_PATH: &str = "/api/clients";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get().to(list))
        .route("", post().to(save))
}

async fn list(state: web::Data<AppState>) -> impl Responder {
    match state.repository.list_clients() {
        Ok(clients) => HttpResponse::Ok().json(clients),
        Err(e) => storage_error_response(&e),
    }
}

async fn save(state: web::Data<AppState>, payload: web::Json<Client>) -> impl Responder {
    match state.repository.save_client(&payload.into_inner()) {
        Ok(client) => HttpResponse::Ok().json(client),
        Err(e) => storage_error_response(&e),
    }
}
