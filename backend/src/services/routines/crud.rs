use crate::services::{storage_error_response, AppState};
use actix_web::{web, HttpResponse, Responder};
use common::model::routine::RoutineInput;

pub(crate) async fn list(state: web::Data<AppState>) -> impl Responder {
    match state.repository.list_routines() {
        Ok(routines) => HttpResponse::Ok().json(routines),
        Err(e) => storage_error_response(&e),
    }
}

pub(crate) async fn save(
    state: web::Data<AppState>,
    payload: web::Json<RoutineInput>,
) -> impl Responder {
    match state.repository.save_routine(&payload.into_inner()) {
        Ok(routine) => HttpResponse::Ok().json(routine),
        Err(e) => storage_error_response(&e),
    }
}

pub(crate) async fn remove(
    state: web::Data<AppState>,
    routine_id: web::Path<String>,
) -> impl Responder {
    match state.repository.delete_routine(&routine_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => storage_error_response(&e),
    }
}
