use crate::job_controller::state::JobsState;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

pub(crate) async fn process(job_id: web::Path<String>, state: web::Data<JobsState>) -> impl Responder {
    match state.status(&job_id.into_inner()).await {
        Some(status) => HttpResponse::Ok().json(status),
        None => HttpResponse::NotFound().json(json!({ "error": "Job ID not found" })),
    }
}
