//! Starts batch jobs.
//!
//! `schedule_batch_job` resolves the client before anything is registered, so an unknown
//! client is a synchronous 404 rather than a failed job. After that the job is `Pending`, the id
//! goes back to the caller and a task on the current worker:
//! 1. authenticates as the client (failure ends the job as `Failed`);
//! 2. runs the executor, pushing `InProgress { processed, total }` after every item;
//! 3. assembles the per-item results into a `BatchReport` and ends the job as `Completed`.

use crate::executors::add_to_group::add_vehicles_to_group;
use crate::executors::drivers::create_drivers;
use crate::executors::removal::{remove_vehicles, RemovalOptions};
use crate::executors::setup::setup_vehicles;
use crate::executors::share::share_vehicles;
use crate::executors::{BatchContext, BatchRunner};
use crate::job_controller::state::JobsState;
use crate::report;
use crate::services::{storage_error_response, AppState};
use actix_web::{web, HttpResponse, Responder};
use common::jobs::JobStatus;
use common::model::operation::OperationResult;
use common::requests::{
    AddToGroupRequest, DriverBatchRequest, DriverItem, RemovalRequest, SetupItem, SetupRequest,
    ShareRequest,
};
use log::{error, info};
use serde_json::json;

/// One batch, with everything its executor needs besides the vendor session.
#[derive(Debug, Clone)]
pub(crate) enum BatchJob {
    AddToGroup {
        group_id: String,
        vehicles: Vec<String>,
    },
    Share {
        share_group_id: String,
        vehicles: Vec<String>,
    },
    Removal {
        options: RemovalOptions,
        vehicles: Vec<String>,
    },
    Setup(Vec<SetupItem>),
    Drivers(Vec<DriverItem>),
}

impl BatchJob {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            BatchJob::AddToGroup { .. } => "add-to-group",
            BatchJob::Share { .. } => "share",
            BatchJob::Removal { .. } => "removal",
            BatchJob::Setup(_) => "setup",
            BatchJob::Drivers(_) => "drivers",
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            BatchJob::AddToGroup { vehicles, .. }
            | BatchJob::Share { vehicles, .. }
            | BatchJob::Removal { vehicles, .. } => vehicles.len(),
            BatchJob::Setup(items) => items.len(),
            BatchJob::Drivers(drivers) => drivers.len(),
        }
    }

    pub(crate) async fn run(&self, ctx: &BatchContext<'_>) -> Vec<OperationResult> {
        match self {
            BatchJob::AddToGroup { group_id, vehicles } => {
                add_vehicles_to_group(ctx, group_id, vehicles).await
            }
            BatchJob::Share {
                share_group_id,
                vehicles,
            } => share_vehicles(ctx, share_group_id, vehicles).await,
            BatchJob::Removal { options, vehicles } => {
                remove_vehicles(ctx, options, vehicles).await
            }
            BatchJob::Setup(items) => setup_vehicles(ctx, items).await,
            BatchJob::Drivers(drivers) => create_drivers(ctx, drivers).await,
        }
    }
}

pub(crate) async fn add_to_group(
    app: web::Data<AppState>,
    jobs: web::Data<JobsState>,
    payload: web::Json<AddToGroupRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    let job = BatchJob::AddToGroup {
        group_id: req.vehicle_group_id,
        vehicles: req.vehicles,
    };
    schedule_batch_job(app, jobs, &req.client_id, job).await
}

pub(crate) async fn share(
    app: web::Data<AppState>,
    jobs: web::Data<JobsState>,
    payload: web::Json<ShareRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    let job = BatchJob::Share {
        share_group_id: req.share_group_id,
        vehicles: req.vehicles,
    };
    schedule_batch_job(app, jobs, &req.client_id, job).await
}

pub(crate) async fn removal(
    app: web::Data<AppState>,
    jobs: web::Data<JobsState>,
    payload: web::Json<RemovalRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    let job = BatchJob::Removal {
        options: RemovalOptions {
            strip_groups: req.strip_groups,
            removed_group_id: req.removed_group_id.filter(|id| !id.trim().is_empty()),
        },
        vehicles: req.vehicles,
    };
    schedule_batch_job(app, jobs, &req.client_id, job).await
}

pub(crate) async fn setup(
    app: web::Data<AppState>,
    jobs: web::Data<JobsState>,
    payload: web::Json<SetupRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    schedule_batch_job(app, jobs, &req.client_id, BatchJob::Setup(req.items)).await
}

pub(crate) async fn drivers(
    app: web::Data<AppState>,
    jobs: web::Data<JobsState>,
    payload: web::Json<DriverBatchRequest>,
) -> impl Responder {
    let req = payload.into_inner();
    schedule_batch_job(app, jobs, &req.client_id, BatchJob::Drivers(req.drivers)).await
}

async fn schedule_batch_job(
    app: web::Data<AppState>,
    jobs: web::Data<JobsState>,
    client_id: &str,
    job: BatchJob,
) -> HttpResponse {
    let client = match app.repository.find_client(client_id) {
        Ok(client) => client,
        Err(e) => return storage_error_response(&e),
    };

    let job_id = jobs.register().await;
    let runner = BatchRunner::new(app.config.batch_concurrency);
    info!(
        "Job {}: {} of {} items for client '{}', {} at a time",
        job_id,
        job.label(),
        job.len(),
        client.name,
        runner.concurrency()
    );

    let jobs = jobs.into_inner();
    let vendor = app.vendor.clone();
    let id = job_id.clone();

    // The executor futures borrow the job and the token, so the task stays on this worker.
    actix_web::rt::spawn(async move {
        let token = match vendor
            .authenticate(&client.login, client.password.expose())
            .await
        {
            Ok(token) => token,
            Err(e) => {
                error!("Job {}: authentication for '{}' failed: {}", id, client.login, e);
                jobs.finish(&id, JobStatus::Failed(e.to_string())).await;
                return;
            }
        };

        let progress = |processed: usize, total: usize, _: &OperationResult| {
            jobs.report(&id, JobStatus::InProgress { processed, total });
        };
        let ctx = BatchContext {
            vendor: vendor.as_ref(),
            token: &token,
            runner,
            progress: Some(&progress),
        };

        let results = job.run(&ctx).await;
        let summary = report::assemble(&results);
        info!(
            "Job {}: {} succeeded, {} failed",
            id, summary.successes, summary.failures
        );
        jobs.finish(&id, JobStatus::Completed(summary)).await;
    });

    HttpResponse::Ok().json(json!({ "job_id": job_id }))
}
