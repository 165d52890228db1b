mod config;
mod engine;
mod error;
mod executors;
mod job_controller;
mod mzone;
mod report;
mod services;
mod spreadsheet;
mod storage;

use crate::config::AppConfig;
use crate::job_controller::state::{start_job_updater, JobsState};
use crate::mzone::client::MzoneClient;
use crate::mzone::VendorApi;
use crate::services::AppState;
use crate::storage::SqliteRoutineRepository;
use actix_web::{web, App, HttpServer};
use env_logger::Env;
use log::info;
use std::io;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(io::Error::other)?;
    std::fs::create_dir_all(&config.upload_dir)?;

    let repository = SqliteRoutineRepository::open(&config.database_path).map_err(io::Error::other)?;
    let vendor: Arc<dyn VendorApi> =
        Arc::new(MzoneClient::new(config.mzone.clone()).map_err(io::Error::other)?);

    // Initialize job controller state
    let (jobs_state, rx) = JobsState::new(100);
    tokio::spawn(start_job_updater(
        jobs_state.jobs.clone(),
        rx,
        config.job_retention,
    ));

    let host = config.host.clone();
    let port = config.port;
    let app_state = web::Data::new(AppState {
        config,
        repository: Arc::new(repository),
        vendor,
    });

    info!("Server running at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(10 * 1024 * 1024)) // 10 MB
            .app_data(app_state.clone())
            .app_data(web::Data::new(jobs_state.clone()))
            .service(services::routines::configure_routes())
            .service(services::clients::configure_routes())
            .service(services::batches::configure_routes())
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
