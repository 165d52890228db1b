//! The routine engine: spreadsheet in, per-routine vendor actions out.
//!
//! A run reads the uploaded sheet, matches its rows against every stored routine and then,
//! routine by routine, performs the enabled actions for the matched vehicles. In
//! [`ExecutionMode::DryRun`] the actions are echoed back instead of sent to the vendor.
//!
//! Failures are contained at three levels:
//! - rows that match nothing become entries in the report's `errors`;
//! - a routine whose token or configuration fails gets `error` set and the run moves on;
//! - inside an action every vehicle gets its own success or failure.
//!
//! Only an unreadable spreadsheet or an unreachable store aborts the run.
//!
//! Nothing identifies a run, so two uploads of the same sheet dispatch the same actions twice.

pub mod matcher;

use crate::error::EngineError;
use crate::executors::add_to_group::add_vehicles_to_group;
use crate::executors::share::share_vehicles;
use crate::executors::{BatchContext, BatchRunner};
use crate::mzone::credentials::CredentialBroker;
use crate::mzone::VendorApi;
use crate::report;
use crate::spreadsheet::{self, ColumnMapping, PRODUCTION_COLUMNS, TEST_COLUMNS};
use crate::storage::RoutineRepository;
use common::model::report::{
    ActionOutcome, EngineReport, RoutineActions, RoutineReport, RunMode, RunSummary,
    SimulatedAction,
};
use common::model::spreadsheet::{ErrorReportEntry, ExcelRow};
use log::{info, warn};
use matcher::{match_rows, RoutineExecutionUnit};
use std::path::Path;

const MISSING_VEHICLE_GROUP: &str = "Rotina sem grupo de veículos configurado";
const MISSING_SHARE_GROUP: &str = "Rotina sem grupo de compartilhamento configurado";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Production,
    DryRun,
}

impl ExecutionMode {
    /// Each mode reads its own spreadsheet template.
    pub fn columns(&self) -> &'static ColumnMapping {
        match self {
            ExecutionMode::Production => &PRODUCTION_COLUMNS,
            ExecutionMode::DryRun => &TEST_COLUMNS,
        }
    }
}

pub struct RoutineEngine<'a> {
    repository: &'a dyn RoutineRepository,
    vendor: &'a dyn VendorApi,
    runner: BatchRunner,
}

impl<'a> RoutineEngine<'a> {
    pub fn new(
        repository: &'a dyn RoutineRepository,
        vendor: &'a dyn VendorApi,
        runner: BatchRunner,
    ) -> Self {
        Self {
            repository,
            vendor,
            runner,
        }
    }

    pub async fn execute(
        &self,
        file_path: &Path,
        mode: ExecutionMode,
    ) -> Result<EngineReport, EngineError> {
        info!("Routine run ({:?}) on {}", mode, file_path.display());
        let rows = spreadsheet::read_rows(file_path, mode.columns())?;
        self.execute_rows(rows, mode).await
    }

    pub async fn execute_rows(
        &self,
        rows: Vec<ExcelRow>,
        mode: ExecutionMode,
    ) -> Result<EngineReport, EngineError> {
        if rows.is_empty() {
            warn!("Spreadsheet has no valid rows");
            return Ok(EngineReport {
                summary: RunSummary {
                    total_excel_rows: 0,
                    ..RunSummary::default()
                },
                routines: Vec::new(),
                errors: vec![ErrorReportEntry::no_valid_rows()],
            });
        }

        let routines = self.repository.all_routines()?;
        let outcome = match_rows(&rows, &routines);
        info!(
            "{} rows matched {} routines, {} rows rejected",
            rows.len(),
            outcome.units.len(),
            outcome.errors.len()
        );

        let mut broker = CredentialBroker::new(self.vendor);
        let mut reports = Vec::with_capacity(outcome.units.len());
        for unit in outcome.units {
            let report = match mode {
                ExecutionMode::Production => self.run_unit(&mut broker, unit).await,
                ExecutionMode::DryRun => simulate_unit(unit),
            };
            reports.push(report);
        }

        Ok(EngineReport {
            summary: RunSummary {
                total_excel_rows: rows.len(),
                matched_routines: Some(reports.len()),
                error_count: Some(outcome.errors.len()),
                mode: match mode {
                    ExecutionMode::Production => None,
                    ExecutionMode::DryRun => Some(RunMode::Test),
                },
            },
            routines: reports,
            errors: outcome.errors,
        })
    }

    async fn run_unit(
        &self,
        broker: &mut CredentialBroker<'_>,
        unit: RoutineExecutionUnit,
    ) -> RoutineReport {
        let routine = &unit.routine;
        info!(
            "Running routine '{}' for {} vehicles",
            routine.name,
            unit.vehicles.len()
        );
        let mut actions = RoutineActions::default();

        let result: Result<(), String> = async {
            let token = broker
                .token_for(&routine.client)
                .await
                .map_err(|e| e.to_string())?;
            let ctx = BatchContext {
                vendor: self.vendor,
                token: &token,
                runner: self.runner,
                progress: None,
            };

            if routine.add_vehicle_to_group {
                let group = routine
                    .vehicle_group
                    .as_deref()
                    .ok_or_else(|| MISSING_VEHICLE_GROUP.to_string())?;
                let results = add_vehicles_to_group(&ctx, group, &unit.vehicles).await;
                actions.add_vehicle_to_group =
                    Some(ActionOutcome::Executed(report::assemble(&results)));
            }

            if routine.share_vehicle {
                let group = routine
                    .share_group
                    .as_deref()
                    .ok_or_else(|| MISSING_SHARE_GROUP.to_string())?;
                let results = share_vehicles(&ctx, group, &unit.vehicles).await;
                actions.share_vehicle = Some(ActionOutcome::Executed(report::assemble(&results)));
            }

            Ok(())
        }
        .await;

        let error = match result {
            Ok(()) => None,
            Err(e) => {
                warn!("Routine '{}' aborted: {}", routine.name, e);
                Some(e)
            }
        };
        unit_report(&unit, actions, error)
    }
}

fn simulate_unit(unit: RoutineExecutionUnit) -> RoutineReport {
    let routine = &unit.routine;
    let echo = |vehicle_group_id: Option<String>, share_group_id: Option<String>| {
        ActionOutcome::Simulated(SimulatedAction {
            simulated: true,
            vehicle_group_id,
            share_group_id,
            vehicles: unit.vehicles.clone(),
            total_vehicles: unit.vehicles.len(),
        })
    };

    let actions = RoutineActions {
        add_vehicle_to_group: routine
            .add_vehicle_to_group
            .then(|| echo(routine.vehicle_group.clone(), None)),
        share_vehicle: routine
            .share_vehicle
            .then(|| echo(None, routine.share_group.clone())),
    };
    unit_report(&unit, actions, None)
}

fn unit_report(
    unit: &RoutineExecutionUnit,
    actions: RoutineActions,
    error: Option<String>,
) -> RoutineReport {
    RoutineReport {
        routine_id: unit.routine.id.clone(),
        routine_name: unit.routine.name.clone(),
        client_name: unit.routine.client.name.clone(),
        vehicles: unit.vehicles.clone(),
        total_vehicles: unit.vehicles.len(),
        actions,
        error,
    }
}
