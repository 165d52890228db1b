//! Joins spreadsheet rows against configured routines.
//!
//! Routines are indexed by client identificator. A row goes to every routine under its client
//! key that accepts it: a routine without a group identificator accepts any row, one with a
//! group identificator only rows carrying the same group. When several routines accept a row,
//! all of them get the vehicle. Rows that no routine takes produce exactly one error entry.

use common::model::routine::{normalize_identificator, Routine};
use common::model::spreadsheet::{ErrorReason, ErrorReportEntry, ExcelRow};
use std::collections::HashMap;

/// One routine plus the vehicles matched to it, in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineExecutionUnit {
    pub routine: Routine,
    pub vehicles: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    /// Ordered by the first row that matched each routine.
    pub units: Vec<RoutineExecutionUnit>,
    pub errors: Vec<ErrorReportEntry>,
}

#[cfg(test)]
impl MatchOutcome {
    pub fn unit(&self, routine_id: &str) -> Option<&RoutineExecutionUnit> {
        self.units.iter().find(|u| u.routine.id == routine_id)
    }
}

struct IndexedRoutine<'a> {
    routine: &'a Routine,
    group: Option<String>,
}

impl IndexedRoutine<'_> {
    fn accepts(&self, row: &ExcelRow) -> bool {
        match &self.group {
            None => true,
            Some(group) => row.grupo.as_deref().is_some_and(|g| !g.is_empty() && g == group),
        }
    }
}

/// Rows are expected already normalised by the reader (`cliente`/`grupo` trimmed and
/// lower-cased). Routines with a blank client identificator never match.
pub fn match_rows(rows: &[ExcelRow], routines: &[Routine]) -> MatchOutcome {
    let mut routine_map: HashMap<String, Vec<IndexedRoutine<'_>>> = HashMap::new();
    for routine in routines {
        let Some(client_key) = normalize_identificator(&routine.client_identificator) else {
            continue;
        };
        routine_map.entry(client_key).or_default().push(IndexedRoutine {
            routine,
            group: routine
                .group_identificator
                .as_deref()
                .and_then(normalize_identificator),
        });
    }

    let mut outcome = MatchOutcome::default();
    let mut positions: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        if row.chassi.is_empty() || row.cliente.is_empty() {
            outcome
                .errors
                .push(ErrorReportEntry::for_row(row, ErrorReason::IncompleteRow));
            continue;
        }

        let Some(candidates) = routine_map.get(&row.cliente) else {
            outcome
                .errors
                .push(ErrorReportEntry::for_row(row, ErrorReason::ClientWithoutRoutine));
            continue;
        };

        let mut accepted = false;
        for candidate in candidates.iter().filter(|c| c.accepts(row)) {
            accepted = true;
            let routine = candidate.routine;
            let position = *positions.entry(routine.id.as_str()).or_insert_with(|| {
                outcome.units.push(RoutineExecutionUnit {
                    routine: routine.clone(),
                    vehicles: Vec::new(),
                });
                outcome.units.len() - 1
            });
            outcome.units[position].vehicles.push(row.chassi.clone());
        }

        if !accepted {
            outcome
                .errors
                .push(ErrorReportEntry::for_row(row, ErrorReason::GroupMismatch));
        }
    }

    outcome
}
