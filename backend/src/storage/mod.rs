pub mod sqlite;

use crate::error::StorageError;
use common::model::routine::Routine;

/// Read access the routine engine needs: every routine with its owning client populated.
pub trait RoutineRepository: Send + Sync {
    fn all_routines(&self) -> Result<Vec<Routine>, StorageError>;
}

pub use sqlite::SqliteRoutineRepository;
