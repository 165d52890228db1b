//! SQLite-backed store of clients and routines.
//!
//! Connections are opened per call against the configured database file. Identificators are
//! normalised on the way in, so the matcher can compare them directly against spreadsheet
//! values.

use super::RoutineRepository;
use crate::error::StorageError;
use common::model::routine::{
    normalize_identificator, Client, ClientType, Password, Routine, RoutineInput,
};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS clients (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    login TEXT NOT NULL,
    password TEXT NOT NULL,
    type TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS routines (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    client_id TEXT NOT NULL REFERENCES clients(id),
    client_identificator TEXT NOT NULL,
    group_identificator TEXT,
    add_vehicle_to_group INTEGER NOT NULL DEFAULT 0,
    vehicle_group TEXT,
    share_vehicle INTEGER NOT NULL DEFAULT 0,
    share_group TEXT
);
";

const ROUTINE_SELECT: &str = "
SELECT r.id, r.name, r.client_identificator, r.group_identificator,
       r.add_vehicle_to_group, r.vehicle_group, r.share_vehicle, r.share_group,
       c.id, c.name, c.login, c.password, c.type
FROM routines r
JOIN clients c ON c.id = r.client_id
";

pub struct SqliteRoutineRepository {
    path: PathBuf,
}

impl SqliteRoutineRepository {
    /// Opens (creating if needed) the database at `path` and ensures the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let repository = Self {
            path: path.as_ref().to_path_buf(),
        };
        repository.connect()?.execute_batch(SCHEMA)?;
        info!("Routine store ready at {}", repository.path.display());
        Ok(repository)
    }

    fn connect(&self) -> Result<Connection, StorageError> {
        Ok(Connection::open(&self.path)?)
    }

    /// Inserts or updates a client. On update an empty password keeps the stored one, since
    /// passwords are never sent back to callers.
    pub fn save_client(&self, client: &Client) -> Result<Client, StorageError> {
        if client.login.trim().is_empty() {
            return Err(StorageError::Invalid("client login must not be empty".to_string()));
        }
        let mut saved = client.clone();
        if saved.id.trim().is_empty() {
            saved.id = Uuid::new_v4().to_string();
        }

        self.connect()?.execute(
            "INSERT INTO clients (id, name, login, password, type) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                login = excluded.login,
                password = COALESCE(NULLIF(excluded.password, ''), clients.password),
                type = excluded.type",
            params![
                saved.id,
                saved.name,
                saved.login.trim(),
                saved.password.expose(),
                saved.client_type.as_str()
            ],
        )?;
        self.find_client(&saved.id)
    }

    pub fn list_clients(&self) -> Result<Vec<Client>, StorageError> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT id, name, login, password, type FROM clients ORDER BY name")?;
        let clients = stmt
            .query_map([], |row| client_from_row(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(clients)
    }

    pub fn find_client(&self, id: &str) -> Result<Client, StorageError> {
        let conn = self.connect()?;
        conn.query_row(
            "SELECT id, name, login, password, type FROM clients WHERE id = ?1",
            params![id],
            |row| client_from_row(row, 0),
        )
        .optional()?
        .ok_or_else(|| StorageError::NotFound(format!("client {}", id)))
    }

    /// Inserts or replaces a routine. Identificators are trimmed and lower-cased; an empty
    /// group identificator is stored as NULL.
    pub fn save_routine(&self, input: &RoutineInput) -> Result<Routine, StorageError> {
        let client_identificator = normalize_identificator(&input.client_identificator)
            .ok_or_else(|| {
                StorageError::Invalid("clientIdentificator must not be empty".to_string())
            })?;
        let group_identificator = input
            .group_identificator
            .as_deref()
            .and_then(normalize_identificator);
        let client = self.find_client(&input.client_id)?;
        let id = input
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        self.connect()?.execute(
            "INSERT OR REPLACE INTO routines (id, name, client_id, client_identificator, group_identificator,
                add_vehicle_to_group, vehicle_group, share_vehicle, share_group)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                input.name,
                client.id,
                client_identificator,
                group_identificator,
                input.add_vehicle_to_group,
                blank_to_none(input.vehicle_group.as_deref()),
                input.share_vehicle,
                blank_to_none(input.share_group.as_deref()),
            ],
        )?;

        Ok(Routine {
            id,
            name: input.name.clone(),
            client,
            client_identificator,
            group_identificator,
            add_vehicle_to_group: input.add_vehicle_to_group,
            vehicle_group: blank_to_none(input.vehicle_group.as_deref()),
            share_vehicle: input.share_vehicle,
            share_group: blank_to_none(input.share_group.as_deref()),
        })
    }

    pub fn list_routines(&self) -> Result<Vec<Routine>, StorageError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY r.name", ROUTINE_SELECT))?;
        let routines = stmt
            .query_map([], routine_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(routines)
    }

    pub fn delete_routine(&self, id: &str) -> Result<(), StorageError> {
        let deleted = self
            .connect()?
            .execute("DELETE FROM routines WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(StorageError::NotFound(format!("routine {}", id)));
        }
        Ok(())
    }
}

impl RoutineRepository for SqliteRoutineRepository {
    fn all_routines(&self) -> Result<Vec<Routine>, StorageError> {
        self.list_routines()
    }
}

fn blank_to_none(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn client_from_row(row: &Row<'_>, offset: usize) -> rusqlite::Result<Client> {
    let raw_type: String = row.get(offset + 4)?;
    let client_type = ClientType::parse(&raw_type).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            offset + 4,
            rusqlite::types::Type::Text,
            format!("unknown client type '{}'", raw_type).into(),
        )
    })?;
    Ok(Client {
        id: row.get(offset)?,
        name: row.get(offset + 1)?,
        login: row.get(offset + 2)?,
        password: Password::new(row.get::<_, String>(offset + 3)?),
        client_type,
    })
}

fn routine_from_row(row: &Row<'_>) -> rusqlite::Result<Routine> {
    Ok(Routine {
        id: row.get(0)?,
        name: row.get(1)?,
        client_identificator: row.get(2)?,
        group_identificator: row.get(3)?,
        add_vehicle_to_group: row.get(4)?,
        vehicle_group: row.get(5)?,
        share_vehicle: row.get(6)?,
        share_group: row.get(7)?,
        client: client_from_row(row, 8)?,
    })
}
