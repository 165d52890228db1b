use serde::{Deserialize, Serialize};
use std::fmt;

/// The role a stored client plays in the back-office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientType {
    Admin,
    User,
    Client,
}

impl ClientType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientType::Admin => "admin",
            ClientType::User => "user",
            ClientType::Client => "client",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(ClientType::Admin),
            "user" => Some(ClientType::User),
            "client" => Some(ClientType::Client),
            _ => None,
        }
    }
}

/// A vendor login password.
///
/// Stored as plain text, which is a known deficiency of the credential store. The value is
/// accepted from requests but never serialised back out and never printed by `Debug`.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Password(String);

impl Password {
    pub fn new(value: impl Into<String>) -> Self {
        Password(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// Owner of one or more routines; its login is what the engine authenticates with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub login: String,
    #[serde(skip_serializing, default)]
    pub password: Password,
    #[serde(rename = "type")]
    pub client_type: ClientType,
}

/// An automation rule: which spreadsheet rows it accepts and which vendor actions it triggers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub client: Client,
    /// Matched against the spreadsheet "cliente" column. Stored trimmed and lower-cased.
    pub client_identificator: String,
    /// When present, the row's "grupo" column must equal it as well.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_identificator: Option<String>,
    #[serde(default)]
    pub add_vehicle_to_group: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vehicle_group: Option<String>,
    #[serde(default)]
    pub share_vehicle: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_group: Option<String>,
}

/// Payload for creating or updating a routine; the client is referenced by id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutineInput {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub client_id: String,
    pub client_identificator: String,
    #[serde(default)]
    pub group_identificator: Option<String>,
    #[serde(default)]
    pub add_vehicle_to_group: bool,
    #[serde(default)]
    pub vehicle_group: Option<String>,
    #[serde(default)]
    pub share_vehicle: bool,
    #[serde(default)]
    pub share_group: Option<String>,
}

/// Lower-cases and trims an identificator the way routines store them.
/// Returns `None` when nothing is left.
pub fn normalize_identificator(value: &str) -> Option<String> {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}
