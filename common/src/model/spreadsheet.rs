use serde::{Deserialize, Serialize};

/// One normalised spreadsheet row.
///
/// `cliente` and `grupo` arrive trimmed and lower-cased from the reader; the matcher relies
/// on that and does not normalise them again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcelRow {
    /// 1-based sheet row, header included. Only used for error reporting.
    pub line: usize,
    pub chassi: String,
    pub cliente: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grupo: Option<String>,
}

/// Why a row (or the whole sheet) produced no work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorReason {
    #[serde(rename = "Linha incompleta (chassi ou cliente ausente)")]
    IncompleteRow,
    #[serde(rename = "Cliente não possui rotina cadastrada")]
    ClientWithoutRoutine,
    #[serde(rename = "Cliente possui rotina, mas grupo não corresponde")]
    GroupMismatch,
    #[serde(rename = "Nenhuma linha válida encontrada na planilha")]
    NoValidRows,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReportEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chassi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cliente: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grupo: Option<String>,
    pub reason: ErrorReason,
}

impl ErrorReportEntry {
    pub fn for_row(row: &ExcelRow, reason: ErrorReason) -> Self {
        ErrorReportEntry {
            line: Some(row.line),
            chassi: Some(row.chassi.clone()),
            cliente: Some(row.cliente.clone()),
            grupo: row.grupo.clone(),
            reason,
        }
    }

    pub fn no_valid_rows() -> Self {
        ErrorReportEntry {
            line: None,
            chassi: None,
            cliente: None,
            grupo: None,
            reason: ErrorReason::NoValidRows,
        }
    }
}
