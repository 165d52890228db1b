use thiserror::Error;

/// Failures talking to the Mzone telematics API.
#[derive(Error, Debug)]
pub enum MzoneError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Mzone returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

/// Failures of the client/routine store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid record: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors that abort an engine run instead of being reported inside it.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Spreadsheet(#[from] SpreadsheetError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Problems receiving an uploaded spreadsheet.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Multipart error: {0}")]
    Multipart(#[from] actix_multipart::MultipartError),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing 'file' field")]
    MissingFile,

    #[error("Unsupported file type '{0}', expected .csv, .tsv or .txt")]
    UnsupportedType(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {0} must be set")]
    Missing(&'static str),

    #[error("Environment variable {name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}
