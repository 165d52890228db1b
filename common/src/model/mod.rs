pub mod operation;
pub mod report;
pub mod routine;
pub mod spreadsheet;
