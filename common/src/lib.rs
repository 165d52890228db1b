//! Data model shared between the fleet back-office server and its clients.
//!
//! Everything in here is plain serde data: routines and the clients that own them, the rows
//! read from an uploaded spreadsheet, the per-item results produced by the batch executors and
//! the reports assembled from them.

pub mod jobs;
pub mod model;
pub mod requests;
