//! Tabular input.
//!
//! Tables are loaded from CSV or JSON record arrays into a column-ordered,
//! dynamically typed grid of [`Value`] cells.

mod loader;
mod table;

pub use table::{DataTable, Value};
pub(crate) use table::number_to_json;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("Dataset has no rows or columns")]
    Empty,

    #[error("Unsupported data format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid JSON records: {0}")]
    InvalidRecords(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
