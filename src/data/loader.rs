//! CSV and JSON loading.

use std::io::Read;
use std::path::Path;

use serde_json::Value as JsonValue;

use super::{DataError, DataTable, Value};

impl DataTable {
    /// Read CSV with a header row. Cells are typed by [`Value::infer`].
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in csv_reader.records() {
            let record = record?;
            rows.push(record.iter().map(Value::infer).collect());
        }

        let table = DataTable::new(columns, rows);
        if table.is_empty() {
            return Err(DataError::Empty);
        }
        Ok(table)
    }

    pub fn from_csv_str(text: &str) -> Result<Self, DataError> {
        Self::from_csv_reader(text.as_bytes())
    }

    /// Build from a JSON array of objects. Column order follows first appearance.
    pub fn from_json_records(value: &JsonValue) -> Result<Self, DataError> {
        let records = value
            .as_array()
            .ok_or_else(|| DataError::InvalidRecords("expected a JSON array".to_string()))?;

        let mut columns: Vec<String> = Vec::new();
        for (i, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| {
                DataError::InvalidRecords(format!("record {} is not an object", i))
            })?;
            for key in object.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .filter_map(|r| r.as_object())
            .map(|object| {
                columns
                    .iter()
                    .map(|col| object.get(col).map(Value::from_json).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        let table = DataTable::new(columns, rows);
        if table.is_empty() {
            return Err(DataError::Empty);
        }
        Ok(table)
    }

    /// Load a file, choosing the parser by extension.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        tracing::debug!(path = %path.display(), format = %extension, "Loading dataset");

        match extension.as_str() {
            "csv" => Self::from_csv_reader(std::fs::File::open(path)?),
            "json" => {
                let text = std::fs::read_to_string(path)?;
                Self::from_json_records(&serde_json::from_str(&text)?)
            }
            other => Err(DataError::UnsupportedFormat(other.to_string())),
        }
    }
}
