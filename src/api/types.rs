//! API request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::data::{DataError, DataTable};
use crate::goals::Persona;
use crate::profile::FieldProfile;
use crate::summarize::{DataSummary, SummaryMethod};

/// A dataset sent inline with a request. Exactly one of `csv` or `records`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatasetInput {
    /// Display name for the dataset
    #[serde(default)]
    pub name: Option<String>,

    /// Original file name, if the data came from a file
    #[serde(default)]
    pub file_name: Option<String>,

    /// CSV text with a header row
    #[serde(default)]
    pub csv: Option<String>,

    /// Array of JSON objects
    #[serde(default)]
    pub records: Option<JsonValue>,
}

impl DatasetInput {
    pub fn to_table(&self) -> Result<DataTable, DataError> {
        match (&self.csv, &self.records) {
            (Some(csv), None) => DataTable::from_csv_str(csv),
            (None, Some(records)) => DataTable::from_json_records(records),
            (Some(_), Some(_)) => Err(DataError::UnsupportedFormat(
                "send either 'csv' or 'records', not both".to_string(),
            )),
            (None, None) => Err(DataError::UnsupportedFormat(
                "missing 'csv' or 'records'".to_string(),
            )),
        }
    }

    pub fn file_name(&self) -> String {
        match &self.file_name {
            Some(f) => f.clone(),
            None if self.records.is_some() => "data.json".to_string(),
            None => "data.csv".to_string(),
        }
    }

    /// Explicit name if given, otherwise empty so the model may propose one.
    pub fn name(&self) -> String {
        self.name.clone().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    pub data: DatasetInput,

    #[serde(default)]
    pub n_samples: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub rows: usize,
    pub fields: Vec<FieldProfile>,
}

#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub data: DatasetInput,

    #[serde(default)]
    pub method: SummaryMethod,

    #[serde(default)]
    pub n_samples: Option<usize>,
}

/// Goal generation input. Either a ready `summary` or raw `data` to summarize first.
#[derive(Debug, Deserialize)]
pub struct GoalsRequest {
    #[serde(default)]
    pub summary: Option<DataSummary>,

    #[serde(default)]
    pub data: Option<DatasetInput>,

    /// Summary method used when `data` is given
    #[serde(default)]
    pub method: SummaryMethod,

    #[serde(default = "default_goal_count")]
    pub n: usize,

    #[serde(default)]
    pub persona: Option<Persona>,

    /// Overrides the server's tool setting for this request
    #[serde(default)]
    pub use_tools: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PersonasRequest {
    #[serde(default)]
    pub summary: Option<DataSummary>,

    #[serde(default)]
    pub data: Option<DatasetInput>,

    #[serde(default = "default_persona_count")]
    pub n: usize,
}

#[derive(Debug, Serialize)]
pub struct PersonasResponse {
    pub personas: Vec<Persona>,
}

/// Upper bound on `n_samples` accepted from a request.
pub const MAX_SAMPLES: usize = 100;

/// Upper bound on goals or personas requested at once.
pub const MAX_REQUESTED: usize = 50;

fn default_goal_count() -> usize {
    5
}

fn default_persona_count() -> usize {
    3
}

/// Health check response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,

    /// Model used for summaries and goals
    pub model: String,

    /// Whether goal generation offers tools by default
    pub tools_enabled: bool,
}

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
