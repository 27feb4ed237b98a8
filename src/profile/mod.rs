//! Field profiling.
//!
//! Each column is classified into a [`FieldType`] and reduced to a
//! [`FieldProperties`] record: range, moments, distinct count and a handful of
//! representative samples. `semantic_type` and `description` are left empty
//! here and filled in later by model enrichment.

pub mod stats;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::data::{number_to_json, DataTable, Value};

pub use stats::{frequency_counts, mean, percentile_samples, sample_std};

/// Below this distinct/non-null ratio a text column is a category.
const CATEGORY_RATIO: f64 = 0.5;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
    Boolean,
    Date,
    Category,
    String,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Category => "category",
            FieldType::String => "string",
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: JsonValue,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldProperties {
    pub dtype: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<JsonValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    pub samples: Vec<JsonValue>,
    pub num_unique_values: usize,
    pub null_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_values: Vec<ValueCount>,
    #[serde(default)]
    pub semantic_type: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldProfile {
    pub column: String,
    pub properties: FieldProperties,
}

/// Profile every column of `table`.
pub fn profile_table(table: &DataTable, n_samples: usize) -> Vec<FieldProfile> {
    table
        .columns()
        .iter()
        .filter_map(|name| {
            let cells: Vec<&Value> = table.column(name)?.collect();
            Some(profile_column(name, &cells, n_samples))
        })
        .collect()
}

/// Profile a single column.
pub fn profile_column(name: &str, cells: &[&Value], n_samples: usize) -> FieldProfile {
    let present: Vec<&Value> = cells.iter().copied().filter(|c| !c.is_null()).collect();
    let null_count = cells.len() - present.len();
    let dtype = classify(&present);

    let mut properties = match dtype {
        FieldType::Number => numeric_properties(&present, n_samples),
        FieldType::Date => date_properties(&present, n_samples),
        _ => frequency_properties(dtype, &present, n_samples),
    };
    properties.null_count = null_count;

    tracing::trace!(column = %name, dtype = %dtype, unique = properties.num_unique_values, "Profiled column");

    FieldProfile {
        column: name.to_string(),
        properties,
    }
}

fn classify(present: &[&Value]) -> FieldType {
    if present.is_empty() {
        return FieldType::String;
    }
    if present.iter().all(|v| matches!(v, Value::Number(_))) {
        return FieldType::Number;
    }
    if present.iter().all(|v| matches!(v, Value::Bool(_))) {
        return FieldType::Boolean;
    }
    if present
        .iter()
        .all(|v| matches!(v, Value::Text(s) if parse_date(s).is_some()))
    {
        return FieldType::Date;
    }
    let unique = distinct_count(present);
    if (unique as f64) / (present.len() as f64) < CATEGORY_RATIO {
        FieldType::Category
    } else {
        FieldType::String
    }
}

fn distinct_count(present: &[&Value]) -> usize {
    present
        .iter()
        .map(|v| v.key())
        .collect::<std::collections::HashSet<_>>()
        .len()
}

/// Parse the date/datetime spellings commonly found in exported tables.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

fn numeric_properties(present: &[&Value], n_samples: usize) -> FieldProperties {
    let values: Vec<f64> = present.iter().filter_map(|v| v.as_f64()).collect();
    let mut sorted = values.clone();
    sorted.sort_by(|a, b| a.total_cmp(b));

    FieldProperties {
        dtype: FieldType::Number,
        min: sorted.first().map(|v| number_to_json(*v)),
        max: sorted.last().map(|v| number_to_json(*v)),
        mean: mean(&values),
        std: Some(sample_std(&values)),
        samples: percentile_samples(&sorted, n_samples)
            .into_iter()
            .map(number_to_json)
            .collect(),
        num_unique_values: distinct_count(present),
        null_count: 0,
        top_values: Vec::new(),
        semantic_type: String::new(),
        description: String::new(),
    }
}

fn date_properties(present: &[&Value], n_samples: usize) -> FieldProperties {
    let mut parsed: Vec<(NaiveDateTime, &str)> = present
        .iter()
        .filter_map(|v| match v {
            Value::Text(s) => parse_date(s).map(|d| (d, s.as_str())),
            _ => None,
        })
        .collect();

    let mut samples: Vec<JsonValue> = Vec::new();
    for (_, raw) in &parsed {
        let value = JsonValue::String(raw.to_string());
        if samples.len() >= n_samples {
            break;
        }
        if !samples.contains(&value) {
            samples.push(value);
        }
    }

    parsed.sort_by_key(|(d, _)| *d);

    FieldProperties {
        dtype: FieldType::Date,
        min: parsed.first().map(|(_, raw)| JsonValue::String(raw.to_string())),
        max: parsed.last().map(|(_, raw)| JsonValue::String(raw.to_string())),
        mean: None,
        std: None,
        samples,
        num_unique_values: distinct_count(present),
        null_count: 0,
        top_values: Vec::new(),
        semantic_type: String::new(),
        description: String::new(),
    }
}

fn frequency_properties(dtype: FieldType, present: &[&Value], n_samples: usize) -> FieldProperties {
    let keys: Vec<String> = present.iter().map(|v| v.key()).collect();
    let counts = frequency_counts(keys.iter().map(|k| k.as_str()));
    let num_unique_values = counts.len();

    let top_values: Vec<ValueCount> = counts
        .into_iter()
        .take(n_samples)
        .map(|(key, count)| {
            // Recover the typed cell for the key so booleans stay booleans.
            let value = present
                .iter()
                .find(|v| v.key() == key)
                .map(|v| v.to_json())
                .unwrap_or(JsonValue::String(key));
            ValueCount { value, count }
        })
        .collect();

    FieldProperties {
        dtype,
        min: None,
        max: None,
        mean: None,
        std: None,
        samples: top_values.iter().map(|vc| vc.value.clone()).collect(),
        num_unique_values,
        null_count: 0,
        top_values,
        semantic_type: String::new(),
        description: String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(cells: Vec<Value>) -> FieldProperties {
        let refs: Vec<&Value> = cells.iter().collect();
        profile_column("col", &refs, 3).properties
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn numeric_column() {
        let p = profile(vec![
            Value::Number(4.0),
            Value::Null,
            Value::Number(1.0),
            Value::Number(7.0),
        ]);
        assert_eq!(p.dtype, FieldType::Number);
        assert_eq!(p.min, Some(JsonValue::from(1)));
        assert_eq!(p.max, Some(JsonValue::from(7)));
        assert_eq!(p.mean, Some(4.0));
        assert_eq!(p.std, Some(3.0));
        assert_eq!(p.samples, vec![JsonValue::from(1), JsonValue::from(4), JsonValue::from(7)]);
        assert_eq!(p.num_unique_values, 3);
        assert_eq!(p.null_count, 1);
        assert!(p.top_values.is_empty());
    }

    #[test]
    fn category_column_uses_frequencies() {
        let p = profile(vec![
            text("red"),
            text("blue"),
            text("red"),
            text("red"),
            text("blue"),
            text("green"),
            text("red"),
        ]);
        assert_eq!(p.dtype, FieldType::Category);
        assert_eq!(p.num_unique_values, 3);
        assert_eq!(p.samples, vec![JsonValue::from("red"), JsonValue::from("blue"), JsonValue::from("green")]);
        assert_eq!(p.top_values[0].count, 4);
        assert!(p.min.is_none());
    }

    #[test]
    fn mostly_unique_text_is_string() {
        let p = profile(vec![text("a"), text("b"), text("c"), text("c")]);
        assert_eq!(p.dtype, FieldType::String);
    }

    #[test]
    fn boolean_column() {
        let p = profile(vec![Value::Bool(true), Value::Bool(false), Value::Bool(true)]);
        assert_eq!(p.dtype, FieldType::Boolean);
        assert_eq!(p.samples, vec![JsonValue::Bool(true), JsonValue::Bool(false)]);
    }

    #[test]
    fn date_column_orders_chronologically() {
        let p = profile(vec![
            text("2021-03-01"),
            text("2020-12-31"),
            text("2021-01-15"),
            text("2021-03-01"),
        ]);
        assert_eq!(p.dtype, FieldType::Date);
        assert_eq!(p.min, Some(JsonValue::from("2020-12-31")));
        assert_eq!(p.max, Some(JsonValue::from("2021-03-01")));
        assert_eq!(p.num_unique_values, 3);
        assert_eq!(p.samples.len(), 3);
    }

    #[test]
    fn all_null_column() {
        let p = profile(vec![Value::Null, Value::Null]);
        assert_eq!(p.dtype, FieldType::String);
        assert_eq!(p.null_count, 2);
        assert_eq!(p.num_unique_values, 0);
        assert!(p.samples.is_empty());
    }

    #[test]
    fn date_parsing_variants() {
        assert!(parse_date("2023-05-01T10:00:00Z").is_some());
        assert!(parse_date("2023-05-01 10:00:00").is_some());
        assert!(parse_date("05/01/2023").is_some());
        assert!(parse_date("May first").is_none());
    }

    #[test]
    fn profile_table_covers_all_columns() {
        let table = DataTable::from_csv_str("a,b\n1,x\n2,y\n").unwrap();
        let profiles = profile_table(&table, 5);
        let names: Vec<_> = profiles.iter().map(|p| p.column.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn properties_serialize_without_empty_fields() {
        let p = profile(vec![Value::Number(1.0), Value::Number(2.0)]);
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["dtype"], "number");
        assert!(json.get("top_values").is_none());
        assert_eq!(json["semantic_type"], "");
    }
}
