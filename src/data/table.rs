//! In-memory table representation.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};

/// A single cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Value {
    /// Infer a typed cell from raw text (CSV input). Only blank cells are null;
    /// text is stored trimmed.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Value::Null;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Value::Number(n),
            _ => Value::Text(trimmed.to_string()),
        }
    }

    /// Convert a JSON cell. Nested arrays and objects are kept as their JSON text.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            JsonValue::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::Text(s) => JsonValue::String(s.clone()),
        }
    }

    /// Stable string key for counting distinct values.
    pub fn key(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::Text(s) => s.clone(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Integral floats are emitted as JSON integers so prompts read `42`, not `42.0`.
pub(crate) fn number_to_json(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        JsonValue::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}

/// A column-ordered table.
#[derive(Debug, Clone, Default)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl DataTable {
    /// Build a table, padding or truncating every row to the header width.
    ///
    /// Duplicate column names get `_1`, `_2`, ... suffixes.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let columns = dedupe_columns(columns);
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// First `n` rows as JSON objects keyed by column name.
    pub fn sample_rows(&self, n: usize) -> Vec<JsonValue> {
        self.rows
            .iter()
            .take(n)
            .map(|row| {
                let record: Map<String, JsonValue> = self
                    .columns
                    .iter()
                    .zip(row.iter())
                    .map(|(col, cell)| (col.clone(), cell.to_json()))
                    .collect();
                JsonValue::Object(record)
            })
            .collect()
    }
}

fn dedupe_columns(columns: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::with_capacity(columns.len());
    for column in columns {
        let mut candidate = column.clone();
        let mut suffix = 1;
        while !seen.insert(candidate.clone()) {
            candidate = format!("{}_{}", column, suffix);
            suffix += 1;
        }
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infer_cell_types() {
        assert_eq!(Value::infer(""), Value::Null);
        assert_eq!(Value::infer("  "), Value::Null);
        assert_eq!(Value::infer("NaN"), Value::Text("NaN".to_string()));
        assert_eq!(Value::infer("n/a"), Value::Text("n/a".to_string()));
        assert_eq!(Value::infer("TRUE"), Value::Bool(true));
        assert_eq!(Value::infer("3.5"), Value::Number(3.5));
        assert_eq!(Value::infer(" 7 "), Value::Number(7.0));
        assert_eq!(Value::infer("inf"), Value::Text("inf".to_string()));
        assert_eq!(Value::infer("  Paris "), Value::Text("Paris".to_string()));
    }

    #[test]
    fn rows_are_padded_and_truncated() {
        let table = DataTable::new(
            vec!["a".into(), "b".into()],
            vec![
                vec![Value::Number(1.0)],
                vec![Value::Number(2.0), Value::Number(3.0), Value::Number(4.0)],
            ],
        );
        assert_eq!(table.rows()[0], vec![Value::Number(1.0), Value::Null]);
        assert_eq!(table.rows()[1].len(), 2);
    }

    #[test]
    fn duplicate_columns_get_suffixes() {
        let table = DataTable::new(vec!["x".into(), "x".into(), "x".into()], vec![]);
        assert_eq!(table.columns(), &["x", "x_1", "x_2"]);
    }

    #[test]
    fn sample_rows_keep_column_order() {
        let table = DataTable::new(
            vec!["name".into(), "age".into()],
            vec![
                vec![Value::Text("ann".into()), Value::Number(31.0)],
                vec![Value::Text("bo".into()), Value::Number(27.5)],
            ],
        );
        let rows = table.sample_rows(1);
        assert_eq!(rows.len(), 1);
        assert_eq!(serde_json::to_string(&rows[0]).unwrap(), r#"{"name":"ann","age":31}"#);
    }

    #[test]
    fn column_lookup() {
        let table = DataTable::new(
            vec!["a".into()],
            vec![vec![Value::Bool(true)], vec![Value::Null]],
        );
        let cells: Vec<_> = table.column("a").unwrap().cloned().collect();
        assert_eq!(cells, vec![Value::Bool(true), Value::Null]);
        assert!(table.column("missing").is_none());
    }
}
