//! Field lookup tool.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::Tool;
use crate::summarize::DataSummary;

/// Return the profile of one field by name.
pub struct LookupField;

#[async_trait]
impl Tool for LookupField {
    fn name(&self) -> &str {
        "lookup_field"
    }

    fn description(&self) -> &str {
        "Look up the profile of a dataset field: type, range, mean and std for numbers, distinct count, the most common values and its description."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "field": {
                    "type": "string",
                    "description": "Exact column name as listed in the dataset summary"
                }
            },
            "required": ["field"]
        })
    }

    async fn execute(&self, args: Value, summary: &DataSummary) -> anyhow::Result<String> {
        let field = args["field"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Missing 'field' argument"))?;

        let profile = summary.field(field).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown field '{}'. Available fields: {}",
                field,
                summary.field_names.join(", ")
            )
        })?;

        Ok(serde_json::to_string(profile)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fixtures::cars_summary;

    #[tokio::test]
    async fn returns_profile_json() {
        let summary = cars_summary();
        let out = LookupField
            .execute(json!({"field": "mpg"}), &summary)
            .await
            .unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["column"], "mpg");
        assert_eq!(parsed["properties"]["dtype"], "number");
        assert_eq!(parsed["properties"]["min"], 15);
        assert_eq!(parsed["properties"]["max"], 33);
    }

    #[tokio::test]
    async fn unknown_field_lists_available() {
        let summary = cars_summary();
        let err = LookupField
            .execute(json!({"field": "horsepower"}), &summary)
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Unknown field 'horsepower'"));
        assert!(msg.contains("model, origin, mpg, weight, year"));
    }

    #[tokio::test]
    async fn missing_argument() {
        let summary = cars_summary();
        assert!(LookupField.execute(Value::Null, &summary).await.is_err());
    }
}
