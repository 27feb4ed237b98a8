//! Chart recommendation tool.
//!
//! A fixed lookup from field types to a chart and encoding. Fields are bucketed
//! into quantitative (number), temporal (date) and nominal (everything else).

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use super::Tool;
use crate::profile::{FieldProfile, FieldType};
use crate::summarize::DataSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Measure {
    Quantitative,
    Temporal,
    Nominal,
}

impl From<FieldType> for Measure {
    fn from(dtype: FieldType) -> Self {
        match dtype {
            FieldType::Number => Measure::Quantitative,
            FieldType::Date => Measure::Temporal,
            FieldType::Boolean | FieldType::Category | FieldType::String => Measure::Nominal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Encoding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartRecommendation {
    pub chart: String,
    pub encoding: Encoding,
    /// Aggregation applied to y, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<String>,
    pub reason: String,
}

fn chart(chart: &str, encoding: Encoding, aggregate: Option<&str>, reason: String) -> ChartRecommendation {
    ChartRecommendation {
        chart: chart.to_string(),
        encoding,
        aggregate: aggregate.map(str::to_string),
        reason,
    }
}

fn enc(x: &str, y: Option<&str>) -> Encoding {
    Encoding {
        x: Some(x.to_string()),
        y: y.map(str::to_string),
        ..Encoding::default()
    }
}

/// Recommend a chart for the given fields. Field order is used as a tiebreak.
pub fn recommend_chart(fields: &[&FieldProfile]) -> Option<ChartRecommendation> {
    let typed: Vec<(&str, Measure)> = fields
        .iter()
        .map(|f| (f.column.as_str(), Measure::from(f.properties.dtype)))
        .collect();

    let rec = match typed.as_slice() {
        [] => return None,
        [(name, Measure::Quantitative)] => chart(
            "histogram",
            enc(name, None),
            Some("count"),
            format!("distribution of numeric field {}", name),
        ),
        [(name, Measure::Temporal)] => chart(
            "line",
            enc(name, None),
            Some("count"),
            format!("record count over time by {}", name),
        ),
        [(name, Measure::Nominal)] => chart(
            "bar",
            enc(name, None),
            Some("count"),
            format!("frequency of each {} value", name),
        ),
        [a, b] => two_field(*a, *b),
        _ => many_fields(&typed),
    };
    Some(rec)
}

fn two_field(a: (&str, Measure), b: (&str, Measure)) -> ChartRecommendation {
    use Measure::*;
    match (a.1, b.1) {
        (Quantitative, Quantitative) => chart(
            "scatter",
            enc(a.0, Some(b.0)),
            None,
            format!("relationship between {} and {}", a.0, b.0),
        ),
        (Temporal, Quantitative) | (Quantitative, Temporal) => {
            let (t, q) = if a.1 == Temporal { (a.0, b.0) } else { (b.0, a.0) };
            chart("line", enc(t, Some(q)), Some("mean"), format!("trend of {} over {}", q, t))
        }
        (Nominal, Quantitative) | (Quantitative, Nominal) => {
            let (n, q) = if a.1 == Nominal { (a.0, b.0) } else { (b.0, a.0) };
            chart("bar", enc(n, Some(q)), Some("mean"), format!("compare {} across {}", q, n))
        }
        (Nominal, Nominal) => chart(
            "heatmap",
            enc(a.0, Some(b.0)),
            Some("count"),
            format!("co-occurrence of {} and {}", a.0, b.0),
        ),
        (Temporal, Nominal) | (Nominal, Temporal) => {
            let (t, n) = if a.1 == Temporal { (a.0, b.0) } else { (b.0, a.0) };
            let mut encoding = enc(t, None);
            encoding.color = Some(n.to_string());
            chart("line", encoding, Some("count"), format!("count over {} split by {}", t, n))
        }
        (Temporal, Temporal) => chart(
            "scatter",
            enc(a.0, Some(b.0)),
            None,
            format!("relationship between dates {} and {}", a.0, b.0),
        ),
    }
}

fn many_fields(typed: &[(&str, Measure)]) -> ChartRecommendation {
    let quantitative: Vec<&str> = typed
        .iter()
        .filter(|(_, m)| *m == Measure::Quantitative)
        .map(|(n, _)| *n)
        .collect();
    let others: Vec<&str> = typed
        .iter()
        .filter(|(_, m)| *m != Measure::Quantitative)
        .map(|(n, _)| *n)
        .collect();

    if quantitative.len() >= 2 {
        // Extra numeric fields beyond x/y go to color before any nominal field.
        let mut extra = quantitative[2..].iter().chain(others.iter());
        let encoding = Encoding {
            x: Some(quantitative[0].to_string()),
            y: Some(quantitative[1].to_string()),
            color: extra.next().map(|s| s.to_string()),
            facet: extra.next().map(|s| s.to_string()),
        };
        return chart(
            "scatter",
            encoding,
            None,
            format!("relationship between {} and {} with additional encodings", quantitative[0], quantitative[1]),
        );
    }

    let x = others[0];
    let encoding = Encoding {
        x: Some(x.to_string()),
        y: quantitative.first().map(|s| s.to_string()),
        color: others.get(1).map(|s| s.to_string()),
        facet: others.get(2).map(|s| s.to_string()),
    };
    let aggregate = if quantitative.is_empty() { "count" } else { "mean" };
    chart("bar", encoding, Some(aggregate), format!("grouped comparison across {}", x))
}

/// Tool wrapper around [`recommend_chart`].
pub struct RecommendChart;

#[async_trait]
impl Tool for RecommendChart {
    fn name(&self) -> &str {
        "recommend_chart"
    }

    fn description(&self) -> &str {
        "Recommend a chart type and encoding (x, y, color, facet) for one or more dataset fields, based on their data types."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "fields": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Column names to visualize together, most important first"
                }
            },
            "required": ["fields"]
        })
    }

    async fn execute(&self, args: Value, summary: &DataSummary) -> anyhow::Result<String> {
        let names: Vec<&str> = args["fields"]
            .as_array()
            .ok_or_else(|| anyhow::anyhow!("Missing 'fields' argument"))?
            .iter()
            .filter_map(|v| v.as_str())
            .collect();

        if names.is_empty() {
            return Err(anyhow::anyhow!("'fields' must contain at least one column name"));
        }

        let mut profiles = Vec::with_capacity(names.len());
        for name in &names {
            let profile = summary.field(name).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown field '{}'. Available fields: {}",
                    name,
                    summary.field_names.join(", ")
                )
            })?;
            profiles.push(profile);
        }

        let recommendation = recommend_chart(&profiles)
            .ok_or_else(|| anyhow::anyhow!("No recommendation for an empty field list"))?;
        Ok(serde_json::to_string(&recommendation)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::fixtures::cars_summary;

    fn recommend(names: &[&str]) -> ChartRecommendation {
        let summary = cars_summary();
        let profiles: Vec<&FieldProfile> = names.iter().map(|n| summary.field(n).unwrap()).collect();
        recommend_chart(&profiles).unwrap()
    }

    #[test]
    fn single_fields() {
        assert_eq!(recommend(&["mpg"]).chart, "histogram");
        assert_eq!(recommend(&["origin"]).chart, "bar");
        assert_eq!(recommend(&["year"]).chart, "line");
    }

    #[test]
    fn pairs() {
        let scatter = recommend(&["weight", "mpg"]);
        assert_eq!(scatter.chart, "scatter");
        assert_eq!(scatter.encoding.x.as_deref(), Some("weight"));

        let bar = recommend(&["mpg", "origin"]);
        assert_eq!(bar.chart, "bar");
        assert_eq!(bar.encoding.x.as_deref(), Some("origin"));
        assert_eq!(bar.encoding.y.as_deref(), Some("mpg"));
        assert_eq!(bar.aggregate.as_deref(), Some("mean"));

        let line = recommend(&["mpg", "year"]);
        assert_eq!(line.chart, "line");
        assert_eq!(line.encoding.x.as_deref(), Some("year"));

        assert_eq!(recommend(&["origin", "model"]).chart, "heatmap");
    }

    #[test]
    fn three_fields_add_color() {
        let rec = recommend(&["weight", "mpg", "origin"]);
        assert_eq!(rec.chart, "scatter");
        assert_eq!(rec.encoding.color.as_deref(), Some("origin"));
        assert!(rec.encoding.facet.is_none());
    }

    #[test]
    fn mostly_nominal_fields_group_into_bars() {
        let rec = recommend(&["origin", "model", "mpg"]);
        assert_eq!(rec.chart, "bar");
        assert_eq!(rec.encoding.x.as_deref(), Some("origin"));
        assert_eq!(rec.encoding.y.as_deref(), Some("mpg"));
        assert_eq!(rec.encoding.color.as_deref(), Some("model"));
    }

    #[test]
    fn empty_is_none() {
        assert!(recommend_chart(&[]).is_none());
    }

    #[tokio::test]
    async fn tool_rejects_unknown_and_empty() {
        let summary = cars_summary();
        let err = RecommendChart
            .execute(json!({"fields": ["mpg", "hp"]}), &summary)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unknown field 'hp'"));

        let err = RecommendChart
            .execute(json!({"fields": []}), &summary)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("at least one"));
    }

    #[tokio::test]
    async fn tool_returns_json() {
        let summary = cars_summary();
        let out = RecommendChart
            .execute(json!({"fields": ["origin"]}), &summary)
            .await
            .unwrap();
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["chart"], "bar");
        assert_eq!(parsed["aggregate"], "count");
    }
}
