//! Dataset summarization.
//!
//! A summary is the field profiles plus a dataset-level description. With
//! [`SummaryMethod::Llm`] the model annotates each field with a semantic type
//! and a description; the reply must cover every column or it is rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agents::AgentContext;
use crate::data::DataTable;
use crate::llm::ChatMessage;
use crate::profile::{profile_table, FieldProfile};
use crate::prompts::{render_enrichment_prompt, SUMMARY_SYSTEM_PROMPT};
use crate::util::{extract_json, preview};

/// Rows shown to the model alongside the profiles.
const PROMPT_SAMPLE_ROWS: usize = 5;

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("LLM request failed: {0}")]
    Llm(#[from] anyhow::Error),

    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMethod {
    /// Field profiles only
    #[default]
    Default,
    /// Profiles annotated by the model
    Llm,
    /// Column names only
    Columns,
}

impl std::str::FromStr for SummaryMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "llm" => Ok(Self::Llm),
            "columns" => Ok(Self::Columns),
            other => Err(format!("unknown summary method '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    pub name: String,
    pub file_name: String,
    #[serde(default)]
    pub dataset_description: String,
    pub field_names: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldProfile>,
}

impl DataSummary {
    /// Summary without model involvement. `Llm` is treated as `Default` here.
    pub fn from_profiles(
        name: &str,
        file_name: &str,
        table: &DataTable,
        method: SummaryMethod,
        n_samples: usize,
    ) -> Self {
        let fields = match method {
            SummaryMethod::Columns => Vec::new(),
            SummaryMethod::Default | SummaryMethod::Llm => profile_table(table, n_samples),
        };
        Self {
            name: name.to_string(),
            file_name: file_name.to_string(),
            dataset_description: String::new(),
            field_names: table.columns().to_vec(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldProfile> {
        self.fields.iter().find(|f| f.column == name)
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut FieldProfile> {
        self.fields.iter_mut().find(|f| f.column == name)
    }
}

#[derive(Debug, Deserialize)]
struct EnrichmentReply {
    #[serde(default)]
    name: Option<String>,
    dataset_description: String,
    fields: Vec<FieldAnnotation>,
}

#[derive(Debug, Deserialize)]
struct FieldAnnotation {
    #[serde(alias = "field", alias = "name")]
    column: String,
    semantic_type: String,
    description: String,
}

/// Merge a model annotation reply into `summary`.
///
/// Every column needs a non-blank `semantic_type` and `description`, and the
/// dataset needs a non-blank description. Unknown columns in the reply are
/// ignored. Nothing is written unless the whole reply is usable.
pub fn apply_enrichment(summary: &mut DataSummary, reply: &str) -> Result<(), SummaryError> {
    let parsed: EnrichmentReply = serde_json::from_str(extract_json(reply)).map_err(|e| {
        SummaryError::InvalidModelOutput(format!("{} in reply: {}", e, preview(reply, 200)))
    })?;

    let dataset_description = parsed.dataset_description.trim();
    if dataset_description.is_empty() {
        return Err(SummaryError::InvalidModelOutput(
            "blank dataset_description".to_string(),
        ));
    }

    let mut missing: Vec<&str> = Vec::new();
    let mut annotations: Vec<(String, String, String)> = Vec::new();
    for name in &summary.field_names {
        let annotation = parsed.fields.iter().find(|f| &f.column == name).filter(|f| {
            !f.semantic_type.trim().is_empty() && !f.description.trim().is_empty()
        });
        match annotation {
            Some(a) => annotations.push((
                name.clone(),
                a.semantic_type.trim().to_string(),
                a.description.trim().to_string(),
            )),
            None => missing.push(name.as_str()),
        }
    }
    if !missing.is_empty() {
        return Err(SummaryError::InvalidModelOutput(format!(
            "no complete annotation for fields: {}",
            missing.join(", ")
        )));
    }

    for (name, semantic_type, description) in annotations {
        if let Some(field) = summary.field_mut(&name) {
            field.properties.semantic_type = semantic_type;
            field.properties.description = description;
        }
    }

    for extra in parsed
        .fields
        .iter()
        .filter(|f| !summary.field_names.contains(&f.column))
    {
        tracing::debug!(column = %extra.column, "Ignoring annotation for unknown field");
    }

    summary.dataset_description = dataset_description.to_string();
    if summary.name.is_empty() {
        if let Some(name) = parsed.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            summary.name = name.to_string();
        }
    }
    Ok(())
}

/// Builds [`DataSummary`] values, optionally asking the model to annotate them.
pub struct Summarizer<'a> {
    ctx: &'a AgentContext,
}

impl<'a> Summarizer<'a> {
    pub fn new(ctx: &'a AgentContext) -> Self {
        Self { ctx }
    }

    pub async fn summarize(
        &self,
        table: &DataTable,
        name: &str,
        file_name: &str,
        method: SummaryMethod,
        n_samples: usize,
    ) -> Result<DataSummary, SummaryError> {
        let mut summary = DataSummary::from_profiles(name, file_name, table, method, n_samples);
        tracing::info!(
            dataset = %file_name,
            rows = table.num_rows(),
            fields = summary.field_names.len(),
            ?method,
            "Summarizing dataset"
        );

        if method != SummaryMethod::Llm {
            return Ok(summary);
        }

        let messages = vec![
            ChatMessage::system(SUMMARY_SYSTEM_PROMPT),
            ChatMessage::user(render_enrichment_prompt(
                &summary,
                &table.sample_rows(PROMPT_SAMPLE_ROWS),
            )),
        ];

        let response = self
            .ctx
            .llm
            .chat_completion_with_options(&self.ctx.model, &messages, None, self.ctx.options.clone())
            .await?;

        let content = response
            .content
            .ok_or_else(|| SummaryError::InvalidModelOutput("empty reply".to_string()))?;

        apply_enrichment(&mut summary, &content)?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm::testing::{text, ScriptedClient};

    fn table() -> DataTable {
        DataTable::from_csv_str("city,population\nOslo,709000\nLima,9750000\n").unwrap()
    }

    const GOOD_REPLY: &str = r#"```json
{"name": "Cities", "dataset_description": "Populations of two capitals.",
 "fields": [
   {"column": "city", "semantic_type": "city", "description": "Capital city name."},
   {"column": "population", "semantic_type": "count", "description": " Residents. "}
 ]}
```"#;

    #[test]
    fn method_parsing() {
        assert_eq!("LLM".parse::<SummaryMethod>().unwrap(), SummaryMethod::Llm);
        assert_eq!("columns".parse::<SummaryMethod>().unwrap(), SummaryMethod::Columns);
        assert!("fancy".parse::<SummaryMethod>().is_err());
    }

    #[test]
    fn columns_method_skips_profiles() {
        let summary = DataSummary::from_profiles("c", "c.csv", &table(), SummaryMethod::Columns, 3);
        assert_eq!(summary.field_names, vec!["city", "population"]);
        assert!(summary.fields.is_empty());
    }

    #[test]
    fn enrichment_fills_fields() {
        let mut summary = DataSummary::from_profiles("", "c.csv", &table(), SummaryMethod::Llm, 3);
        apply_enrichment(&mut summary, GOOD_REPLY).unwrap();
        assert_eq!(summary.name, "Cities");
        assert_eq!(summary.dataset_description, "Populations of two capitals.");
        let pop = summary.field("population").unwrap();
        assert_eq!(pop.properties.semantic_type, "count");
        assert_eq!(pop.properties.description, "Residents.");
    }

    #[test]
    fn enrichment_keeps_given_name() {
        let mut summary = DataSummary::from_profiles("mine", "c.csv", &table(), SummaryMethod::Llm, 3);
        apply_enrichment(&mut summary, GOOD_REPLY).unwrap();
        assert_eq!(summary.name, "mine");
    }

    #[test]
    fn enrichment_rejects_missing_fields() {
        let mut summary = DataSummary::from_profiles("c", "c.csv", &table(), SummaryMethod::Llm, 3);
        let reply = r#"{"dataset_description": "x", "fields": [
            {"column": "city", "semantic_type": "city", "description": "Name."}
        ]}"#;
        let err = apply_enrichment(&mut summary, reply).unwrap_err();
        assert!(err.to_string().contains("population"));
    }

    #[test]
    fn enrichment_rejects_bare_column_list() {
        let mut summary = DataSummary::from_profiles("c", "c.csv", &table(), SummaryMethod::Llm, 3);
        let reply = r#"{"fields": [{"column": "city"}, {"column": "population"}]}"#;
        let err = apply_enrichment(&mut summary, reply).unwrap_err();
        assert!(matches!(err, SummaryError::InvalidModelOutput(_)));
        assert!(summary.dataset_description.is_empty());
    }

    #[test]
    fn enrichment_rejects_blank_annotations_without_partial_writes() {
        let mut summary = DataSummary::from_profiles("c", "c.csv", &table(), SummaryMethod::Llm, 3);
        let reply = r#"{"dataset_description": "Capitals.", "fields": [
            {"column": "city", "semantic_type": "city", "description": "Capital city name."},
            {"column": "population", "semantic_type": "count", "description": "   "}
        ]}"#;
        let err = apply_enrichment(&mut summary, reply).unwrap_err();
        assert!(err.to_string().contains("population"));
        assert!(summary.field("city").unwrap().properties.description.is_empty());

        let blank_dataset = r#"{"dataset_description": " ", "fields": [
            {"column": "city", "semantic_type": "city", "description": "Name."},
            {"column": "population", "semantic_type": "count", "description": "Residents."}
        ]}"#;
        assert!(apply_enrichment(&mut summary, blank_dataset).is_err());
    }

    #[test]
    fn enrichment_rejects_non_json() {
        let mut summary = DataSummary::from_profiles("c", "c.csv", &table(), SummaryMethod::Llm, 3);
        let err = apply_enrichment(&mut summary, "I cannot help with that").unwrap_err();
        assert!(matches!(err, SummaryError::InvalidModelOutput(_)));
    }

    #[tokio::test]
    async fn summarizer_calls_model_only_for_llm_method() {
        let client = Arc::new(ScriptedClient::new(vec![text(GOOD_REPLY)]));
        let ctx = AgentContext::new(client.clone(), "m");
        let summarizer = Summarizer::new(&ctx);

        let plain = summarizer
            .summarize(&table(), "c", "c.csv", SummaryMethod::Default, 3)
            .await
            .unwrap();
        assert_eq!(client.call_count(), 0);
        assert!(plain.field("city").unwrap().properties.description.is_empty());

        let enriched = summarizer
            .summarize(&table(), "c", "c.csv", SummaryMethod::Llm, 3)
            .await
            .unwrap();
        assert_eq!(client.call_count(), 1);
        assert_eq!(enriched.field("city").unwrap().properties.semantic_type, "city");

        let calls = client.calls.lock().unwrap();
        assert_eq!(calls[0].1, 0, "enrichment must not offer tools");
        assert!(calls[0].0[1].content.as_deref().unwrap().contains("FIRST ROWS"));
    }
}
