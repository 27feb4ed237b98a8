//! Prompt templates.

use crate::goals::Persona;
use crate::summarize::DataSummary;

pub const SUMMARY_SYSTEM_PROMPT: &str = r#"You are an experienced data analyst who annotates datasets.
For the dataset you are given:
1. Write a short dataset_description (one or two sentences).
2. For EVERY field, write a one-sentence description.
3. For EVERY field, give a semantic_type: a single word or short phrase such as company, city, country, year, price, count, percentage, latitude, longitude, url, email, zip code, gender, category or identifier.

Reply with JSON only, no preamble, in exactly this shape:
{"name": "...", "dataset_description": "...", "fields": [{"column": "...", "semantic_type": "...", "description": "..."}]}"#;

pub const GOAL_SYSTEM_PROMPT: &str = r#"You are an experienced data analyst who proposes insightful visualization goals for a dataset.
Each goal is a question answerable with a single chart, the visualization that answers it (name the exact fields and chart type), and a rationale explaining what the chart reveals.
Only use fields that exist in the dataset summary. Prefer simple, well-known chart types.
Reply with a JSON array only, no preamble, in exactly this shape:
[{"index": 0, "question": "...", "visualization": "...", "rationale": "..."}]"#;

pub const TOOL_HINT: &str = "You can call lookup_field to inspect a field in detail and recommend_chart to get a suitable chart type and encoding for a set of fields. Call them when they help, then give your final answer.";

pub const PERSONA_SYSTEM_PROMPT: &str = r#"You are an experienced data analyst who identifies the people who would explore a dataset.
For each persona give a short description of who they are and a rationale for why they care about this data.
Reply with a JSON array only, no preamble, in exactly this shape:
[{"persona": "...", "rationale": "..."}]"#;

fn summary_json(summary: &DataSummary) -> String {
    serde_json::to_string_pretty(summary).unwrap_or_else(|_| summary.field_names.join(", "))
}

/// User prompt asking the model to annotate a profiled dataset.
pub fn render_enrichment_prompt(summary: &DataSummary, sample_rows: &[serde_json::Value]) -> String {
    let rows = serde_json::to_string_pretty(sample_rows).unwrap_or_default();
    format!(
        "Annotate this dataset.\n\nSUMMARY:\n{}\n\nFIRST ROWS:\n{}\n\nReturn one entry in \"fields\" for each of these columns: {}",
        summary_json(summary),
        rows,
        summary.field_names.join(", ")
    )
}

/// User prompt asking for `n` goals for `persona`.
pub fn render_goal_prompt(summary: &DataSummary, n: usize, persona: &Persona, tools_available: bool) -> String {
    let mut prompt = format!(
        "The number of GOALS to generate is {n}. The goals should be based on the data summary below.\n\n\
         SUMMARY:\n{summary}\n\n\
         The generated goals should be focused on the interests and perspective of a '{persona}' persona, \
         who is interested in complex, insightful goals about the data.",
        n = n,
        summary = summary_json(summary),
        persona = persona.persona,
    );
    if tools_available {
        prompt.push_str("\n\n");
        prompt.push_str(TOOL_HINT);
    }
    prompt
}

/// User prompt asking for `n` personas.
pub fn render_persona_prompt(summary: &DataSummary, n: usize) -> String {
    format!(
        "The number of PERSONAS to generate is {}. Generate them for the data summary below.\n\nSUMMARY:\n{}",
        n,
        summary_json(summary)
    )
}
