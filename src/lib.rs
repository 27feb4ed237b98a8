//! # vizier
//!
//! Profiles tabular data and asks a language model which visualizations are
//! worth making.
//!
//! ## Pipeline
//!
//! ```text
//!   CSV / JSON ──▶ DataTable ──▶ field profiles ──▶ DataSummary
//!                                                      │
//!                                   (optional LLM      │
//!                                    annotation)       ▼
//!                                             GoalExplorer ◀──▶ tools
//!                                                      │   lookup_field
//!                                                      ▼   recommend_chart
//!                                                 Vec<Goal>
//! ```
//!
//! ## Modules
//! - `data`: loading CSV and JSON records into a [`data::DataTable`]
//! - `profile`: per-field statistics and type inference
//! - `summarize`: dataset summaries, optionally annotated by the model
//! - `goals`: goal and persona generation
//! - `tools`: tools the model may call while exploring
//! - `agents`: the bounded tool-calling loop
//! - `llm`: OpenRouter chat-completions client
//! - `api`: HTTP surface

pub mod agents;
pub mod api;
pub mod config;
pub mod data;
pub mod goals;
pub mod llm;
pub mod profile;
pub mod prompts;
pub mod summarize;
pub mod tools;
pub mod util;

pub use config::Config;
