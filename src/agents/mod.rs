//! Agents module - model-driven pipeline steps.
//!
//! # Components
//! - **AgentContext**: LLM client, tools, model and sampling options
//! - **ToolLoop**: bounded tool-calling loop used by goal exploration
//!
//! The summarizer and explorers live in their own modules and borrow an
//! `AgentContext` for each call.

mod context;
mod executor;
mod types;

pub use context::AgentContext;
pub use executor::ToolLoop;
pub use types::{AgentError, LoopOutcome, TerminalReason};
