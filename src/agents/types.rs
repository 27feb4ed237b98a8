//! Core types for the agent system.

use serde::{Deserialize, Serialize};

use crate::llm::TokenUsage;

/// Result of a completed tool-calling loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopOutcome {
    /// Final assistant text
    pub content: String,

    /// Model round-trips used, including the final one
    pub iterations: usize,

    /// One entry per executed tool call: `name(args)`
    pub tool_log: Vec<String>,

    /// Token usage summed over every round-trip
    pub usage: TokenUsage,
}

/// Reason why a loop stopped without a final answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalReason {
    LlmError,
    MaxIterations,
    EmptyResponse,
}

/// Errors that can occur in agent operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("Max iterations reached: {0}")]
    MaxIterations(usize),

    #[error("LLM returned an empty response")]
    EmptyResponse,
}

impl AgentError {
    pub fn terminal_reason(&self) -> TerminalReason {
        match self {
            AgentError::LlmError(_) => TerminalReason::LlmError,
            AgentError::MaxIterations(_) => TerminalReason::MaxIterations,
            AgentError::EmptyResponse => TerminalReason::EmptyResponse,
        }
    }
}
