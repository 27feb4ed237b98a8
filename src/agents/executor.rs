//! Tool-calling loop.
//!
//! # Algorithm
//! 1. Call the model with the conversation and the registry's tool schemas
//! 2. If it requests tool calls: record the assistant turn, execute each call,
//!    append one tool message per call, go to 1
//! 3. Otherwise return the assistant text
//!
//! The loop stops with [`AgentError::MaxIterations`] after `max_iterations`
//! model calls that all requested tools.

use crate::agents::{AgentContext, AgentError, LoopOutcome};
use crate::llm::{ChatMessage, TokenUsage, ToolCall};
use crate::summarize::DataSummary;
use crate::util::preview;

pub struct ToolLoop<'a> {
    ctx: &'a AgentContext,
    summary: &'a DataSummary,
}

impl<'a> ToolLoop<'a> {
    pub fn new(ctx: &'a AgentContext, summary: &'a DataSummary) -> Self {
        Self { ctx, summary }
    }

    /// Execute a single tool call. Tool failures become the tool's answer so the
    /// model can recover; malformed argument JSON is passed through as `null`.
    async fn execute_tool_call(&self, tool_call: &ToolCall) -> String {
        let args: serde_json::Value = serde_json::from_str(&tool_call.function.arguments)
            .unwrap_or(serde_json::Value::Null);

        match self
            .ctx
            .tools
            .execute(&tool_call.function.name, args, self.summary)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                tracing::debug!(tool = %tool_call.function.name, "Tool call failed: {}", e);
                format!("Error: {}", e)
            }
        }
    }

    /// Run the loop starting from `messages`.
    pub async fn run(&self, mut messages: Vec<ChatMessage>) -> Result<LoopOutcome, AgentError> {
        let tool_schemas = self.ctx.tools.get_tool_schemas();
        let tools = if tool_schemas.is_empty() {
            None
        } else {
            Some(tool_schemas.as_slice())
        };

        let mut usage = TokenUsage::default();
        let mut tool_log = Vec::new();

        for iteration in 0..self.ctx.max_iterations {
            tracing::debug!("ToolLoop iteration {}", iteration + 1);

            let response = self
                .ctx
                .llm
                .chat_completion_with_options(&self.ctx.model, &messages, tools, self.ctx.options.clone())
                .await
                .map_err(|e| AgentError::LlmError(e.to_string()))?;

            if let Some(ref u) = response.usage {
                usage.add(u);
            }

            if let Some(tool_calls) = response.requested_tool_calls() {
                let tool_calls = tool_calls.to_vec();
                messages.push(ChatMessage::assistant_tool_calls(
                    response.content.clone(),
                    tool_calls.clone(),
                ));

                for tool_call in &tool_calls {
                    tool_log.push(format!(
                        "{}({})",
                        tool_call.function.name, tool_call.function.arguments
                    ));

                    let result = self.execute_tool_call(tool_call).await;
                    tracing::debug!(
                        tool = %tool_call.function.name,
                        "Tool result: {}",
                        preview(&result, 200)
                    );
                    messages.push(ChatMessage::tool_result(tool_call.id.clone(), result));
                }

                continue;
            }

            return match response.content {
                Some(content) if !content.trim().is_empty() => Ok(LoopOutcome {
                    content,
                    iterations: iteration + 1,
                    tool_log,
                    usage,
                }),
                _ => Err(AgentError::EmptyResponse),
            };
        }

        tracing::warn!(
            "Tool loop hit max iterations ({}) after {} tool calls",
            self.ctx.max_iterations,
            tool_log.len()
        );
        Err(AgentError::MaxIterations(self.ctx.max_iterations))
    }
}
