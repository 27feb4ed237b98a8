//! Execution context shared by the summarizer and the explorers.

use std::sync::Arc;

use crate::config::Config;
use crate::llm::{ChatOptions, LlmClient, OpenRouterClient, RetryPolicy};
use crate::tools::ToolRegistry;

/// Everything a pipeline step needs to talk to the model.
#[derive(Clone)]
pub struct AgentContext {
    /// LLM client for model calls
    pub llm: Arc<dyn LlmClient>,

    /// Tools offered during goal exploration
    pub tools: ToolRegistry,

    pub model: String,

    /// Sampling options sent with every request
    pub options: ChatOptions,

    /// Bound on model round-trips in one tool-calling loop
    pub max_iterations: usize,
}

impl AgentContext {
    pub fn new(llm: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            llm,
            tools: ToolRegistry::new(),
            model: model.into(),
            options: ChatOptions {
                temperature: Some(0.0),
                ..ChatOptions::default()
            },
            max_iterations: 8,
        }
    }

    /// Build the OpenRouter-backed context described by `config`.
    pub fn from_config(config: &Config) -> Self {
        let llm: Arc<dyn LlmClient> = Arc::new(OpenRouterClient::with_endpoint(
            config.api_key.clone(),
            config.base_url.clone(),
            RetryPolicy::default(),
        ));
        let mut ctx = Self::new(llm, config.default_model.clone());
        ctx.options.temperature = Some(config.temperature);
        ctx.max_iterations = config.max_tool_iterations;
        if !config.use_tools {
            ctx.tools = ToolRegistry::empty();
        }
        ctx
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Same model and options, no tools. Goal exploration becomes a single call.
    pub fn without_tools(&self) -> Self {
        self.clone().with_tools(ToolRegistry::empty())
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }
}
