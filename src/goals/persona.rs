//! Personas: who would explore this dataset, and why.

use serde::{Deserialize, Serialize};

use super::GoalError;
use crate::agents::{AgentContext, AgentError};
use crate::llm::ChatMessage;
use crate::prompts::{render_persona_prompt, PERSONA_SYSTEM_PROMPT};
use crate::summarize::DataSummary;
use crate::util::{extract_json, preview};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    pub persona: String,
    #[serde(default)]
    pub rationale: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            persona: "A highly skilled data analyst who can come up with complex, insightful goals about data".to_string(),
            rationale: String::new(),
        }
    }
}

pub struct PersonaExplorer<'a> {
    ctx: &'a AgentContext,
}

impl<'a> PersonaExplorer<'a> {
    pub fn new(ctx: &'a AgentContext) -> Self {
        Self { ctx }
    }

    /// Ask the model for up to `n` personas. Single round-trip, no tools.
    pub async fn generate(&self, summary: &DataSummary, n: usize) -> Result<Vec<Persona>, GoalError> {
        if n == 0 {
            return Err(GoalError::ZeroRequested);
        }

        let messages = vec![
            ChatMessage::system(PERSONA_SYSTEM_PROMPT),
            ChatMessage::user(render_persona_prompt(summary, n)),
        ];

        let response = self
            .ctx
            .llm
            .chat_completion_with_options(&self.ctx.model, &messages, None, self.ctx.options.clone())
            .await
            .map_err(|e| AgentError::LlmError(e.to_string()))?;

        let reply = response.content.unwrap_or_default();
        let mut personas: Vec<Persona> = serde_json::from_str(extract_json(&reply)).map_err(|e| {
            GoalError::InvalidModelOutput(format!("{} in reply: {}", e, preview(&reply, 200)))
        })?;

        personas.retain(|p| !p.persona.trim().is_empty());
        if personas.is_empty() {
            return Err(GoalError::InvalidModelOutput("no personas in reply".to_string()));
        }
        personas.truncate(n);
        Ok(personas)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm::testing::{text, ScriptedClient};
    use crate::tools::fixtures::cars_summary;

    #[tokio::test]
    async fn parses_and_truncates_personas() {
        let reply = r#"[{"persona": "mechanic", "rationale": "fixes cars"}, {"persona": "buyer"}, {"persona": "regulator"}]"#;
        let client = Arc::new(ScriptedClient::new(vec![text(reply)]));
        let ctx = AgentContext::new(client, "m");

        let personas = PersonaExplorer::new(&ctx)
            .generate(&cars_summary(), 2)
            .await
            .unwrap();
        assert_eq!(personas.len(), 2);
        assert_eq!(personas[0].persona, "mechanic");
        assert_eq!(personas[1].rationale, "");
    }

    #[tokio::test]
    async fn rejects_non_list() {
        let client = Arc::new(ScriptedClient::new(vec![text("everyone")]));
        let ctx = AgentContext::new(client, "m");
        let err = PersonaExplorer::new(&ctx)
            .generate(&cars_summary(), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, GoalError::InvalidModelOutput(_)));
    }
}
