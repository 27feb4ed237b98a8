//! Visualization goal exploration.
//!
//! Given a [`DataSummary`], the model proposes questions a chart could answer.
//! With tools enabled the request goes through the [`ToolLoop`] so the model
//! can inspect fields and ask for chart recommendations before answering.

mod persona;

pub use persona::{Persona, PersonaExplorer};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agents::{AgentContext, AgentError, ToolLoop};
use crate::llm::{ChatMessage, TokenUsage};
use crate::prompts::{render_goal_prompt, GOAL_SYSTEM_PROMPT};
use crate::summarize::DataSummary;
use crate::util::{extract_json, preview};

#[derive(Debug, Error)]
pub enum GoalError {
    #[error("Goal generation failed: {0}")]
    Agent(#[from] AgentError),

    #[error("Invalid model output: {0}")]
    InvalidModelOutput(String),

    #[error("Requested zero goals")]
    ZeroRequested,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    #[serde(default)]
    pub index: usize,
    pub question: String,
    pub visualization: String,
    #[serde(default)]
    pub rationale: String,
}

/// Goals plus what it took to produce them.
#[derive(Debug, Clone, Serialize)]
pub struct GoalReport {
    pub goals: Vec<Goal>,
    pub persona: Persona,
    pub tool_log: Vec<String>,
    pub iterations: usize,
    pub usage: TokenUsage,
}

/// Parse a model reply into at most `n` goals, indexed from zero.
///
/// A single goal object is accepted as a one-element list.
pub fn parse_goals(reply: &str, n: usize) -> Result<Vec<Goal>, GoalError> {
    let body = extract_json(reply);
    let mut goals: Vec<Goal> = match serde_json::from_str::<Vec<Goal>>(body) {
        Ok(goals) => goals,
        Err(list_err) => serde_json::from_str::<Goal>(body)
            .map(|g| vec![g])
            .map_err(|_| {
                GoalError::InvalidModelOutput(format!("{} in reply: {}", list_err, preview(reply, 200)))
            })?,
    };

    goals.retain(|g| !g.question.trim().is_empty());
    if goals.is_empty() {
        return Err(GoalError::InvalidModelOutput("no goals in reply".to_string()));
    }

    goals.truncate(n);
    for (i, goal) in goals.iter_mut().enumerate() {
        goal.index = i;
    }
    Ok(goals)
}

pub struct GoalExplorer<'a> {
    ctx: &'a AgentContext,
}

impl<'a> GoalExplorer<'a> {
    pub fn new(ctx: &'a AgentContext) -> Self {
        Self { ctx }
    }

    /// Generate up to `n` goals for `persona` (the default analyst when `None`).
    pub async fn generate(
        &self,
        summary: &DataSummary,
        n: usize,
        persona: Option<Persona>,
    ) -> Result<GoalReport, GoalError> {
        if n == 0 {
            return Err(GoalError::ZeroRequested);
        }
        let persona = persona.unwrap_or_default();
        let tools_available = !self.ctx.tools.is_empty();

        tracing::info!(
            dataset = %summary.name,
            n,
            persona = %persona.persona,
            tools = tools_available,
            "Generating goals"
        );

        let messages = vec![
            ChatMessage::system(GOAL_SYSTEM_PROMPT),
            ChatMessage::user(render_goal_prompt(summary, n, &persona, tools_available)),
        ];

        let outcome = ToolLoop::new(self.ctx, summary)
            .run(messages)
            .await
            .map_err(|e| {
                tracing::warn!(reason = ?e.terminal_reason(), "Goal exploration stopped: {}", e);
                e
            })?;
        let goals = parse_goals(&outcome.content, n)?;

        tracing::info!(
            goals = goals.len(),
            tool_calls = outcome.tool_log.len(),
            iterations = outcome.iterations,
            "Goals generated"
        );

        Ok(GoalReport {
            goals,
            persona,
            tool_log: outcome.tool_log,
            iterations: outcome.iterations,
            usage: outcome.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm::testing::{text, tool_call, ScriptedClient};
    use crate::tools::fixtures::cars_summary;
    use crate::tools::ToolRegistry;

    const TWO_GOALS: &str = r#"[
        {"index": 5, "question": "How does weight relate to mpg?", "visualization": "scatter of weight vs mpg", "rationale": "Heavier cars may be less efficient."},
        {"index": 9, "question": "Which origin has the best mpg?", "visualization": "bar of mean mpg by origin", "rationale": "Regional differences."}
    ]"#;

    #[test]
    fn parse_reindexes_and_truncates() {
        let goals = parse_goals(TWO_GOALS, 1).unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].index, 0);

        let goals = parse_goals(TWO_GOALS, 10).unwrap();
        assert_eq!(goals.iter().map(|g| g.index).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn parse_accepts_single_object_and_fences() {
        let reply = "```json\n{\"question\": \"q?\", \"visualization\": \"v\"}\n```";
        let goals = parse_goals(reply, 3).unwrap();
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].rationale, "");
    }

    #[test]
    fn parse_rejects_empty_and_garbage() {
        assert!(matches!(parse_goals("[]", 3), Err(GoalError::InvalidModelOutput(_))));
        assert!(matches!(parse_goals("no idea", 3), Err(GoalError::InvalidModelOutput(_))));
        let blank = r#"[{"question": "  ", "visualization": "v"}]"#;
        assert!(parse_goals(blank, 3).is_err());
    }

    #[tokio::test]
    async fn generate_with_tools() {
        let client = Arc::new(ScriptedClient::new(vec![
            tool_call("c1", "recommend_chart", r#"{"fields":["weight","mpg"]}"#),
            text(TWO_GOALS),
        ]));
        let ctx = AgentContext::new(client.clone(), "m");
        let summary = cars_summary();

        let report = GoalExplorer::new(&ctx).generate(&summary, 2, None).await.unwrap();
        assert_eq!(report.goals.len(), 2);
        assert_eq!(report.iterations, 2);
        assert_eq!(report.tool_log.len(), 1);
        assert_eq!(report.persona, Persona::default());

        let calls = client.calls.lock().unwrap();
        let tool_reply = calls[1].0.last().unwrap().content.clone().unwrap();
        assert!(tool_reply.contains("\"chart\":\"scatter\""));
    }

    #[tokio::test]
    async fn generate_without_tools_is_single_call() {
        let client = Arc::new(ScriptedClient::new(vec![text(TWO_GOALS)]));
        let ctx = AgentContext::new(client.clone(), "m").with_tools(ToolRegistry::empty());
        let summary = cars_summary();
        let persona = Persona {
            persona: "a fleet manager".to_string(),
            rationale: "buys cars".to_string(),
        };

        let report = GoalExplorer::new(&ctx)
            .generate(&summary, 2, Some(persona))
            .await
            .unwrap();
        assert_eq!(report.iterations, 1);
        assert_eq!(client.call_count(), 1);

        let calls = client.calls.lock().unwrap();
        let prompt = calls[0].0[1].content.clone().unwrap();
        assert!(prompt.contains("'a fleet manager' persona"));
        assert!(!prompt.contains("recommend_chart"));
    }

    #[tokio::test]
    async fn zero_goals_rejected_without_calling_model() {
        let client = Arc::new(ScriptedClient::new(vec![]));
        let ctx = AgentContext::new(client.clone(), "m");
        let err = GoalExplorer::new(&ctx)
            .generate(&cars_summary(), 0, None)
            .await
            .unwrap_err();
        assert!(matches!(err, GoalError::ZeroRequested));
        assert_eq!(client.call_count(), 0);
    }
}
