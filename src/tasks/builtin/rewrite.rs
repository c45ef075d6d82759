//! Text rewriting task.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::llm::{ChatMessage, ChatProvider};
use crate::tasks::executor::{TaskExecutor, optional_str};

const DEFAULT_INSTRUCTION: &str = "Rewrite the text in clearer, better prose.";

/// Rewrite the payload's `text` following an optional `instruction`.
pub struct RewriteTask {
    llm: Arc<dyn ChatProvider>,
}

impl RewriteTask {
    pub fn new(llm: Arc<dyn ChatProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl TaskExecutor for RewriteTask {
    fn name(&self) -> &str {
        "rewrite"
    }

    fn description(&self) -> &str {
        "Rewrite a piece of text, optionally following an instruction"
    }

    async fn execute(&self, payload: serde_json::Value) -> Result<serde_json::Value, TaskError> {
        let text = optional_str(&payload, "text").unwrap_or_default();
        let instruction =
            optional_str(&payload, "instruction").unwrap_or_else(|| DEFAULT_INSTRUCTION.to_string());

        let out = self
            .llm
            .chat(&[ChatMessage::user(text)], Some(&instruction))
            .await?;

        Ok(serde_json::json!({"rewrite": out}))
    }
}
