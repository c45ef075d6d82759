//! Text summarization task.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::llm::{ChatMessage, ChatProvider};
use crate::tasks::executor::{TaskExecutor, optional_str};

/// Summarize the payload's `text` with the LLM.
pub struct SummarizeTask {
    llm: Arc<dyn ChatProvider>,
}

impl SummarizeTask {
    pub fn new(llm: Arc<dyn ChatProvider>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl TaskExecutor for SummarizeTask {
    fn name(&self) -> &str {
        "summarize"
    }

    fn description(&self) -> &str {
        "Summarize a piece of text"
    }

    async fn execute(&self, payload: serde_json::Value) -> Result<serde_json::Value, TaskError> {
        let text = optional_str(&payload, "text").unwrap_or_default();

        let out = self
            .llm
            .chat(
                &[ChatMessage::user(text)],
                Some("Summarize the text concisely."),
            )
            .await?;

        Ok(serde_json::json!({"summary": out}))
    }
}
