//! Inbox digest task — list today's mail via Microsoft Graph, optionally
//! condense it with the LLM, optionally mail the digest out.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::llm::{ChatMessage, ChatProvider};
use crate::remote::{GraphClient, MailMessage};
use crate::tasks::executor::{TaskExecutor, optional_str, require_str};

const DEFAULT_TOP: usize = 50;

/// Digest today's inbox for a mailbox.
pub struct InboxDigestTask {
    graph: Arc<GraphClient>,
    /// Optional: when present, the raw listing is condensed into prose.
    llm: Option<Arc<dyn ChatProvider>>,
}

impl InboxDigestTask {
    pub fn new(graph: Arc<GraphClient>, llm: Option<Arc<dyn ChatProvider>>) -> Self {
        Self { graph, llm }
    }
}

/// Render messages as a markdown bullet list.
fn render_messages(messages: &[MailMessage]) -> String {
    if messages.is_empty() {
        return "No messages received today.".to_string();
    }

    messages
        .iter()
        .map(|m| format!("- **{}** — {} ({})\n  {}", m.subject, m.from, m.date, m.snippet))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl TaskExecutor for InboxDigestTask {
    fn name(&self) -> &str {
        "digest_inbox"
    }

    fn description(&self) -> &str {
        "Digest today's inbox, optionally condensed and mailed out"
    }

    async fn execute(&self, payload: serde_json::Value) -> Result<serde_json::Value, TaskError> {
        let user_id = require_str(&payload, "user_id")?;
        let top = payload
            .get("top")
            .and_then(|v| v.as_u64())
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_TOP);
        let send_to = optional_str(&payload, "send_to");

        let messages = self.graph.list_today_messages(&user_id, top).await?;
        let listing = render_messages(&messages);

        let digest = match &self.llm {
            Some(llm) => {
                llm.chat(
                    &[ChatMessage::user(listing)],
                    Some("Condense this inbox listing into a short digest, grouping related threads."),
                )
                .await?
            }
            None => listing,
        };

        let mut sent = false;
        if let Some(to) = &send_to {
            self.graph
                .send_mail_plain(&user_id, to, "Inbox digest", &digest)
                .await?;
            sent = true;
        }

        Ok(serde_json::json!({
            "count": messages.len(),
            "digest": digest,
            "sent": sent,
        }))
    }
}
