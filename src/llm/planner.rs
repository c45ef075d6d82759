//! Planner — turns a free-form operator request into a safe, structured
//! proposal (a build spec, a commit, or a job submission) via the LLM.

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::llm::{ChatMessage, ChatProvider};

/// System prompt demanding pure JSON output.
const SUGGEST_SYSTEM: &str = r#"You are a planner that returns ONLY valid JSON.
NO text outside the JSON. NO code fences.
Schema:
{
  "type": "build" | "commit" | "job",
  "payload": object,
  "notes": string
}
Rules:
- Prefer a smoke-test or dry-run proposal where possible.
- For scaffold builds: only pure JSON specs with 'files' and 'commit_message'.
- For jobs: set 'dry_run': true when the task supports it.
- Keep examples small and safe (at most 1-2 files).
- No secrets; no unnecessary outbound network calls."#;

/// A structured proposal produced by the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suggestion {
    /// Proposal kind: `build`, `commit`, or `job`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Kind-specific payload, ready to post to the matching endpoint.
    pub payload: serde_json::Value,
    /// Free-text rationale from the planner.
    #[serde(default)]
    pub notes: Option<String>,
}

fn examples_block() -> String {
    let examples = [
        (
            "Check whether the scaffolder works",
            serde_json::json!({
                "type": "build",
                "payload": {
                    "summary": "smoke test",
                    "files": [
                        {"path": "TEST-PIPELINE.txt", "content": "Hello from scaffold\n"}
                    ],
                    "commit_message": "smoke test: scaffold"
                },
                "notes": "Simple smoke test with no functional impact."
            }),
        ),
        (
            "Run the weekly digest",
            serde_json::json!({
                "type": "job",
                "payload": {
                    "task": "weekly_digest",
                    "payload": {"dry_run": true}
                },
                "notes": "Safe dry run of the weekly job."
            }),
        ),
    ];

    examples
        .iter()
        .map(|(user, json)| format!("User: {user}\nReturn:\n{json}"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Ask the LLM to convert a free-form request into a `Suggestion`.
///
/// The model is instructed to emit pure JSON; anything that fails to parse
/// or lacks the required `type`/`payload` fields is an `InvalidResponse`.
pub async fn suggest_from_text(
    provider: &dyn ChatProvider,
    prompt: &str,
) -> Result<Suggestion, LlmError> {
    let user = format!(
        "Convert this into a safe proposal (smoke test / dry run where possible) as JSON.\n\n\
         INPUT:\n{prompt}\n\nExamples:\n{}",
        examples_block()
    );

    let out = provider
        .chat(&[ChatMessage::user(user)], Some(SUGGEST_SYSTEM))
        .await?;

    let value: serde_json::Value =
        serde_json::from_str(out.trim()).map_err(|e| LlmError::InvalidResponse {
            reason: format!("planner returned non-JSON output: {e}"),
        })?;

    if value.get("type").and_then(|v| v.as_str()).is_none() || value.get("payload").is_none() {
        return Err(LlmError::InvalidResponse {
            reason: "planner JSON is missing required 'type' and/or 'payload' fields".to_string(),
        });
    }

    serde_json::from_value(value).map_err(|e| LlmError::InvalidResponse {
        reason: format!("planner JSON has unexpected shape: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    /// Provider that replies with a canned string.
    struct CannedProvider {
        reply: String,
    }

    #[async_trait]
    impl ChatProvider for CannedProvider {
        fn model_name(&self) -> &str {
            "canned"
        }
        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _system: Option<&str>,
        ) -> Result<String, LlmError> {
            Ok(self.reply.clone())
        }
    }

    #[tokio::test]
    async fn parses_valid_suggestion() {
        let provider = CannedProvider {
            reply: r#"{"type": "job", "payload": {"task": "weekly_digest", "payload": {"dry_run": true}}, "notes": "safe"}"#.to_string(),
        };

        let suggestion = suggest_from_text(&provider, "run the weekly digest")
            .await
            .unwrap();
        assert_eq!(suggestion.kind, "job");
        assert_eq!(suggestion.payload["task"], "weekly_digest");
        assert_eq!(suggestion.notes.as_deref(), Some("safe"));
    }

    #[tokio::test]
    async fn notes_are_optional() {
        let provider = CannedProvider {
            reply: r#"{"type": "build", "payload": {"files": []}}"#.to_string(),
        };
        let suggestion = suggest_from_text(&provider, "anything").await.unwrap();
        assert!(suggestion.notes.is_none());
    }

    #[tokio::test]
    async fn rejects_non_json_output() {
        let provider = CannedProvider {
            reply: "Sure! Here's what I'd do: ...".to_string(),
        };
        let err = suggest_from_text(&provider, "anything").await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse { .. }));
    }

    #[tokio::test]
    async fn rejects_json_without_required_fields() {
        let provider = CannedProvider {
            reply: r#"{"payload": {}}"#.to_string(),
        };
        let err = suggest_from_text(&provider, "anything").await.unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse { .. }));
    }
}
