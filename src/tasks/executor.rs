//! Task executor abstraction.

use async_trait::async_trait;

use crate::error::TaskError;

/// A named unit of executable logic.
///
/// Executors take a single opaque payload and produce an opaque result, and
/// may suspend internally on network I/O. The scheduler imposes no interface
/// beyond that; payload interpretation is entirely the executor's business.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    /// Task name used for registration and submission.
    fn name(&self) -> &str;

    /// Short human-readable description.
    fn description(&self) -> &str;

    /// Run the task against the submitted payload.
    async fn execute(&self, payload: serde_json::Value) -> Result<serde_json::Value, TaskError>;
}

/// Extract a required string field from a payload object.
pub fn require_str(payload: &serde_json::Value, field: &str) -> Result<String, TaskError> {
    payload
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| TaskError::InvalidPayload {
            reason: format!("missing or non-string field '{field}'"),
        })
}

/// Extract an optional string field from a payload object.
pub fn optional_str(payload: &serde_json::Value, field: &str) -> Option<String> {
    payload
        .get(field)
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn require_str_present() {
        let payload = json!({"text": "hello"});
        assert_eq!(require_str(&payload, "text").unwrap(), "hello");
    }

    #[test]
    fn require_str_missing_or_wrong_type() {
        let payload = json!({"text": 42});
        assert!(require_str(&payload, "text").is_err());
        assert!(require_str(&payload, "other").is_err());
    }

    #[test]
    fn optional_str_absent() {
        let payload = json!({});
        assert!(optional_str(&payload, "branch").is_none());
    }
}
