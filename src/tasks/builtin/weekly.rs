//! Weekly digest task — always registered, dry-run by default.

use async_trait::async_trait;

use crate::error::TaskError;
use crate::tasks::executor::{TaskExecutor, optional_str};

const DEFAULT_CONFIG_PATH: &str = "configs/weekly_digest.json";
const DEFAULT_DAYS: u64 = 7;

/// Produce the weekly announcements digest.
///
/// Currently a dry-run preview: it echoes the effective parameters and a
/// preview block so the submission path can be exercised end to end without
/// sending anything.
pub struct WeeklyDigestTask;

#[async_trait]
impl TaskExecutor for WeeklyDigestTask {
    fn name(&self) -> &str {
        "weekly_digest"
    }

    fn description(&self) -> &str {
        "Build the weekly digest (dry-run preview)"
    }

    async fn execute(&self, payload: serde_json::Value) -> Result<serde_json::Value, TaskError> {
        let config_path =
            optional_str(&payload, "config_path").unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        let dry_run = payload
            .get("dry_run")
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        let days = payload.get("days").and_then(|v| v.as_u64()).unwrap_or(DEFAULT_DAYS);

        Ok(serde_json::json!({
            "ok": true,
            "dry_run": dry_run,
            "config_path": config_path,
            "days": days,
            "preview_markdown": format!(
                "## Weekly digest preview\n- window: last {days} days\n- no items fetched (dry run)"
            ),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn defaults_apply() {
        let out = WeeklyDigestTask.execute(json!({})).await.unwrap();
        assert_eq!(out["ok"], true);
        assert_eq!(out["dry_run"], true);
        assert_eq!(out["days"], 7);
        assert_eq!(out["config_path"], DEFAULT_CONFIG_PATH);
        assert!(out["preview_markdown"].as_str().unwrap().contains("7 days"));
    }

    #[tokio::test]
    async fn payload_overrides_defaults() {
        let out = WeeklyDigestTask
            .execute(json!({"dry_run": false, "days": 14, "config_path": "alt.json"}))
            .await
            .unwrap();
        assert_eq!(out["dry_run"], false);
        assert_eq!(out["days"], 14);
        assert_eq!(out["config_path"], "alt.json");
    }
}
