//! Scaffold task — commit a batch of files described by a pure-JSON spec.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::remote::GitHubClient;
use crate::tasks::executor::{TaskExecutor, optional_str, require_str};

const DEFAULT_MAX_FILES: u64 = 8;
const DEFAULT_MESSAGE: &str = "Scaffold via scaffold task";

/// One file to be committed.
struct SpecFile {
    path: String,
    content: String,
}

/// Commit a list of `{path, content}` files to a repository.
///
/// Only pure-JSON file specs are supported; a natural-language `goal`
/// without `files` is rejected (the planner endpoint exists to turn goals
/// into file specs first).
pub struct ScaffoldTask {
    github: Arc<GitHubClient>,
}

impl ScaffoldTask {
    pub fn new(github: Arc<GitHubClient>) -> Self {
        Self { github }
    }
}

fn parse_files(payload: &serde_json::Value) -> Result<Vec<SpecFile>, TaskError> {
    let items = payload
        .get("files")
        .and_then(|v| v.as_array())
        .ok_or_else(|| TaskError::InvalidPayload {
            reason: "'files' is required; goal-only builds are not supported".to_string(),
        })?;

    let mut files = Vec::with_capacity(items.len());
    for item in items {
        let path = item
            .get("path")
            .and_then(|v| v.as_str())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| TaskError::InvalidPayload {
                reason: "every file item needs a non-empty 'path' string".to_string(),
            })?;

        let content = match item.get("content") {
            None => String::new(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(TaskError::InvalidPayload {
                    reason: "every file item's 'content' must be a string".to_string(),
                });
            }
        };

        files.push(SpecFile {
            path: path.to_string(),
            content,
        });
    }
    Ok(files)
}

#[async_trait]
impl TaskExecutor for ScaffoldTask {
    fn name(&self) -> &str {
        "scaffold"
    }

    fn description(&self) -> &str {
        "Commit a batch of files from a pure-JSON build spec"
    }

    async fn execute(&self, payload: serde_json::Value) -> Result<serde_json::Value, TaskError> {
        let repo = require_str(&payload, "repo")?;
        let prefix = optional_str(&payload, "prefix").unwrap_or_default();
        let branch = optional_str(&payload, "branch").unwrap_or_else(|| "main".to_string());
        let message = optional_str(&payload, "message").unwrap_or_else(|| DEFAULT_MESSAGE.to_string());
        let max_files = payload
            .get("max_files")
            .and_then(|v| v.as_u64())
            .unwrap_or(DEFAULT_MAX_FILES);

        let files = parse_files(&payload)?;
        if files.len() as u64 > max_files {
            return Err(TaskError::InvalidPayload {
                reason: format!("too many files ({} > {max_files})", files.len()),
            });
        }

        let mut committed = Vec::with_capacity(files.len());
        for file in &files {
            let full_path = if !prefix.is_empty() && !file.path.starts_with(&prefix) {
                format!("{prefix}{}", file.path)
            } else {
                file.path.clone()
            };

            self.github
                .commit_file(&repo, &full_path, &file.content, &message, &branch)
                .await?;
            committed.push(full_path);
        }

        Ok(serde_json::json!({
            "ok": true,
            "repo": repo,
            "branch": branch,
            "committed": committed,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GitHubConfig;
    use secrecy::SecretString;
    use serde_json::json;

    fn task() -> ScaffoldTask {
        ScaffoldTask::new(Arc::new(GitHubClient::new(GitHubConfig {
            token: SecretString::from("ghp_test"),
        })))
    }

    #[tokio::test]
    async fn goal_without_files_is_rejected() {
        let err = task()
            .execute(json!({"repo": "octo/repo", "goal": "make me an app"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("'files' is required"));
    }

    #[tokio::test]
    async fn too_many_files_rejected() {
        let files: Vec<_> = (0..9)
            .map(|i| json!({"path": format!("f{i}.txt"), "content": ""}))
            .collect();
        let err = task()
            .execute(json!({"repo": "octo/repo", "files": files}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("too many files"));
    }

    #[tokio::test]
    async fn max_files_override_is_honored() {
        let files: Vec<_> = (0..3)
            .map(|i| json!({"path": format!("f{i}.txt")}))
            .collect();
        let err = task()
            .execute(json!({"repo": "octo/repo", "files": files, "max_files": 2}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("too many files"));
    }

    #[tokio::test]
    async fn file_items_need_a_path() {
        let err = task()
            .execute(json!({"repo": "octo/repo", "files": [{"content": "x"}]}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("path"));
    }

    #[tokio::test]
    async fn non_string_content_rejected() {
        let err = task()
            .execute(json!({"repo": "octo/repo", "files": [{"path": "a.txt", "content": 42}]}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("content"));
    }

    #[test]
    fn parse_files_defaults_content_to_empty() {
        let files = parse_files(&json!({"files": [{"path": "a.txt"}]})).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, "a.txt");
        assert!(files[0].content.is_empty());
    }
}
