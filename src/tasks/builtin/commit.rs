//! Single-file commit task backed by the GitHub Contents API.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TaskError;
use crate::remote::GitHubClient;
use crate::tasks::executor::{TaskExecutor, optional_str, require_str};

/// Commit one file (create or update) to a repository.
pub struct CommitFileTask {
    github: Arc<GitHubClient>,
}

impl CommitFileTask {
    pub fn new(github: Arc<GitHubClient>) -> Self {
        Self { github }
    }
}

#[async_trait]
impl TaskExecutor for CommitFileTask {
    fn name(&self) -> &str {
        "commit_file"
    }

    fn description(&self) -> &str {
        "Commit a single file to a GitHub repository"
    }

    async fn execute(&self, payload: serde_json::Value) -> Result<serde_json::Value, TaskError> {
        let repo = require_str(&payload, "repo")?;
        let path = require_str(&payload, "path")?;
        let message = require_str(&payload, "message")?;
        let content = require_str(&payload, "content")?;
        let branch = optional_str(&payload, "branch").unwrap_or_else(|| "main".to_string());

        let response = self
            .github
            .commit_file(&repo, &path, &content, &message, &branch)
            .await?;

        Ok(response)
    }
}
