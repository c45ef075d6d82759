//! GitHub Contents API client — create/update a file as a commit.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use secrecy::ExposeSecret;

use crate::config::GitHubConfig;
use crate::error::RemoteError;

const GITHUB_API: &str = "https://api.github.com";
const SERVICE: &str = "github";

/// Client for the GitHub Contents API.
pub struct GitHubClient {
    http: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn contents_url(&self, repo: &str, path: &str) -> String {
        format!("{GITHUB_API}/repos/{repo}/contents/{path}")
    }

    /// Fetch the blob sha of an existing file, if any. Updating an existing
    /// file requires passing its current sha; a missing file has none.
    async fn file_sha(
        &self,
        repo: &str,
        path: &str,
        branch: &str,
    ) -> Result<Option<String>, RemoteError> {
        let resp = self
            .http
            .get(self.contents_url(repo, path))
            .query(&[("ref", branch)])
            .bearer_auth(self.config.token.expose_secret())
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "taskplane")
            .send()
            .await
            .map_err(|e| RemoteError::request(SERVICE, e))?;

        if resp.status().is_success() {
            let data: serde_json::Value = resp
                .json()
                .await
                .map_err(|e| RemoteError::request(SERVICE, e))?;
            Ok(data.get("sha").and_then(|v| v.as_str()).map(str::to_string))
        } else {
            Ok(None)
        }
    }

    /// Commit (create or update) a single file via the Contents API.
    ///
    /// Returns the API's response body (commit + content metadata).
    pub async fn commit_file(
        &self,
        repo: &str,
        path: &str,
        content: &str,
        message: &str,
        branch: &str,
    ) -> Result<serde_json::Value, RemoteError> {
        let sha = self.file_sha(repo, path, branch).await?;

        let mut payload = serde_json::json!({
            "message": message,
            "content": BASE64.encode(content.as_bytes()),
            "branch": branch,
        });
        if let Some(sha) = sha {
            payload["sha"] = serde_json::Value::String(sha);
        }

        let resp = self
            .http
            .put(self.contents_url(repo, path))
            .bearer_auth(self.config.token.expose_secret())
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", "taskplane")
            .json(&payload)
            .send()
            .await
            .map_err(|e| RemoteError::request(SERVICE, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                service: SERVICE.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        resp.json()
            .await
            .map_err(|e| RemoteError::request(SERVICE, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn client() -> GitHubClient {
        GitHubClient::new(GitHubConfig {
            token: SecretString::from("ghp_test"),
        })
    }

    #[test]
    fn contents_url_shape() {
        let c = client();
        assert_eq!(
            c.contents_url("octo/repo", "docs/readme.md"),
            "https://api.github.com/repos/octo/repo/contents/docs/readme.md"
        );
    }
}
