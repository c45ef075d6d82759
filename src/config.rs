//! Configuration types, built from environment variables.

use secrecy::SecretString;

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the HTTP server binds to.
    pub bind_addr: String,
    /// Access key required in the `x-api-key` header. `None` disables the
    /// gate entirely (demo mode, matching the reference deployment).
    pub api_access_key: Option<String>,
    /// Maximum number of executors running concurrently.
    pub max_parallel_jobs: usize,
}

impl AppConfig {
    /// Build config from environment variables, with defaults for local runs.
    pub fn from_env() -> Self {
        let port: u16 = std::env::var("TASKPLANE_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let api_access_key = std::env::var("API_ACCESS_KEY")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let max_parallel_jobs: usize = std::env::var("TASKPLANE_MAX_PARALLEL_JOBS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(16);

        Self {
            bind_addr: format!("0.0.0.0:{port}"),
            api_access_key,
            max_parallel_jobs,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            api_access_key: None,
            max_parallel_jobs: 16,
        }
    }
}

/// LLM completion endpoint configuration.
///
/// Returns `None` from `from_env` when `LLM_API_KEY` is not set — the
/// LLM-backed tasks are then simply not registered.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: SecretString,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

impl LlmConfig {
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("LLM_API_KEY").ok()?;

        let base_url = std::env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let temperature: f32 = std::env::var("LLM_TEMPERATURE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.3);

        Some(Self {
            api_key: SecretString::from(api_key),
            base_url,
            model,
            temperature,
        })
    }
}

/// GitHub commit integration configuration.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub token: SecretString,
}

impl GitHubConfig {
    /// Returns `None` when `GITHUB_TOKEN` is not set (commit tasks disabled).
    pub fn from_env() -> Option<Self> {
        let token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty())?;
        Some(Self {
            token: SecretString::from(token),
        })
    }
}

/// Microsoft Graph (mail) integration configuration.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: SecretString,
}

impl GraphConfig {
    /// Returns `None` unless all three credentials are present.
    pub fn from_env() -> Option<Self> {
        let tenant_id = std::env::var("MS_TENANT_ID").ok()?;
        let client_id = std::env::var("MS_CLIENT_ID").ok()?;
        let client_secret = std::env::var("MS_CLIENT_SECRET").ok()?;
        Some(Self {
            tenant_id,
            client_id,
            client_secret: SecretString::from(client_secret),
        })
    }
}
