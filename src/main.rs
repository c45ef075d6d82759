use std::sync::Arc;

use taskplane::api::api_routes;
use taskplane::config::{AppConfig, GitHubConfig, GraphConfig, LlmConfig};
use taskplane::jobs::{JobScheduler, JobStore};
use taskplane::llm::{ChatProvider, OpenAiCompatClient};
use taskplane::remote::{GitHubClient, GraphClient};
use taskplane::tasks::{TaskRegistry, builtin};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env();

    eprintln!("taskplane v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: http://{}", config.bind_addr);
    eprintln!(
        "   Access key: {}",
        if config.api_access_key.is_some() {
            "required (x-api-key)"
        } else {
            "disabled"
        }
    );

    // ── Optional integrations ───────────────────────────────────────────
    let llm: Option<Arc<dyn ChatProvider>> = match LlmConfig::from_env() {
        Some(llm_config) => {
            eprintln!("   LLM: enabled (model: {})", llm_config.model);
            Some(Arc::new(OpenAiCompatClient::new(llm_config)))
        }
        None => {
            eprintln!("   LLM: disabled (LLM_API_KEY not set)");
            None
        }
    };

    let github: Option<Arc<GitHubClient>> = match GitHubConfig::from_env() {
        Some(github_config) => {
            eprintln!("   GitHub: enabled");
            Some(Arc::new(GitHubClient::new(github_config)))
        }
        None => {
            eprintln!("   GitHub: disabled (GITHUB_TOKEN not set)");
            None
        }
    };

    let graph: Option<Arc<GraphClient>> = match GraphConfig::from_env() {
        Some(graph_config) => {
            eprintln!("   Graph mail: enabled");
            Some(Arc::new(GraphClient::new(graph_config)))
        }
        None => {
            eprintln!("   Graph mail: disabled (MS_* credentials not set)");
            None
        }
    };

    // ── Task registry (finished before the scheduler starts) ────────────
    let mut registry = TaskRegistry::new();
    builtin::register_available(&mut registry, llm.clone(), github, graph);
    eprintln!("   Tasks: {}\n", registry.names().join(", "));

    // ── Scheduler + API ─────────────────────────────────────────────────
    let store = Arc::new(JobStore::new());
    let scheduler = Arc::new(JobScheduler::new(
        Arc::new(registry),
        store,
        config.max_parallel_jobs,
    ));

    let app = api_routes(scheduler, llm, config.api_access_key.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "Control API started");
    axum::serve(listener, app).await?;

    Ok(())
}
