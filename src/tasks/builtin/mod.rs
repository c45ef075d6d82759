//! Built-in task executors and the bootstrap step that registers whichever
//! of them are actually runnable with the process's configuration.

pub mod commit;
pub mod digest;
pub mod rewrite;
pub mod scaffold;
pub mod summarize;
pub mod weekly;

use std::sync::Arc;

use crate::llm::ChatProvider;
use crate::remote::{GitHubClient, GraphClient};
use crate::tasks::registry::TaskRegistry;

pub use commit::CommitFileTask;
pub use digest::InboxDigestTask;
pub use rewrite::RewriteTask;
pub use scaffold::ScaffoldTask;
pub use summarize::SummarizeTask;
pub use weekly::WeeklyDigestTask;

/// Register every task whose dependencies are configured.
///
/// Tasks missing a credential are omitted, not stubbed: submitting one then
/// fails synchronously as an unknown task. `weekly_digest` needs nothing and
/// is always registered, last, so it survives any earlier collision.
pub fn register_available(
    registry: &mut TaskRegistry,
    llm: Option<Arc<dyn ChatProvider>>,
    github: Option<Arc<GitHubClient>>,
    graph: Option<Arc<GraphClient>>,
) {
    if let Some(llm) = &llm {
        registry.register(Arc::new(SummarizeTask::new(Arc::clone(llm))));
        registry.register(Arc::new(RewriteTask::new(Arc::clone(llm))));
    }

    if let Some(github) = &github {
        registry.register(Arc::new(CommitFileTask::new(Arc::clone(github))));
        registry.register(Arc::new(ScaffoldTask::new(Arc::clone(github))));
    }

    if let Some(graph) = &graph {
        registry.register(Arc::new(InboxDigestTask::new(Arc::clone(graph), llm.clone())));
    }

    registry.register(Arc::new(WeeklyDigestTask));
}
