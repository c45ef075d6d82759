//! Task registry — the static name → executor mapping.
//!
//! Built once at bootstrap and then shared immutably behind an `Arc`; the
//! registry is read-only for the whole serving lifetime, so lookups take no
//! lock.

use std::collections::HashMap;
use std::sync::Arc;

use crate::tasks::executor::TaskExecutor;

/// Registry of runnable tasks.
pub struct TaskRegistry {
    tasks: HashMap<String, Arc<dyn TaskExecutor>>,
}

impl TaskRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tasks: HashMap::new(),
        }
    }

    /// Register an executor under its own name.
    ///
    /// Re-registering a name silently replaces the prior binding, which lets
    /// always-available tasks be added after conditional ones.
    pub fn register(&mut self, executor: Arc<dyn TaskExecutor>) {
        let name = executor.name().to_string();
        if self.tasks.insert(name.clone(), executor).is_some() {
            tracing::debug!(task = %name, "Replaced existing task registration");
        } else {
            tracing::debug!(task = %name, "Registered task");
        }
    }

    /// Look up an executor by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn TaskExecutor>> {
        self.tasks.get(name).cloned()
    }

    /// Check if a task exists.
    pub fn has(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// All registered task names, sorted for stable listings.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tasks.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TaskError;
    use async_trait::async_trait;

    struct StaticTask {
        name: String,
        reply: serde_json::Value,
    }

    #[async_trait]
    impl TaskExecutor for StaticTask {
        fn name(&self) -> &str {
            &self.name
        }
        fn description(&self) -> &str {
            "static test task"
        }
        async fn execute(
            &self,
            _payload: serde_json::Value,
        ) -> Result<serde_json::Value, TaskError> {
            Ok(self.reply.clone())
        }
    }

    fn task(name: &str, reply: serde_json::Value) -> Arc<dyn TaskExecutor> {
        Arc::new(StaticTask {
            name: name.to_string(),
            reply,
        })
    }

    #[test]
    fn register_and_lookup() {
        let mut registry = TaskRegistry::new();
        registry.register(task("summarize", serde_json::json!("a")));

        assert!(registry.has("summarize"));
        assert!(!registry.has("rewrite"));
        assert_eq!(registry.lookup("summarize").unwrap().name(), "summarize");
        assert!(registry.lookup("rewrite").is_none());
    }

    #[tokio::test]
    async fn reregistration_replaces_silently() {
        let mut registry = TaskRegistry::new();
        registry.register(task("digest", serde_json::json!("first")));
        registry.register(task("digest", serde_json::json!("second")));

        assert_eq!(registry.len(), 1);
        let bound = registry.lookup("digest").unwrap();
        let out = bound.execute(serde_json::json!({})).await.unwrap();
        assert_eq!(out, serde_json::json!("second"));
    }

    #[test]
    fn names_are_sorted() {
        let mut registry = TaskRegistry::new();
        registry.register(task("rewrite", serde_json::json!(null)));
        registry.register(task("commit_file", serde_json::json!(null)));
        registry.register(task("summarize", serde_json::json!(null)));

        assert_eq!(registry.names(), vec!["commit_file", "rewrite", "summarize"]);
    }

    #[test]
    fn empty_registry() {
        let registry = TaskRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.names().is_empty());
    }
}
