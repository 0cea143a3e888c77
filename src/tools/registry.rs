//! Tool registry: descriptors and executors in one-to-one correspondence

use futures::FutureExt;
use serde_json::Value;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use super::{ResearchTool, ToolDescriptor, ToolExecutor, ToolResult, Typed};
use crate::agents::error::{AgentError, AgentResult, ToolError};

/// Immutable set of callable tools, built once and shared across runs
pub struct ToolRegistry {
    descriptors: Vec<ToolDescriptor>,
    model_schemas: Vec<Value>,
    executors: HashMap<String, Arc<dyn ToolExecutor>>,
}

impl ToolRegistry {
    pub fn builder() -> ToolRegistryBuilder {
        ToolRegistryBuilder::default()
    }

    /// Every registered descriptor, in registration order
    pub fn describe_all(&self) -> &[ToolDescriptor] {
        &self.descriptors
    }

    /// Descriptors projected into the completion API's function-calling shape
    pub fn to_model_schema(&self) -> &[Value] {
        &self.model_schemas
    }

    pub fn contains(&self, name: &str) -> bool {
        self.executors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Execute a tool by name with already-parsed arguments.
    ///
    /// Executor errors, panics and timeouts all come back as `ToolError`.
    pub async fn dispatch(
        &self,
        name: &str,
        args: Value,
        timeout: Duration,
    ) -> Result<ToolResult, ToolError> {
        let executor = self
            .executors
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        let guarded = AssertUnwindSafe(executor.execute(args)).catch_unwind();

        match tokio::time::timeout(timeout, guarded).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(ToolError::Panicked {
                tool: name.to_string(),
                reason: panic_message(panic.as_ref()),
            }),
            Err(_) => Err(ToolError::Timeout {
                tool: name.to_string(),
                seconds: timeout.as_secs(),
            }),
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Collects executors, then checks the result is a consistent registry
#[derive(Default)]
pub struct ToolRegistryBuilder {
    executors: Vec<Arc<dyn ToolExecutor>>,
}

impl ToolRegistryBuilder {
    /// Register a typed tool
    pub fn register<T: ResearchTool>(self, tool: T) -> Self {
        self.register_executor(Arc::new(Typed(tool)))
    }

    /// Register an already object-safe executor
    pub fn register_executor(mut self, executor: Arc<dyn ToolExecutor>) -> Self {
        self.executors.push(executor);
        self
    }

    /// Build the registry. Duplicate names are rejected.
    pub fn build(self) -> AgentResult<ToolRegistry> {
        let mut descriptors = Vec::with_capacity(self.executors.len());
        let mut executors = HashMap::with_capacity(self.executors.len());

        for executor in self.executors {
            let descriptor = executor.descriptor();
            if executors.contains_key(&descriptor.name) {
                return Err(AgentError::Configuration(format!(
                    "Duplicate tool registration: {}",
                    descriptor.name
                )));
            }
            executors.insert(descriptor.name.clone(), executor);
            descriptors.push(descriptor);
        }

        let model_schemas = descriptors.iter().map(ToolDescriptor::to_model_schema).collect();

        Ok(ToolRegistry {
            descriptors,
            model_schemas,
            executors,
        })
    }

    /// Build the registry and require it to match `catalog` exactly
    pub fn build_for_catalog(self, catalog: &[&str]) -> AgentResult<ToolRegistry> {
        let registry = self.build()?;

        let missing: Vec<&str> = catalog
            .iter()
            .copied()
            .filter(|name| !registry.contains(name))
            .collect();
        let unexpected: Vec<&str> = registry
            .descriptors
            .iter()
            .map(|d| d.name.as_str())
            .filter(|name| !catalog.contains(name))
            .collect();

        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(AgentError::Configuration(format!(
                "Tool registry does not match catalog (missing: {:?}, unexpected: {:?})",
                missing, unexpected
            )));
        }

        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Deserialize, JsonSchema)]
    struct EchoArgs {
        text: String,
    }

    struct Echo;

    #[async_trait]
    impl ResearchTool for Echo {
        type Args = EchoArgs;

        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            "Echo the text back"
        }

        async fn call(&self, args: EchoArgs) -> ToolResult {
            ToolResult::success(json!({ "text": args.text }))
        }
    }

    struct Slow;

    #[async_trait]
    impl ToolExecutor for Slow {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new("slow", "Never finishes in time", json!({}))
        }

        async fn execute(&self, _args: Value) -> Result<ToolResult, ToolError> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(ToolResult::default())
        }
    }

    struct Exploding;

    #[async_trait]
    impl ToolExecutor for Exploding {
        fn descriptor(&self) -> ToolDescriptor {
            ToolDescriptor::new("exploding", "Panics", json!({}))
        }

        async fn execute(&self, _args: Value) -> Result<ToolResult, ToolError> {
            panic!("scraper session vanished")
        }
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[test]
    fn test_duplicate_names_rejected() {
        let result = ToolRegistry::builder().register(Echo).register(Echo).build();
        assert!(matches!(result, Err(AgentError::Configuration(_))));
    }

    #[test]
    fn test_catalog_mismatch_rejected() {
        let result = ToolRegistry::builder().register(Echo).build_for_catalog(&["echo", "finish"]);
        assert!(matches!(result, Err(AgentError::Configuration(msg)) if msg.contains("finish")));

        let result = ToolRegistry::builder().register(Echo).build_for_catalog(&[]);
        assert!(matches!(result, Err(AgentError::Configuration(msg)) if msg.contains("echo")));
    }

    #[test]
    fn test_descriptors_and_schemas_are_cached_in_order() {
        let registry = ToolRegistry::builder()
            .register(Echo)
            .register_executor(Arc::new(Slow))
            .build()
            .unwrap();

        let names: Vec<_> = registry.describe_all().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["echo", "slow"]);
        assert_eq!(registry.to_model_schema().len(), 2);
        assert_eq!(registry.to_model_schema()[0]["function"]["name"], "echo");
    }

    #[tokio::test]
    async fn test_dispatch_validates_arguments() {
        let registry = ToolRegistry::builder().register(Echo).build().unwrap();

        let ok = registry.dispatch("echo", json!({ "text": "hi" }), TIMEOUT).await.unwrap();
        assert_eq!(ok.get_str("text"), Some("hi"));

        let err = registry.dispatch("echo", json!({ "txt": "hi" }), TIMEOUT).await;
        assert!(matches!(err, Err(ToolError::InvalidArguments { .. })));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_tool() {
        let registry = ToolRegistry::builder().register(Echo).build().unwrap();
        let err = registry.dispatch("nope", json!({}), TIMEOUT).await;
        assert!(matches!(err, Err(ToolError::UnknownTool(name)) if name == "nope"));
    }

    #[tokio::test]
    async fn test_dispatch_converts_panics() {
        let registry = ToolRegistry::builder()
            .register_executor(Arc::new(Exploding))
            .build()
            .unwrap();
        let err = registry.dispatch("exploding", json!({}), TIMEOUT).await;
        assert!(matches!(err, Err(ToolError::Panicked { reason, .. }) if reason.contains("vanished")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_times_out() {
        let registry = ToolRegistry::builder()
            .register_executor(Arc::new(Slow))
            .build()
            .unwrap();
        let err = registry.dispatch("slow", json!({}), Duration::from_secs(1)).await;
        assert!(matches!(err, Err(ToolError::Timeout { seconds: 1, .. })));
    }
}
