use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

use super::{ResearchTool, ToolResult};

/// Name the loop watches for to end research
pub const FINISH_TOOL: &str = "finish";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FinishArgs {
    /// A summary of what was accomplished in this agent execution
    pub summary: String,
}

/// Termination signal: echoes the summary back with no side effects
pub struct Finish;

#[async_trait]
impl ResearchTool for Finish {
    type Args = FinishArgs;

    fn name(&self) -> &'static str {
        FINISH_TOOL
    }

    fn description(&self) -> &'static str {
        "Indicate that the task is complete and return a summary of what was accomplished. \
         Use this when you have finished all required actions."
    }

    async fn call(&self, args: FinishArgs) -> ToolResult {
        ToolResult::success(json!({
            "status": "completed",
            "action": "finish",
            "summary": args.summary,
        }))
    }
}
