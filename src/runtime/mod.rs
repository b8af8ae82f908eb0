//! The crew runtime.
//!
//! [`runner::CrewRunner`] executes a [`crate::crews::CrewSpec`] task by task
//! against a [`ChatBackend`], dispatching tool calls through the
//! [`crate::tools::Toolbox`]. The backend is a trait so the runner can be
//! driven by [`testing::ScriptedBackend`] in tests and by
//! [`backend::GenaiBackend`] for real runs.

pub mod backend;
pub mod logging;
pub mod prompt;
pub mod runner;
pub mod testing;

use std::future::Future;

use genai::chat::{ChatRequest, ToolCall};
use serde::Serialize;

use crate::error::RuntimeError;

pub use backend::GenaiBackend;
pub use logging::RunLogger;
pub use runner::CrewRunner;

/// Token counts reported for a single model call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TurnUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// What the model produced for one request.
#[derive(Debug, Clone, Default)]
pub struct ChatTurn {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub usage: TurnUsage,
}

/// A chat model the runner can talk to.
pub trait ChatBackend: Send + Sync {
    fn complete(
        &self,
        model: &str,
        request: ChatRequest,
    ) -> impl Future<Output = Result<ChatTurn, RuntimeError>> + Send;
}

/// Usage summed over every model call in a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageMetrics {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    pub successful_requests: u64,
}

impl UsageMetrics {
    pub fn record(&mut self, usage: &TurnUsage) {
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
        self.total_tokens += usage.prompt_tokens + usage.completion_tokens;
        self.successful_requests += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskOutput {
    pub task_id: String,
    pub agent_id: String,
    pub agent_role: String,
    pub output: String,
}

/// Result of a whole crew run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrewOutput {
    pub crew: String,
    /// Output of the last task.
    pub final_output: String,
    pub tasks: Vec<TaskOutput>,
    pub usage: UsageMetrics,
}
