//! Executes a crew: one tool-calling conversation per task.
//!
//! For each task the runner:
//!
//! 1. Picks the agent (declared agent, or the manager's choice for
//!    hierarchical crews)
//! 2. Builds the agent's system prompt and the task prompt with context
//! 3. Loops model call -> tool dispatch until the model answers without
//!    tool calls, forcing a final answer after `max_iterations` rounds
//! 4. Records the output for downstream tasks
//!
//! Tool failures are fed back to the model as JSON error strings; only
//! backend failures abort the run.

use genai::chat::{ChatMessage, ChatRequest, Tool, ToolCall, ToolResponse};
use serde_json::json;

use super::logging::{now_iso, LogEntry, RunLogger};
use super::prompt::{self, DELEGATE_TOOL};
use super::{ChatBackend, ChatTurn, CrewOutput, TaskOutput, UsageMetrics};
use crate::crews::{AgentSpec, CrewSpec, Process, TaskSpec};
use crate::error::RuntimeError;
use crate::tools::Toolbox;

pub struct CrewRunner<'a, B> {
    backend: &'a B,
    toolbox: &'a Toolbox,
    model: String,
    max_iterations: usize,
    logger: Option<RunLogger>,
}

impl<'a, B: ChatBackend> CrewRunner<'a, B> {
    pub fn new(backend: &'a B, toolbox: &'a Toolbox, model: impl Into<String>, max_iterations: usize) -> Self {
        Self {
            backend,
            toolbox,
            model: model.into(),
            max_iterations: max_iterations.max(1),
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: RunLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Run every task of `spec` and return the final output with usage.
    pub async fn run(&mut self, spec: &CrewSpec) -> Result<CrewOutput, RuntimeError> {
        spec.validate(self.toolbox.catalog())?;

        let run_id = self.logger.as_ref().map(|l| l.run_id().to_string()).unwrap_or_default();
        self.log(LogEntry::RunStart {
            timestamp: now_iso(),
            run_id,
            crew: spec.name.clone(),
            model: self.model.clone(),
            process: format!("{:?}", spec.process).to_lowercase(),
        });
        tracing::info!(crew = %spec.name, tasks = spec.tasks.len(), model = %self.model, "Crew run started");

        let mut usage = UsageMetrics::default();
        let result = self.run_tasks(spec, &mut usage).await;

        let status = match &result {
            Ok(_) => "completed".to_string(),
            Err(e) => {
                let task_id = match e {
                    RuntimeError::TaskFailed { task, .. } => Some(task.clone()),
                    _ => None,
                };
                self.log(LogEntry::Error {
                    timestamp: now_iso(),
                    task_id,
                    message: e.to_string(),
                });
                "failed".to_string()
            }
        };
        self.log(LogEntry::RunEnd {
            timestamp: now_iso(),
            status,
            total_tokens: usage.total_tokens,
            successful_requests: usage.successful_requests,
        });

        let tasks = result?;
        let final_output = tasks.last().map(|t| t.output.clone()).unwrap_or_default();
        tracing::info!(
            crew = %spec.name,
            total_tokens = usage.total_tokens,
            requests = usage.successful_requests,
            "Crew run completed"
        );

        Ok(CrewOutput {
            crew: spec.name.clone(),
            final_output,
            tasks,
            usage,
        })
    }

    async fn run_tasks(&mut self, spec: &CrewSpec, usage: &mut UsageMetrics) -> Result<Vec<TaskOutput>, RuntimeError> {
        let mut outputs: Vec<TaskOutput> = Vec::new();

        for task in &spec.tasks {
            let agent = match spec.process {
                Process::Sequential => declared_agent(spec, task)?,
                Process::Hierarchical => self.pick_agent(spec, task, usage).await?,
            };

            self.log(LogEntry::TaskStart {
                timestamp: now_iso(),
                task_id: task.id.clone(),
                agent: agent.id.clone(),
            });
            tracing::info!(task = %task.id, agent = %agent.role, "Task started");

            let context = task_context(spec.process, task, &outputs);
            let memory: Vec<&TaskOutput> = if agent.memory {
                outputs
                    .iter()
                    .filter(|o| o.agent_id == agent.id)
                    .filter(|o| !context.iter().any(|c| c.task_id == o.task_id))
                    .collect()
            } else {
                Vec::new()
            };

            let output = self
                .execute_task(spec, agent, task, &context, &memory, usage)
                .await?;

            self.log(LogEntry::TaskEnd {
                timestamp: now_iso(),
                task_id: task.id.clone(),
                output: output.clone(),
            });

            outputs.push(TaskOutput {
                task_id: task.id.clone(),
                agent_id: agent.id.clone(),
                agent_role: agent.role.clone(),
                output,
            });
        }

        Ok(outputs)
    }

    async fn execute_task(
        &mut self,
        spec: &CrewSpec,
        agent: &AgentSpec,
        task: &TaskSpec,
        context: &[&TaskOutput],
        memory: &[&TaskOutput],
        usage: &mut UsageMetrics,
    ) -> Result<String, RuntimeError> {
        let toolbox = self.toolbox;
        let catalog = toolbox.catalog();
        let coworkers: Vec<&AgentSpec> = if agent.allow_delegation {
            spec.agents.iter().filter(|a| a.id != agent.id).collect()
        } else {
            Vec::new()
        };

        let system = prompt::agent_system_prompt(agent, &catalog.descriptions(&agent.tools), &coworkers);
        let mut tools = catalog.define_tools(&agent.tools);
        if !coworkers.is_empty() {
            tools.push(delegate_tool());
        }

        let mut chat_req = ChatRequest::from_system(system)
            .append_message(ChatMessage::user(prompt::task_prompt(task, context, memory)));
        if !tools.is_empty() {
            chat_req = chat_req.with_tools(tools);
        }

        for _ in 0..self.max_iterations {
            let turn = self.call_model(task, chat_req.clone(), usage).await?;

            if turn.tool_calls.is_empty() {
                return final_answer(task, turn);
            }

            chat_req = chat_req.append_message(ChatMessage::from(turn.tool_calls.clone()));
            for call in &turn.tool_calls {
                let result = self.handle_tool_call(task, agent, &coworkers, call, usage).await?;
                chat_req = chat_req.append_message(ToolResponse::new(call.call_id.clone(), result));
            }
        }

        tracing::warn!(task = %task.id, max = self.max_iterations, "Tool budget exhausted, forcing final answer");
        chat_req.tools = None;
        chat_req = chat_req.append_message(ChatMessage::user(prompt::FORCE_FINAL_ANSWER));
        let turn = self.call_model(task, chat_req, usage).await?;
        final_answer(task, turn)
    }

    async fn handle_tool_call(
        &mut self,
        task: &TaskSpec,
        agent: &AgentSpec,
        coworkers: &[&AgentSpec],
        call: &ToolCall,
        usage: &mut UsageMetrics,
    ) -> Result<String, RuntimeError> {
        self.log(LogEntry::ToolCall {
            timestamp: now_iso(),
            task_id: task.id.clone(),
            call_id: call.call_id.clone(),
            fn_name: call.fn_name.clone(),
            fn_arguments: call.fn_arguments.clone(),
        });
        tracing::info!(task = %task.id, tool = %call.fn_name, "Tool call");

        let result = if call.fn_name == DELEGATE_TOOL && !coworkers.is_empty() {
            self.delegate(task, coworkers, call, usage).await?
        } else if agent.tools.iter().any(|t| *t == call.fn_name) {
            self.toolbox.dispatch(&call.fn_name, &call.fn_arguments).await
        } else {
            json!({"error": format!("Tool `{}` is not available to {}", call.fn_name, agent.role)})
                .to_string()
        };

        self.log(LogEntry::ToolResult {
            timestamp: now_iso(),
            task_id: task.id.clone(),
            call_id: call.call_id.clone(),
            fn_name: call.fn_name.clone(),
            result: result.clone(),
        });
        Ok(result)
    }

    /// Ask a coworker one question, without tools.
    async fn delegate(
        &mut self,
        task: &TaskSpec,
        coworkers: &[&AgentSpec],
        call: &ToolCall,
        usage: &mut UsageMetrics,
    ) -> Result<String, RuntimeError> {
        let arg = |name: &str| {
            call.fn_arguments
                .get(name)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        let (who, question, context) = (arg("coworker"), arg("question"), arg("context"));

        if question.trim().is_empty() {
            return Ok(json!({"error": format!("{DELEGATE_TOOL}: missing 'question' argument")}).to_string());
        }
        let candidates: Vec<AgentSpec> = coworkers.iter().map(|a| (*a).clone()).collect();
        let Some(coworker) = prompt::parse_agent_choice(&who, &candidates) else {
            let names: Vec<&str> = coworkers.iter().map(|c| c.role.as_str()).collect();
            return Ok(json!({
                "error": format!("{DELEGATE_TOOL}: unknown coworker '{who}'. Choose one of: {}", names.join(", "))
            })
            .to_string());
        };

        tracing::info!(task = %task.id, coworker = %coworker.role, "Delegating question");
        let req = ChatRequest::from_system(prompt::coworker_system_prompt(coworker))
            .append_message(ChatMessage::user(prompt::delegation_prompt(&question, &context)));
        let turn = self.call_model(task, req, usage).await?;
        Ok(turn.text.unwrap_or_default())
    }

    /// Ask the manager which agent should take `task`. Unusable replies fall
    /// back to the task's declared agent.
    async fn pick_agent<'s>(
        &mut self,
        spec: &'s CrewSpec,
        task: &TaskSpec,
        usage: &mut UsageMetrics,
    ) -> Result<&'s AgentSpec, RuntimeError> {
        let req = ChatRequest::from_system(prompt::MANAGER_SYSTEM_PROMPT)
            .append_message(ChatMessage::user(prompt::manager_prompt(spec, task)));
        let turn = self.call_model(task, req, usage).await?;
        let reply = turn.text.unwrap_or_default();

        match prompt::parse_agent_choice(&reply, &spec.agents) {
            Some(agent) => {
                tracing::info!(task = %task.id, agent = %agent.id, "Manager assigned task");
                Ok(agent)
            }
            None => {
                tracing::info!(task = %task.id, reply = %reply, "Manager reply not recognised, using declared agent");
                declared_agent(spec, task)
            }
        }
    }

    async fn call_model(
        &mut self,
        task: &TaskSpec,
        request: ChatRequest,
        usage: &mut UsageMetrics,
    ) -> Result<ChatTurn, RuntimeError> {
        let turn = self
            .backend
            .complete(&self.model, request)
            .await
            .map_err(|e| RuntimeError::TaskFailed {
                task: task.id.clone(),
                message: e.to_string(),
            })?;
        usage.record(&turn.usage);
        Ok(turn)
    }

    fn log(&mut self, entry: LogEntry) {
        if let Some(logger) = self.logger.as_mut() {
            if let Err(e) = logger.log_event(&entry) {
                tracing::warn!("Failed to write run log: {e}");
            }
        }
    }
}

fn declared_agent<'s>(spec: &'s CrewSpec, task: &TaskSpec) -> Result<&'s AgentSpec, RuntimeError> {
    spec.agent(&task.agent).ok_or_else(|| RuntimeError::TaskFailed {
        task: task.id.clone(),
        message: format!("unknown agent `{}`", task.agent),
    })
}

/// Upstream outputs for `task`: its declared context, or in a sequential
/// crew the previous task's output when nothing is declared.
fn task_context<'o>(process: Process, task: &TaskSpec, outputs: &'o [TaskOutput]) -> Vec<&'o TaskOutput> {
    if task.context.is_empty() {
        return match process {
            Process::Sequential => outputs.last().into_iter().collect(),
            Process::Hierarchical => Vec::new(),
        };
    }
    task.context
        .iter()
        .filter_map(|id| outputs.iter().find(|o| &o.task_id == id))
        .collect()
}

fn final_answer(task: &TaskSpec, turn: ChatTurn) -> Result<String, RuntimeError> {
    match turn.text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(RuntimeError::TaskFailed {
            task: task.id.clone(),
            message: "model returned an empty answer".into(),
        }),
    }
}

fn delegate_tool() -> Tool {
    Tool::new(DELEGATE_TOOL)
        .with_description(
            "Ask a coworker in your crew a question. They answer from their own expertise \
             without using tools.",
        )
        .with_schema(json!({
            "type": "object",
            "properties": {
                "coworker": {
                    "type": "string",
                    "description": "Role of the coworker to ask"
                },
                "question": {
                    "type": "string",
                    "description": "The question, with everything they need to answer it"
                },
                "context": {
                    "type": "string",
                    "description": "Optional background material"
                }
            },
            "required": ["coworker", "question"]
        }))
}
