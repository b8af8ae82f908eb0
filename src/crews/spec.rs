//! Declarative agent, task and crew records.
//!
//! These are plain data: the runtime in [`crate::runtime`] decides how they
//! are executed.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CrewError;
use crate::tools::ToolCatalog;

/// An LLM persona and the tools it may call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    pub id: String,
    pub role: String,
    pub goal: String,
    pub backstory: String,
    #[serde(default)]
    pub tools: Vec<String>,
    /// Show the agent its own earlier task outputs.
    #[serde(default)]
    pub memory: bool,
    /// Let the agent hand questions to coworkers in the same crew.
    #[serde(default)]
    pub allow_delegation: bool,
}

impl AgentSpec {
    pub fn new(id: &str, role: &str, goal: &str, backstory: &str) -> Self {
        Self {
            id: id.to_string(),
            role: role.to_string(),
            goal: goal.to_string(),
            backstory: backstory.to_string(),
            tools: Vec::new(),
            memory: false,
            allow_delegation: false,
        }
    }

    pub fn with_tools(mut self, tools: &[&str]) -> Self {
        self.tools = tools.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn with_memory(mut self) -> Self {
        self.memory = true;
        self
    }

    pub fn with_delegation(mut self) -> Self {
        self.allow_delegation = true;
        self
    }
}

/// A unit of work assigned to one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: String,
    pub description: String,
    pub expected_output: String,
    /// Id of the agent that performs the task.
    pub agent: String,
    /// Ids of earlier tasks whose output this task receives.
    #[serde(default)]
    pub context: Vec<String>,
}

impl TaskSpec {
    pub fn new(id: &str, agent: &str, description: impl Into<String>, expected_output: impl Into<String>) -> Self {
        Self {
            id: id.to_string(),
            description: description.into(),
            expected_output: expected_output.into(),
            agent: agent.to_string(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, tasks: &[&str]) -> Self {
        self.context = tasks.iter().map(|t| t.to_string()).collect();
        self
    }
}

/// How the runtime assigns tasks to agents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Process {
    /// Tasks run in order, each by its declared agent.
    #[default]
    Sequential,
    /// A manager picks the agent for each task.
    Hierarchical,
}

/// A fully assembled crew, ready to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewSpec {
    pub name: String,
    #[serde(default)]
    pub process: Process,
    pub agents: Vec<AgentSpec>,
    pub tasks: Vec<TaskSpec>,
}

impl CrewSpec {
    pub fn agent(&self, id: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// Check that the crew is well formed: ids and roles are non-blank, ids
    /// are unique, tasks name existing agents, context only points
    /// backwards, tools exist.
    pub fn validate(&self, catalog: &ToolCatalog) -> Result<(), CrewError> {
        if self.tasks.is_empty() {
            return Err(CrewError::NoTasks(self.name.clone()));
        }

        let mut agent_ids = HashSet::new();
        for agent in &self.agents {
            // A blank id or role would match any manager or delegation reply.
            if agent.id.trim().is_empty() {
                return Err(CrewError::BlankField { kind: "agent", field: "id" });
            }
            if agent.role.trim().is_empty() {
                return Err(CrewError::BlankField { kind: "agent", field: "role" });
            }
            if !agent_ids.insert(agent.id.as_str()) {
                return Err(CrewError::DuplicateId {
                    kind: "agent",
                    id: agent.id.clone(),
                });
            }
            if let Some(tool) = agent.tools.iter().find(|t| !catalog.contains(t)) {
                return Err(CrewError::UnknownTool {
                    agent: agent.id.clone(),
                    tool: tool.clone(),
                });
            }
        }

        let mut seen_tasks = HashSet::new();
        for task in &self.tasks {
            if task.id.trim().is_empty() {
                return Err(CrewError::BlankField { kind: "task", field: "id" });
            }
            if !agent_ids.contains(task.agent.as_str()) {
                return Err(CrewError::UnknownAgent {
                    task: task.id.clone(),
                    agent: task.agent.clone(),
                });
            }
            if let Some(ctx) = task.context.iter().find(|c| !seen_tasks.contains(c.as_str())) {
                return Err(CrewError::UnknownContextTask {
                    task: task.id.clone(),
                    context: ctx.clone(),
                });
            }
            if !seen_tasks.insert(task.id.as_str()) {
                return Err(CrewError::DuplicateId {
                    kind: "task",
                    id: task.id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crew() -> CrewSpec {
        CrewSpec {
            name: "test".into(),
            process: Process::Sequential,
            agents: vec![
                AgentSpec::new("a", "Analyst", "analyze", "knows things")
                    .with_tools(&["fetch_contract_source"]),
            ],
            tasks: vec![
                TaskSpec::new("one", "a", "fetch", "source"),
                TaskSpec::new("two", "a", "review", "report").with_context(&["one"]),
            ],
        }
    }

    #[test]
    fn well_formed_crew_validates() {
        assert!(crew().validate(&ToolCatalog::builtin()).is_ok());
    }

    #[test]
    fn unknown_tool_is_rejected() {
        let mut c = crew();
        c.agents[0].tools.push("launch_rockets".into());
        assert!(matches!(
            c.validate(&ToolCatalog::builtin()),
            Err(CrewError::UnknownTool { .. })
        ));
    }

    #[test]
    fn context_must_point_backwards() {
        let mut c = crew();
        c.tasks[0].context = vec!["two".into()];
        assert!(matches!(
            c.validate(&ToolCatalog::builtin()),
            Err(CrewError::UnknownContextTask { .. })
        ));
    }

    #[test]
    fn task_agent_must_exist() {
        let mut c = crew();
        c.tasks[1].agent = "ghost".into();
        assert!(matches!(
            c.validate(&ToolCatalog::builtin()),
            Err(CrewError::UnknownAgent { .. })
        ));
    }

    #[test]
    fn duplicate_task_ids_are_rejected() {
        let mut c = crew();
        c.tasks[1].id = "one".into();
        c.tasks[1].context.clear();
        assert!(matches!(
            c.validate(&ToolCatalog::builtin()),
            Err(CrewError::DuplicateId { kind: "task", .. })
        ));
    }

    #[test]
    fn blank_ids_and_roles_are_rejected() {
        let mut c = crew();
        c.agents[0].id = " ".into();
        assert!(matches!(
            c.validate(&ToolCatalog::builtin()),
            Err(CrewError::BlankField { kind: "agent", field: "id" })
        ));

        let mut c = crew();
        c.agents[0].role.clear();
        assert!(matches!(
            c.validate(&ToolCatalog::builtin()),
            Err(CrewError::BlankField { kind: "agent", field: "role" })
        ));

        let mut c = crew();
        c.tasks[0].id.clear();
        c.tasks[1].context.clear();
        assert!(matches!(
            c.validate(&ToolCatalog::builtin()),
            Err(CrewError::BlankField { kind: "task", field: "id" })
        ));
    }

    #[test]
    fn empty_crew_is_rejected() {
        let mut c = crew();
        c.tasks.clear();
        assert!(matches!(
            c.validate(&ToolCatalog::builtin()),
            Err(CrewError::NoTasks(_))
        ));
    }

    #[test]
    fn process_serializes_lowercase() {
        let json = serde_json::to_string(&Process::Hierarchical).unwrap();
        assert_eq!(json, "\"hierarchical\"");
    }
}
