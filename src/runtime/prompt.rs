//! Prompt text for agents, tasks and the hierarchical manager.

use crate::crews::{AgentSpec, CrewSpec, TaskSpec};

use super::TaskOutput;

/// Name of the built-in tool that lets an agent ask a coworker.
pub const DELEGATE_TOOL: &str = "delegate_work";

pub const FORCE_FINAL_ANSWER: &str = "You have used all your tool calls for this task. \
     Do not call any more tools. Reply now with your best final answer based on what you have.";

/// System prompt for an agent working on a task.
pub fn agent_system_prompt(agent: &AgentSpec, tool_descriptions: &str, coworkers: &[&AgentSpec]) -> String {
    let tools = if tool_descriptions.is_empty() {
        "You have no tools. Work from your own knowledge and the context you are given.".to_string()
    } else {
        tool_descriptions.to_string()
    };

    let mut prompt = format!(
        "\
You are {role}.
{backstory}

Your personal goal is: {goal}

## Available Tools
{tools}",
        role = agent.role,
        backstory = agent.backstory,
        goal = agent.goal,
    );

    if !coworkers.is_empty() {
        prompt.push_str(&format!(
            "\n\n## Coworkers\nYou can ask one of these coworkers a question with the `{DELEGATE_TOOL}` tool:"
        ));
        for c in coworkers {
            prompt.push_str(&format!("\n- {}: {}", c.role, c.goal));
        }
    }

    prompt.push_str(
        "\n\n## Instructions\n\
         Work step by step. Call a tool whenever you need facts you do not have; never invent \
         tool output. When you are done, reply with your final answer only, without calling any tool.",
    );
    prompt
}

/// System prompt for a coworker answering a delegated question.
pub fn coworker_system_prompt(agent: &AgentSpec) -> String {
    format!(
        "You are {}.\n{}\n\nYour personal goal is: {}\n\nA coworker is asking for your help. \
         Answer their question directly and completely.",
        agent.role, agent.backstory, agent.goal
    )
}

/// User message for a task, including upstream outputs and the agent's own
/// earlier work.
pub fn task_prompt(task: &TaskSpec, context: &[&TaskOutput], memory: &[&TaskOutput]) -> String {
    let mut prompt = format!(
        "## Task\n{}\n\n## Expected Output\n{}",
        task.description, task.expected_output
    );

    if !context.is_empty() {
        prompt.push_str("\n\n## Context\nResults from earlier tasks in this crew:");
        for out in context {
            prompt.push_str(&format!(
                "\n\n### Task `{}` ({})\n{}",
                out.task_id, out.agent_role, out.output
            ));
        }
    }

    if !memory.is_empty() {
        prompt.push_str("\n\n## Your Earlier Work");
        for out in memory {
            prompt.push_str(&format!("\n\n### Task `{}`\n{}", out.task_id, out.output));
        }
    }

    prompt
}

pub fn delegation_prompt(question: &str, context: &str) -> String {
    if context.trim().is_empty() {
        question.to_string()
    } else {
        format!("{question}\n\n## Context\n{context}")
    }
}

pub const MANAGER_SYSTEM_PROMPT: &str = "You are the manager of a crew of AI agents. \
     For each task you choose the single crew member best suited to do it. \
     Reply with the member's id only.";

/// Asks the manager which agent should take `task`.
pub fn manager_prompt(spec: &CrewSpec, task: &TaskSpec) -> String {
    let mut prompt = format!(
        "## Task\n{}\n\n## Expected Output\n{}\n\n## Crew Members",
        task.description, task.expected_output
    );
    for agent in &spec.agents {
        let tools = if agent.tools.is_empty() {
            "no tools".to_string()
        } else {
            agent.tools.join(", ")
        };
        prompt.push_str(&format!(
            "\n- id: {} | role: {} | goal: {} | tools: {}",
            agent.id, agent.role, agent.goal, tools
        ));
    }
    prompt.push_str("\n\nWhich member should do this task? Reply with the id only.");
    prompt
}

/// Match the manager's reply to an agent: an exact id or role first, then
/// the first agent whose id or role appears in the reply.
pub fn parse_agent_choice<'a>(reply: &str, agents: &'a [AgentSpec]) -> Option<&'a AgentSpec> {
    let cleaned = reply
        .trim()
        .trim_matches(|c: char| c == '`' || c == '"' || c == '\'' || c == '.')
        .trim();

    agents
        .iter()
        .find(|a| a.id.eq_ignore_ascii_case(cleaned) || a.role.eq_ignore_ascii_case(cleaned))
        .or_else(|| {
            let lower = cleaned.to_ascii_lowercase();
            agents.iter().find(|a| {
                lower.contains(&a.id.to_ascii_lowercase()) || lower.contains(&a.role.to_ascii_lowercase())
            })
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crews::Process;

    fn agents() -> Vec<AgentSpec> {
        vec![
            AgentSpec::new("market_data", "Market Data Collector", "collect", "numbers"),
            AgentSpec::new("strategist", "Trading Strategist", "decide", "trader"),
        ]
    }

    #[test]
    fn system_prompt_mentions_persona_and_tools() {
        let agent = &agents()[0];
        let prompt = agent_system_prompt(agent, "### alex_price_history\nprices", &[]);
        assert!(prompt.starts_with("You are Market Data Collector."));
        assert!(prompt.contains("Your personal goal is: collect"));
        assert!(prompt.contains("### alex_price_history"));
        assert!(!prompt.contains("## Coworkers"));
    }

    #[test]
    fn system_prompt_lists_coworkers() {
        let all = agents();
        let prompt = agent_system_prompt(&all[0], "", &[&all[1]]);
        assert!(prompt.contains("You have no tools"));
        assert!(prompt.contains("## Coworkers"));
        assert!(prompt.contains("- Trading Strategist: decide"));
    }

    #[test]
    fn task_prompt_sections() {
        let task = TaskSpec::new("analyze", "strategist", "Analyze ALEX", "A short analysis");
        let upstream = TaskOutput {
            task_id: "collect".into(),
            agent_id: "market_data".into(),
            agent_role: "Market Data Collector".into(),
            output: "price: 0.12".into(),
        };
        let prompt = task_prompt(&task, &[&upstream], &[]);
        assert!(prompt.contains("## Task\nAnalyze ALEX"));
        assert!(prompt.contains("## Expected Output\nA short analysis"));
        assert!(prompt.contains("### Task `collect` (Market Data Collector)\nprice: 0.12"));
        assert!(!prompt.contains("## Your Earlier Work"));
    }

    #[test]
    fn manager_prompt_lists_every_agent() {
        let spec = CrewSpec {
            name: "t".into(),
            process: Process::Hierarchical,
            agents: agents(),
            tasks: vec![TaskSpec::new("x", "strategist", "Do x", "x done")],
        };
        let prompt = manager_prompt(&spec, &spec.tasks[0]);
        assert!(prompt.contains("id: market_data"));
        assert!(prompt.contains("id: strategist"));
    }

    #[test]
    fn parse_choice_variants() {
        let all = agents();
        assert_eq!(parse_agent_choice("strategist", &all).unwrap().id, "strategist");
        assert_eq!(parse_agent_choice("`market_data`.", &all).unwrap().id, "market_data");
        assert_eq!(
            parse_agent_choice("trading strategist", &all).unwrap().id,
            "strategist"
        );
        assert_eq!(
            parse_agent_choice("I would pick market_data for this.", &all).unwrap().id,
            "market_data"
        );
        assert!(parse_agent_choice("nobody", &all).is_none());
    }
}
