//! Plain-text rendering for the CLI.

use std::fmt::Write;

use crate::crews::CrewRegistry;
use crate::runtime::CrewOutput;
use crate::tools::ToolCatalog;

/// Pretty-print a tool result: JSON is indented, anything else passes
/// through unchanged.
pub fn format_tool_output(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw.trim()) {
        Ok(value) if value.is_object() || value.is_array() => {
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw.to_string())
        }
        _ => raw.trim_end().to_string(),
    }
}

/// Whether a tool result is the `{"error": ...}` shape.
pub fn is_error_output(raw: &str) -> bool {
    serde_json::from_str::<serde_json::Value>(raw.trim())
        .ok()
        .is_some_and(|v| v.get("error").is_some())
}

pub fn format_crew_output(output: &CrewOutput) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", output.crew);
    for task in &output.tasks {
        let _ = writeln!(out, "\n--- {} ({}) ---\n{}", task.task_id, task.agent_role, task.output.trim_end());
    }
    let _ = writeln!(out, "\n== Final output ==\n{}", output.final_output.trim_end());
    let usage = &output.usage;
    let _ = write!(
        out,
        "\nUsage: {} requests, {} tokens ({} prompt, {} completion)",
        usage.successful_requests, usage.total_tokens, usage.prompt_tokens, usage.completion_tokens
    );
    out
}

pub fn format_crews(registry: &CrewRegistry) -> String {
    let mut out = String::new();
    for crew in registry.iter() {
        let _ = writeln!(out, "{}  {} [{}]", crew.id, crew.name, crew.source);
        if !crew.description.is_empty() {
            let _ = writeln!(out, "    {}", crew.description);
        }
        for field in &crew.input_fields {
            let flag = if field.required { "required" } else { "optional" };
            let _ = writeln!(out, "    -i {}=...  {} ({flag})", field.name, field.label);
        }
    }
    if !registry.skipped().is_empty() {
        let _ = writeln!(out, "\nSkipped:");
        for skipped in registry.skipped() {
            let _ = writeln!(out, "  {}: {}", skipped.source, skipped.reason);
        }
    }
    out.trim_end().to_string()
}

pub fn format_tools(catalog: &ToolCatalog) -> String {
    let mut out = String::new();
    for tool in catalog.iter() {
        let params: Vec<&str> = tool.params.iter().map(|p| p.name).collect();
        if params.is_empty() {
            let _ = writeln!(out, "{}", tool.name);
        } else {
            let _ = writeln!(out, "{} <{}>", tool.name, params.join("> <"));
        }
        let _ = writeln!(out, "    {}", tool.description);
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{TaskOutput, UsageMetrics};

    #[test]
    fn json_tool_output_is_indented() {
        let pretty = format_tool_output(r#"{"ok":true}"#);
        assert_eq!(pretty, "{\n  \"ok\": true\n}");
        assert_eq!(format_tool_output("plain text\n"), "plain text");
        assert_eq!(format_tool_output("42"), "42");
    }

    #[test]
    fn error_output_detection() {
        assert!(is_error_output(r#"{"error":"boom"}"#));
        assert!(!is_error_output(r#"{"ok":true}"#));
        assert!(!is_error_output("error: not json"));
    }

    #[test]
    fn crew_output_includes_usage() {
        let output = CrewOutput {
            crew: "Wallet Summary".into(),
            final_output: "All good".into(),
            tasks: vec![TaskOutput {
                task_id: "summarize".into(),
                agent_id: "wallet".into(),
                agent_role: "Wallet Manager".into(),
                output: "All good".into(),
            }],
            usage: UsageMetrics {
                prompt_tokens: 7,
                completion_tokens: 3,
                total_tokens: 10,
                successful_requests: 1,
            },
        };
        let text = format_crew_output(&output);
        assert!(text.starts_with("== Wallet Summary =="));
        assert!(text.contains("--- summarize (Wallet Manager) ---"));
        assert!(text.ends_with("Usage: 1 requests, 10 tokens (7 prompt, 3 completion)"));
    }

    #[test]
    fn listings_name_every_entry() {
        let catalog = ToolCatalog::builtin();
        let tools = format_tools(&catalog);
        assert!(tools.contains("stacks_transaction_status <tx_id>"));
        assert!(tools.contains("clarinet_write_contract <project> <contract> <source>"));

        let registry = CrewRegistry::discover(None, &catalog);
        let crews = format_crews(&registry);
        for id in registry.ids() {
            assert!(crews.contains(id));
        }
        assert!(crews.contains("-i tx_id=..."));
    }
}
