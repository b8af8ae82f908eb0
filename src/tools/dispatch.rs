//! Tool dispatch.
//!
//! [`Toolbox::dispatch`] routes a tool call to the script runner, the
//! Clarinet wrapper or the Stacks API client. It always returns a `String`:
//! the tool's output on success, or a JSON object `{"error": ...}` the model
//! can read and react to. It never panics or returns `Err`.

use serde_json::{json, Value};

use super::catalog::{ApiOp, ClarinetOp, ToolCatalog, ToolKind};
use super::hiro::HiroClient;
use crate::exec::{ClarinetRunner, CommandResult, ScriptRunner};
use crate::guard::ProjectGuard;

pub struct Toolbox {
    catalog: ToolCatalog,
    scripts: ScriptRunner,
    clarinet: ClarinetRunner,
    api: HiroClient,
}

impl Toolbox {
    pub fn new(catalog: ToolCatalog, scripts: ScriptRunner, clarinet: ClarinetRunner, api: HiroClient) -> Self {
        Self {
            catalog,
            scripts,
            clarinet,
            api,
        }
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Run the named tool with a JSON argument object.
    pub async fn dispatch(&self, name: &str, args: &Value) -> String {
        let Some(spec) = self.catalog.get(name) else {
            return json!({"error": format!("Unknown tool: {name}")}).to_string();
        };

        let values = match spec.extract_args(args) {
            Ok(values) => values,
            Err(e) => return json!({"error": format!("{name}: {e}")}).to_string(),
        };

        tracing::info!(tool = name, "Dispatching tool call");
        match spec.kind {
            ToolKind::Script(script) => {
                let result = self
                    .scripts
                    .run_script(script, values.first().map(String::as_str))
                    .await;
                render_command(name, &result)
            }
            ToolKind::Clarinet(op) => self.dispatch_clarinet(name, op, &values).await,
            ToolKind::Api(op) => self.dispatch_api(name, op, &values).await,
        }
    }

    /// Run the named tool with positional arguments (CLI entry point).
    pub async fn invoke(&self, name: &str, positional: &[String]) -> String {
        let Some(spec) = self.catalog.get(name) else {
            return json!({"error": format!("Unknown tool: {name}")}).to_string();
        };
        match spec.positional_args(positional) {
            Ok(args) => self.dispatch(name, &args).await,
            Err(e) => json!({"error": format!("{name}: {e}")}).to_string(),
        }
    }

    async fn dispatch_clarinet(&self, name: &str, op: ClarinetOp, values: &[String]) -> String {
        let project = values[0].as_str();
        match op {
            ClarinetOp::NewProject => render_command(name, &self.clarinet.new_project(project).await),
            ClarinetOp::AddContract => {
                render_command(name, &self.clarinet.add_contract(project, &values[1]).await)
            }
            ClarinetOp::Check => render_command(name, &self.clarinet.check(project).await),
            ClarinetOp::WriteContract => self.write_contract(name, project, &values[1], &values[2]).await,
        }
    }

    async fn write_contract(&self, name: &str, project: &str, contract: &str, source: &str) -> String {
        if !self.clarinet.project_dir(project).is_dir() {
            return json!({"error": format!("{name}: project `{project}` does not exist")}).to_string();
        }

        let relative = ClarinetRunner::contract_path(project, contract);
        let target = ProjectGuard::new(self.clarinet.projects_dir())
            .map_err(crate::error::ArgumentError::from)
            .and_then(|guard| guard.resolve_write(&relative));
        let target = match target {
            Ok(path) => path,
            Err(e) => return json!({"error": format!("{name}: {e}")}).to_string(),
        };

        match tokio::fs::write(&target, source).await {
            Ok(()) => json!({
                "written_bytes": source.len(),
                "path": relative.to_string_lossy(),
            })
            .to_string(),
            Err(e) => json!({"error": format!("{name}: {e}")}).to_string(),
        }
    }

    async fn dispatch_api(&self, name: &str, op: ApiOp, values: &[String]) -> String {
        let result = match op {
            ApiOp::ContractSource => self.api.contract_source(&values[0]).await,
            ApiOp::AccountBalances => self
                .api
                .account_balances(&values[0])
                .await
                .map(|v| serde_json::to_string_pretty(&v).unwrap_or_else(|_| v.to_string())),
        };
        match result {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(tool = name, "API call failed: {e}");
                json!({"error": format!("{name}: {e}")}).to_string()
            }
        }
    }
}

/// Tool-facing rendering of a subprocess result.
fn render_command(name: &str, result: &CommandResult) -> String {
    if result.succeeded {
        if result.stdout.trim().is_empty() {
            json!({"ok": true}).to_string()
        } else {
            result.stdout.clone()
        }
    } else {
        json!({
            "error": format!("{name}: {}", result.error),
            "exit_code": result.exit_code,
            "timed_out": result.timed_out,
        })
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_toolbox(tmp: &TempDir) -> Toolbox {
        let scripts_dir = tmp.path().join("agent-tools-ts");
        std::fs::create_dir_all(scripts_dir.join("src/stacks-wallet")).unwrap();
        std::fs::write(
            scripts_dir.join("src/stacks-wallet/get-transaction-status.ts"),
            "echo \"status of $1\"\n",
        )
        .unwrap();
        std::fs::write(
            scripts_dir.join("src/stacks-wallet/get-my-wallet-balance.ts"),
            "echo 'no wallet configured' >&2\nexit 2\n",
        )
        .unwrap();

        Toolbox::new(
            ToolCatalog::builtin(),
            ScriptRunner::new("sh", vec![], scripts_dir, None),
            ClarinetRunner::new("clarinet-not-installed", tmp.path().join("projects"), None),
            HiroClient::new("http://127.0.0.1:9"),
        )
    }

    #[tokio::test]
    async fn script_tool_passes_single_argument() {
        let tmp = TempDir::new().unwrap();
        let toolbox = make_toolbox(&tmp);
        let tx = "c".repeat(64);

        let out = toolbox
            .dispatch("stacks_transaction_status", &json!({"tx_id": tx}))
            .await;
        assert_eq!(out.trim(), format!("status of {tx}"));
    }

    #[tokio::test]
    async fn failing_script_reports_stderr_and_code() {
        let tmp = TempDir::new().unwrap();
        let toolbox = make_toolbox(&tmp);

        let out = toolbox.dispatch("wallet_get_my_balance", &json!({})).await;
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert!(parsed["error"].as_str().unwrap().contains("no wallet configured"));
        assert_eq!(parsed["exit_code"], 2);
    }

    #[tokio::test]
    async fn missing_script_is_an_error_not_a_panic() {
        let tmp = TempDir::new().unwrap();
        let toolbox = make_toolbox(&tmp);

        let out = toolbox.dispatch("bitflow_available_tokens", &json!({})).await;
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert!(parsed["error"].as_str().unwrap().contains("script not found"));
    }

    #[tokio::test]
    async fn invalid_argument_never_reaches_the_script() {
        let tmp = TempDir::new().unwrap();
        let toolbox = make_toolbox(&tmp);

        let out = toolbox
            .dispatch("stacks_transaction_status", &json!({"tx_id": "; rm -rf /"}))
            .await;
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert!(parsed["error"].as_str().unwrap().contains("Invalid tx_id"));
    }

    #[tokio::test]
    async fn unknown_tool() {
        let tmp = TempDir::new().unwrap();
        let toolbox = make_toolbox(&tmp);

        let out = toolbox.dispatch("nonexistent_tool", &json!({})).await;
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert!(parsed["error"]
            .as_str()
            .unwrap()
            .contains("Unknown tool: nonexistent_tool"));
    }

    #[tokio::test]
    async fn write_contract_into_existing_project() {
        let tmp = TempDir::new().unwrap();
        let toolbox = make_toolbox(&tmp);
        std::fs::create_dir_all(tmp.path().join("projects/demo")).unwrap();

        let source = "(define-read-only (get-one) (ok u1))";
        let out = toolbox
            .dispatch(
                "clarinet_write_contract",
                &json!({"project": "demo", "contract": "one", "source": source}),
            )
            .await;
        let parsed: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["written_bytes"], source.len());

        let written =
            std::fs::read_to_string(tmp.path().join("projects/demo/contracts/one.clar")).unwrap();
        assert_eq!(written, source);
    }

    #[tokio::test]
    async fn write_contract_requires_project() {
        let tmp = TempDir::new().unwrap();
        let toolbox = make_toolbox(&tmp);

        let out = toolbox
            .dispatch(
                "clarinet_write_contract",
                &json!({"project": "ghost", "contract": "one", "source": "(ok u1)"}),
            )
            .await;
        assert!(out.contains("does not exist"));
    }

    #[tokio::test]
    async fn invoke_maps_positional_arguments() {
        let tmp = TempDir::new().unwrap();
        let toolbox = make_toolbox(&tmp);
        let tx = "d".repeat(64);

        let out = toolbox
            .invoke("stacks_transaction_status", &[tx.clone()])
            .await;
        assert!(out.contains(&tx));
    }
}
