use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "aibtc-crew",
    version,
    about = "Run crews of AI agents against Stacks blockchain tools"
)]
pub struct Cli {
    /// Workspace directory (holds aibtc-crew.toml, crews/, logs/)
    #[arg(short, long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Path to config file (replaces the workspace aibtc-crew.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// LLM model name (e.g., "gpt-4o-mini", "claude-3-5-haiku-latest")
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered crews and their inputs
    Crews,
    /// List the tool catalog
    Tools,
    /// Run a single tool and print its result
    Tool {
        /// Tool name, as listed by `tools`
        name: String,
        /// Positional arguments, in the tool's parameter order
        args: Vec<String>,
    },
    /// Assemble and run a crew
    Run {
        /// Crew id or name
        crew: String,

        /// Crew input as key=value (repeatable)
        #[arg(short, long = "input", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        input: Vec<(String, String)>,

        /// Print the assembled crew as JSON instead of running it
        #[arg(long)]
        dry_run: bool,
    },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in `{raw}`"));
    }
    Ok((key.to_string(), value.to_string()))
}
