use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser;

use aibtc_crew::cli::{Cli, Commands};
use aibtc_crew::config;
use aibtc_crew::context::AppContext;
use aibtc_crew::crews::CrewInputs;
use aibtc_crew::report;
use aibtc_crew::runtime::{CrewRunner, GenaiBackend, RunLogger};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr so command output on stdout stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_config(&cli)?;
    let ctx = AppContext::new(config);

    match cli.command {
        Commands::Crews => {
            println!("{}", report::format_crews(&ctx.registry));
        }
        Commands::Tools => {
            println!("{}", report::format_tools(&ctx.catalog));
        }
        Commands::Tool { name, args } => {
            let output = ctx.toolbox.invoke(&name, &args).await;
            println!("{}", report::format_tool_output(&output));
            if report::is_error_output(&output) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Run {
            crew,
            input,
            dry_run,
        } => {
            let inputs: CrewInputs = input.into_iter().collect();
            let descriptor = ctx.registry.require(&crew)?;
            let spec = descriptor
                .assemble(&inputs)
                .with_context(|| format!("Failed to assemble crew `{}`", descriptor.id))?;

            if dry_run {
                println!("{}", serde_json::to_string_pretty(&spec)?);
                return Ok(ExitCode::SUCCESS);
            }

            let backend = GenaiBackend::default();
            let mut runner = CrewRunner::new(
                &backend,
                &ctx.toolbox,
                ctx.config.model.clone(),
                ctx.config.max_iterations,
            );
            match RunLogger::new(&ctx.config.log_dir) {
                Ok(logger) => {
                    tracing::info!(path = %logger.log_path().display(), "Run log opened");
                    runner = runner.with_logger(logger);
                }
                Err(e) => tracing::warn!("Running without a run log: {e}"),
            }

            let output = runner.run(&spec).await?;
            println!("{}", report::format_crew_output(&output));
        }
    }

    Ok(ExitCode::SUCCESS)
}
