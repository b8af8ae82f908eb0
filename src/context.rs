//! Everything a command handler needs, built once per invocation from the
//! resolved configuration.

use std::time::Duration;

use crate::config::AppConfig;
use crate::crews::CrewRegistry;
use crate::exec::{ClarinetRunner, ScriptRunner};
use crate::tools::{HiroClient, ToolCatalog, Toolbox};

pub struct AppContext {
    pub config: AppConfig,
    pub catalog: ToolCatalog,
    pub toolbox: Toolbox,
    pub registry: CrewRegistry,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Self {
        let catalog = ToolCatalog::builtin();
        let toolbox = build_toolbox(&config, catalog);
        let registry = CrewRegistry::discover(Some(&config.crews_dir), &catalog);

        Self {
            config,
            catalog,
            toolbox,
            registry,
        }
    }

    /// Rebuild the registry from scratch, picking up added, changed and
    /// removed crew files.
    pub fn reload_crews(&mut self) {
        self.registry = CrewRegistry::discover(Some(&self.config.crews_dir), &self.catalog);
    }
}

fn build_toolbox(config: &AppConfig, catalog: ToolCatalog) -> Toolbox {
    let scripts = ScriptRunner::new(
        config.script_runtime.clone(),
        config.script_args.clone(),
        config.scripts_dir.clone(),
        config.script_timeout_secs.map(Duration::from_secs),
    );
    let clarinet = ClarinetRunner::new(
        config.clarinet_binary.clone(),
        config.projects_dir.clone(),
        config.clarinet_timeout_secs.map(Duration::from_secs),
    );
    Toolbox::new(catalog, scripts, clarinet, HiroClient::new(&config.hiro_url))
}
