//! Crews defined in TOML files.
//!
//! ```toml
//! name = "Token Explainer"
//! description = "Explain a SIP-010 token"
//! process = "sequential"
//!
//! [[inputs]]
//! name = "contract_id"
//! label = "Token contract"
//!
//! [[agents]]
//! id = "analyst"
//! role = "Token Analyst"
//! goal = "Explain tokens"
//! backstory = "You read token contracts."
//! tools = ["fetch_contract_source"]
//!
//! [[tasks]]
//! id = "explain"
//! agent = "analyst"
//! description = "Explain the token at {contract_id}."
//! expected_output = "A short explanation."
//! ```
//!
//! `{name}` placeholders in agent and task text are filled from inputs.

use std::path::Path;

use serde::Deserialize;

use super::{check_inputs, interpolate, slugify, AgentSpec, Crew, CrewInputs, CrewSpec, InputField, Process, TaskSpec};
use crate::error::CrewError;
use crate::tools::ToolCatalog;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct CrewFile {
    id: Option<String>,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    process: Process,
    #[serde(default)]
    inputs: Vec<InputField>,
    agents: Vec<AgentSpec>,
    tasks: Vec<TaskSpec>,
}

/// A crew loaded and validated from a TOML file.
#[derive(Debug, Clone)]
pub struct FileCrew {
    id: String,
    def: CrewFile,
}

impl FileCrew {
    /// Parse and validate a crew file. Any problem is reported as
    /// [`CrewError::InvalidDefinition`] naming the file.
    pub fn load(path: &Path, catalog: &ToolCatalog) -> Result<Self, CrewError> {
        let invalid = |message: String| CrewError::InvalidDefinition {
            path: path.to_path_buf(),
            message,
        };

        let contents = std::fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
        let def: CrewFile = toml::from_str(&contents).map_err(|e| invalid(e.to_string()))?;

        let id = match &def.id {
            Some(id) => slugify(id),
            None => slugify(&def.name),
        };
        if id.is_empty() {
            return Err(invalid("crew name produces an empty id".into()));
        }

        let crew = Self {
            id,
            def,
        };
        crew.template()
            .validate(catalog)
            .map_err(|e| invalid(e.to_string()))?;
        Ok(crew)
    }

    /// The crew with placeholders still in place.
    fn template(&self) -> CrewSpec {
        CrewSpec {
            name: self.def.name.clone(),
            process: self.def.process,
            agents: self.def.agents.clone(),
            tasks: self.def.tasks.clone(),
        }
    }
}

impl Crew for FileCrew {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.def.name
    }

    fn description(&self) -> &str {
        &self.def.description
    }

    fn input_fields(&self) -> Vec<InputField> {
        self.def.inputs.clone()
    }

    fn assemble(&self, inputs: &CrewInputs) -> Result<CrewSpec, CrewError> {
        check_inputs(&self.def.inputs, inputs)?;

        let mut spec = self.template();
        for agent in &mut spec.agents {
            agent.role = interpolate(&agent.role, inputs);
            agent.goal = interpolate(&agent.goal, inputs);
            agent.backstory = interpolate(&agent.backstory, inputs);
        }
        for task in &mut spec.tasks {
            task.description = interpolate(&task.description, inputs);
            task.expected_output = interpolate(&task.expected_output, inputs);
        }
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const TOKEN_CREW: &str = r#"
name = "Token Explainer"
description = "Explain a SIP-010 token"

[[inputs]]
name = "contract_id"
label = "Token contract"

[[agents]]
id = "analyst"
role = "Token Analyst"
goal = "Explain {contract_id}"
backstory = "You read token contracts."
tools = ["fetch_contract_source"]

[[tasks]]
id = "explain"
agent = "analyst"
description = "Explain the token at {contract_id}."
expected_output = "A short explanation."
"#;

    fn write(tmp: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = tmp.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn loads_and_interpolates() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "token.toml", TOKEN_CREW);
        let crew = FileCrew::load(&path, &ToolCatalog::builtin()).unwrap();

        assert_eq!(crew.id(), "token-explainer");
        assert_eq!(crew.input_fields().len(), 1);
        assert!(crew.input_fields()[0].required);

        let inputs: CrewInputs = [("contract_id".to_string(), "SP000.token".to_string())]
            .into_iter()
            .collect();
        let spec = crew.assemble(&inputs).unwrap();
        assert_eq!(spec.process, Process::Sequential);
        assert_eq!(spec.tasks[0].description, "Explain the token at SP000.token.");
        assert_eq!(spec.agents[0].goal, "Explain SP000.token");
    }

    #[test]
    fn explicit_id_wins() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "token.toml", &format!("id = \"tok\"\n{TOKEN_CREW}"));
        let crew = FileCrew::load(&path, &ToolCatalog::builtin()).unwrap();
        assert_eq!(crew.id(), "tok");
    }

    #[test]
    fn unknown_tool_makes_the_file_invalid() {
        let tmp = TempDir::new().unwrap();
        let path = write(
            &tmp,
            "bad.toml",
            &TOKEN_CREW.replace("fetch_contract_source", "mint_money"),
        );
        let err = FileCrew::load(&path, &ToolCatalog::builtin()).unwrap_err();
        match err {
            CrewError::InvalidDefinition { path: p, message } => {
                assert_eq!(p, path);
                assert!(message.contains("mint_money"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn syntax_errors_are_reported_with_the_path() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "broken.toml", "name = \"unterminated");
        assert!(matches!(
            FileCrew::load(&path, &ToolCatalog::builtin()),
            Err(CrewError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = write(&tmp, "extra.toml", &format!("verbose = true\n{TOKEN_CREW}"));
        assert!(FileCrew::load(&path, &ToolCatalog::builtin()).is_err());
    }
}
