//! Crew definitions and the crew registry.
//!
//! A [`Crew`] turns user inputs into a [`CrewSpec`]. Built-in crews are
//! registered from a static table ([`builtin::builtin_crews`]); further
//! crews can be defined as TOML files ([`file::FileCrew`]) and are picked up
//! by [`registry::CrewRegistry::discover`].

pub mod builtin;
pub mod file;
pub mod registry;
pub mod spec;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::CrewError;
use crate::validate::ArgKind;

pub use registry::{CrewDescriptor, CrewRegistry, CrewSource, SkippedCrew};
pub use spec::{AgentSpec, CrewSpec, Process, TaskSpec};

/// User-supplied values keyed by input field name.
pub type CrewInputs = BTreeMap<String, String>;

/// An input a crew asks the user for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputField {
    pub name: String,
    pub label: String,
    #[serde(default = "default_required")]
    pub required: bool,
    #[serde(default)]
    pub multiline: bool,
}

fn default_required() -> bool {
    true
}

impl InputField {
    pub fn required(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            required: true,
            multiline: false,
        }
    }

    pub fn optional(name: &str, label: &str) -> Self {
        Self {
            required: false,
            ..Self::required(name, label)
        }
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }
}

/// A named crew that can be assembled from user inputs.
pub trait Crew: Send + Sync {
    /// Stable slug used on the command line.
    fn id(&self) -> &str;

    /// Human-readable name.
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn input_fields(&self) -> Vec<InputField> {
        Vec::new()
    }

    /// Build the agents and tasks for one run.
    fn assemble(&self, inputs: &CrewInputs) -> Result<CrewSpec, CrewError>;
}

/// Fail with [`CrewError::MissingInput`] for the first required field that
/// is absent or blank.
pub fn check_inputs(fields: &[InputField], inputs: &CrewInputs) -> Result<(), CrewError> {
    for field in fields.iter().filter(|f| f.required) {
        let present = inputs
            .get(&field.name)
            .is_some_and(|v| !v.trim().is_empty());
        if !present {
            return Err(CrewError::MissingInput(field.name.clone()));
        }
    }
    Ok(())
}

/// Fetch an input and check it against `kind`.
pub fn typed_input<'a>(inputs: &'a CrewInputs, name: &str, kind: ArgKind) -> Result<&'a str, CrewError> {
    let raw = inputs
        .get(name)
        .ok_or_else(|| CrewError::MissingInput(name.to_string()))?;
    kind.check(name, raw).map_err(|e| CrewError::InvalidInput {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// Check a value built from the input `name`, so a crew never hands its
/// tools an argument they will reject.
pub fn check_derived(name: &str, value: &str, kind: ArgKind) -> Result<(), CrewError> {
    kind.check(name, value).map(|_| ()).map_err(|e| CrewError::InvalidInput {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));

/// Replace `{name}` placeholders with input values. Placeholders with no
/// matching input are left untouched.
pub fn interpolate(template: &str, inputs: &CrewInputs) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match inputs.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Lowercase, dash-separated form of a display name.
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(pairs: &[(&str, &str)]) -> CrewInputs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn interpolate_replaces_known_placeholders_only() {
        let out = interpolate(
            "Analyze {contract_name} at {contract_address} ({unknown})",
            &inputs(&[("contract_name", "pox-4"), ("contract_address", "SP000")]),
        );
        assert_eq!(out, "Analyze pox-4 at SP000 ({unknown})");
    }

    #[test]
    fn interpolate_leaves_clarity_tuples_alone() {
        let src = "(ok {amount: u1, sender: tx-sender})";
        assert_eq!(interpolate(src, &inputs(&[("amount", "5")])), src);
    }

    #[test]
    fn missing_and_blank_required_inputs() {
        let fields = vec![
            InputField::required("token_symbol", "Token"),
            InputField::optional("notes", "Notes"),
        ];
        assert!(matches!(
            check_inputs(&fields, &inputs(&[])),
            Err(CrewError::MissingInput(name)) if name == "token_symbol"
        ));
        assert!(check_inputs(&fields, &inputs(&[("token_symbol", "  ")])).is_err());
        assert!(check_inputs(&fields, &inputs(&[("token_symbol", "ALEX")])).is_ok());
    }

    #[test]
    fn typed_input_reports_invalid_values() {
        let err = typed_input(&inputs(&[("tx_id", "xyz")]), "tx_id", ArgKind::TxId).unwrap_err();
        assert!(matches!(err, CrewError::InvalidInput { .. }));
    }

    #[test]
    fn slugify_names() {
        assert_eq!(slugify("Clarity Code Generator"), "clarity-code-generator");
        assert_eq!(slugify("  Token  Explainer (v2) "), "token-explainer-v2");
    }
}
