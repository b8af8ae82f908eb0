use crate::crews::{
    check_derived, check_inputs, typed_input, AgentSpec, Crew, CrewInputs, CrewSpec, InputField, Process, TaskSpec,
};
use crate::error::CrewError;
use crate::validate::ArgKind;

const DEFAULT_CONTRACT_NAME: &str = "generated-contract";

/// Writes a Clarity contract from requirements, reviews it, and checks it
/// compiles with Clarinet.
pub struct ClarityCodeGenerator;

impl Crew for ClarityCodeGenerator {
    fn id(&self) -> &str {
        "clarity-code-generator"
    }

    fn name(&self) -> &str {
        "Clarity Code Generator"
    }

    fn description(&self) -> &str {
        "Generate a Clarity smart contract from plain-language requirements, review it and syntax-check it with Clarinet."
    }

    fn input_fields(&self) -> Vec<InputField> {
        vec![
            InputField::required("user_contract_requirements", "Contract requirements").multiline(),
            InputField::optional("contract_name", "Contract name"),
        ]
    }

    fn assemble(&self, inputs: &CrewInputs) -> Result<CrewSpec, CrewError> {
        check_inputs(&self.input_fields(), inputs)?;
        let requirements = typed_input(inputs, "user_contract_requirements", ArgKind::Text)?;
        let contract = match inputs.get("contract_name").filter(|v| !v.trim().is_empty()) {
            Some(_) => typed_input(inputs, "contract_name", ArgKind::Name)?,
            None => DEFAULT_CONTRACT_NAME,
        };
        let project = format!("crew-{contract}");
        check_derived("contract_name", &project, ArgKind::Name)?;

        let agents = vec![
            AgentSpec::new(
                "generator",
                "Clarity Code Generator",
                "Write correct, secure and idiomatic Clarity smart contracts that meet the user's requirements",
                "You are an experienced Clarity developer on Stacks. You know Clarity is decidable, \
                 interpreted and has no reentrancy, and you write contracts that use explicit error \
                 codes, check tx-sender or contract-caller where authorization matters, and keep \
                 public functions small.",
            ),
            AgentSpec::new(
                "reviewer",
                "Clarity Code Reviewer",
                "Find bugs, security issues and deviations from the requirements in Clarity code",
                "You audit Clarity contracts for a living. You read every function and check \
                 authorization, arithmetic, asserts, response handling and post-condition friendliness.",
            )
            .with_delegation(),
            AgentSpec::new(
                "checker",
                "Clarity Syntax Checker",
                "Make sure the contract compiles with Clarinet, fixing syntax errors when it does not",
                "You are a build engineer for Clarity projects. You trust the compiler over intuition \
                 and you report its diagnostics exactly.",
            )
            .with_tools(&[
                "clarinet_new_project",
                "clarinet_add_contract",
                "clarinet_write_contract",
                "clarinet_check",
            ]),
        ];

        let tasks = vec![
            TaskSpec::new(
                "generate",
                "generator",
                format!(
                    "Write a Clarity smart contract named `{contract}` that satisfies these requirements:\n\n\
                     {requirements}\n\n\
                     Define constants for error codes, use data-vars and maps as needed, and document \
                     each public function with a short comment."
                ),
                "The complete Clarity source code of the contract in a single ```clarity code block, \
                 followed by a short explanation of its design.",
            ),
            TaskSpec::new(
                "review",
                "reviewer",
                "Review the generated contract against the requirements. List every issue you find \
                 with its severity, then produce a corrected version of the full contract.",
                "A list of findings (severity, location, description, fix) and the corrected contract \
                 in a single ```clarity code block.",
            )
            .with_context(&["generate"]),
            TaskSpec::new(
                "check",
                "checker",
                format!(
                    "Create the Clarinet project `{project}`, add the contract `{contract}` to it, write \
                     the reviewed source code into it and run `clarinet check`. If the check fails, fix \
                     the reported errors, write the fixed source and check again until it passes or you \
                     cannot make further progress."
                ),
                "The final `clarinet check` output, whether it passed, and the final contract source \
                 in a single ```clarity code block.",
            )
            .with_context(&["review"]),
            TaskSpec::new(
                "report",
                "reviewer",
                "Summarize the outcome: what the contract does, which review findings were fixed, and \
                 whether it compiles.",
                "A markdown report with sections: Overview, Functions, Review Findings, Compilation, \
                 Final Source.",
            )
            .with_context(&["generate", "review", "check"]),
        ];

        Ok(CrewSpec {
            name: self.name().to_string(),
            process: Process::Sequential,
            agents,
            tasks,
        })
    }
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
    fn requirements_are_interpolated_into_the_first_task() {
        let spec = ClarityCodeGenerator
            .assemble(&inputs(&[("user_contract_requirements", "a token faucet")]))
            .unwrap();
        assert!(spec.tasks[0].description.contains("a token faucet"));
        assert!(spec.tasks[0].description.contains(DEFAULT_CONTRACT_NAME));
        assert!(spec.tasks[2].description.contains("crew-generated-contract"));
    }

    #[test]
    fn contract_name_must_be_a_valid_name() {
        let err = ClarityCodeGenerator
            .assemble(&inputs(&[
                ("user_contract_requirements", "a counter"),
                ("contract_name", "../../etc"),
            ]))
            .unwrap_err();
        assert!(matches!(err, CrewError::InvalidInput { .. }));
    }

    #[test]
    fn project_name_stays_within_name_limit() {
        let longest = format!("c{}", "x".repeat(34));
        let spec = ClarityCodeGenerator
            .assemble(&inputs(&[
                ("user_contract_requirements", "a counter"),
                ("contract_name", &longest),
            ]))
            .unwrap();
        let project = format!("crew-{longest}");
        assert!(ArgKind::Name.check("project", &project).is_ok());
        assert!(spec.tasks[2].description.contains(&project));

        let too_long = format!("c{}", "x".repeat(39));
        assert!(ArgKind::Name.check("contract_name", &too_long).is_ok());
        let err = ClarityCodeGenerator
            .assemble(&inputs(&[
                ("user_contract_requirements", "a counter"),
                ("contract_name", &too_long),
            ]))
            .unwrap_err();
        assert!(matches!(err, CrewError::InvalidInput { name, .. } if name == "contract_name"));
    }
}
