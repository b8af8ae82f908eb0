use crate::crews::{
    check_derived, check_inputs, typed_input, AgentSpec, Crew, CrewInputs, CrewSpec, InputField, Process, TaskSpec,
};
use crate::error::CrewError;
use crate::validate::ArgKind;

/// Fetches a deployed contract and produces a functional and security review.
pub struct SmartContractAnalyzer;

impl Crew for SmartContractAnalyzer {
    fn id(&self) -> &str {
        "smart-contract-analyzer"
    }

    fn name(&self) -> &str {
        "Smart Contract Analyzer"
    }

    fn description(&self) -> &str {
        "Retrieve a deployed Clarity contract and explain what it does, how it is used and what could go wrong."
    }

    fn input_fields(&self) -> Vec<InputField> {
        vec![
            InputField::required("contract_address", "Deployer address"),
            InputField::required("contract_name", "Contract name"),
        ]
    }

    fn assemble(&self, inputs: &CrewInputs) -> Result<CrewSpec, CrewError> {
        check_inputs(&self.input_fields(), inputs)?;
        let address = typed_input(inputs, "contract_address", ArgKind::Principal)?;
        let name = typed_input(inputs, "contract_name", ArgKind::Name)?;
        let contract_id = format!("{address}.{name}");
        check_derived("contract_address", &contract_id, ArgKind::ContractId)?;

        let agents = vec![
            AgentSpec::new(
                "retriever",
                "Contract Source Retriever",
                "Fetch the exact deployed source code of Stacks smart contracts",
                "You know the Stacks API inside out and always work from the on-chain source, never \
                 from memory.",
            )
            .with_tools(&["fetch_contract_source"]),
            AgentSpec::new(
                "analyst",
                "Clarity Contract Analyst",
                "Explain in plain language what a Clarity contract does and how it is meant to be used",
                "You have read hundreds of Clarity contracts, from SIP-010 tokens to DAO extensions, \
                 and you recognise common patterns and traits quickly.",
            ),
            AgentSpec::new(
                "auditor",
                "Smart Contract Security Auditor",
                "Identify vulnerabilities and risky design decisions in Clarity contracts",
                "You are a security auditor specialising in Stacks. You look for missing authorization \
                 checks, unchecked responses, unbounded iteration, privileged functions and trust \
                 assumptions around contract-caller and as-contract.",
            )
            .with_tools(&["get_account_balances"])
            .with_delegation(),
        ];

        let tasks = vec![
            TaskSpec::new(
                "retrieve",
                "retriever",
                format!("Fetch the deployed source code of the contract `{contract_id}`."),
                "The complete Clarity source code of the contract in a single ```clarity code block.",
            ),
            TaskSpec::new(
                "analyze",
                "analyst",
                format!(
                    "Analyze `{contract_id}`: list its traits, data variables, maps, constants and \
                     public, read-only and private functions, and explain what each public function does."
                ),
                "A structured breakdown of the contract's state and functions with a one-paragraph \
                 summary of its purpose.",
            )
            .with_context(&["retrieve"]),
            TaskSpec::new(
                "audit",
                "auditor",
                format!(
                    "Audit `{contract_id}` for security issues. Check the contract's own balances if \
                     holdings affect the risk. Rate each finding as critical, high, medium, low or \
                     informational."
                ),
                "A list of findings with severity, affected function, description and recommendation.",
            )
            .with_context(&["retrieve", "analyze"]),
            TaskSpec::new(
                "report",
                "analyst",
                "Combine the analysis and the audit into a final report for someone deciding whether \
                 to interact with this contract.",
                "A markdown report with sections: Summary, Functions, Security Findings, Verdict.",
            )
            .with_context(&["analyze", "audit"]),
        ];

        Ok(CrewSpec {
            name: self.name().to_string(),
            process: Process::Sequential,
            agents,
            tasks,
        })
    }
}
