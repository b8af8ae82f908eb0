use crate::crews::{
    check_inputs, typed_input, AgentSpec, Crew, CrewInputs, CrewSpec, InputField, Process, TaskSpec,
};
use crate::error::CrewError;
use crate::validate::ArgKind;

/// Explains a single Stacks transaction in plain language.
pub struct TransactionExplainer;

impl Crew for TransactionExplainer {
    fn id(&self) -> &str {
        "transaction-explainer"
    }

    fn name(&self) -> &str {
        "Transaction Explainer"
    }

    fn description(&self) -> &str {
        "Look up a Stacks transaction and explain who did what, with which contract, and whether it worked."
    }

    fn input_fields(&self) -> Vec<InputField> {
        vec![InputField::required("tx_id", "Transaction id")]
    }

    fn assemble(&self, inputs: &CrewInputs) -> Result<CrewSpec, CrewError> {
        check_inputs(&self.input_fields(), inputs)?;
        let tx_id = typed_input(inputs, "tx_id", ArgKind::TxId)?;

        let explainer = AgentSpec::new(
            "explainer",
            "Stacks Transaction Explainer",
            "Explain Stacks transactions accurately to people who do not read raw chain data",
            "You are a block explorer in human form. You decode contract calls, token transfers and \
             events, and you resolve addresses to BNS names when that helps.",
        )
        .with_tools(&[
            "stacks_transaction_status",
            "stacks_transaction_details",
            "fetch_contract_source",
            "bns_get_names",
        ])
        .with_memory();

        let tasks = vec![
            TaskSpec::new(
                "lookup",
                "explainer",
                format!(
                    "Get the status and full details of transaction {tx_id}. If it is a contract \
                     call, fetch the called contract's source to understand the function."
                ),
                "The transaction's type, sender, status, fee, function and arguments, and emitted events.",
            ),
            TaskSpec::new(
                "explain",
                "explainer",
                format!("Explain transaction {tx_id} in plain language."),
                "A short markdown explanation: what happened, who was involved, what moved, and \
                 whether it succeeded.",
            )
            .with_context(&["lookup"]),
        ];

        Ok(CrewSpec {
            name: self.name().to_string(),
            process: Process::Sequential,
            agents: vec![explainer],
            tasks,
        })
    }
}
