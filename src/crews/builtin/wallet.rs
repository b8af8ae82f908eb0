use crate::crews::{AgentSpec, Crew, CrewInputs, CrewSpec, Process, TaskSpec};
use crate::error::CrewError;

/// Summarizes the agent wallet: address, balances and recent activity.
pub struct WalletSummary;

impl Crew for WalletSummary {
    fn id(&self) -> &str {
        "wallet-summary"
    }

    fn name(&self) -> &str {
        "Wallet Summary"
    }

    fn description(&self) -> &str {
        "Look up the configured Stacks wallet and summarize its balances and recent transactions."
    }

    fn assemble(&self, _inputs: &CrewInputs) -> Result<CrewSpec, CrewError> {
        let manager = AgentSpec::new(
            "wallet_manager",
            "Wallet Account Manager",
            "Retrieve accurate information about the agent's Stacks wallet and explain it plainly",
            "You manage a Stacks wallet on behalf of a user. You only report what the wallet tools \
             return and you never guess balances or transaction details.",
        )
        .with_tools(&[
            "wallet_get_my_address",
            "wallet_get_my_balance",
            "wallet_get_my_transactions",
            "bns_get_names",
        ])
        .with_memory();

        let tasks = vec![
            TaskSpec::new(
                "address",
                "wallet_manager",
                "Get the Stacks address of the configured wallet, then look up any BNS names it owns.",
                "The wallet address and the list of BNS names (or a note that there are none).",
            ),
            TaskSpec::new(
                "balance",
                "wallet_manager",
                "Get the current balances of the wallet: STX, fungible tokens and NFTs.",
                "A list of every asset held with its amount, STX converted from micro-STX.",
            ),
            TaskSpec::new(
                "transactions",
                "wallet_manager",
                "Get the wallet's recent transactions and classify each one \
                 (transfer, contract call, deployment) with its status.",
                "A chronological list of recent transactions with type, counterparty, amount and status.",
            ),
            TaskSpec::new(
                "summary",
                "wallet_manager",
                "Write a short report on the wallet using the address, balance and transaction \
                 findings. Point out anything unusual such as failed transactions or idle funds.",
                "A markdown report with sections: Address, Balances, Recent Activity, Notes.",
            )
            .with_context(&["address", "balance", "transactions"]),
        ];

        Ok(CrewSpec {
            name: self.name().to_string(),
            process: Process::Sequential,
            agents: vec![manager],
            tasks,
        })
    }
}
