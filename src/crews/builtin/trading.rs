use crate::crews::{
    check_inputs, typed_input, AgentSpec, Crew, CrewInputs, CrewSpec, InputField, Process, TaskSpec,
};
use crate::error::CrewError;
use crate::validate::ArgKind;

/// Gathers DEX market data for a token and proposes a trading stance.
pub struct TradingAnalyzer;

impl Crew for TradingAnalyzer {
    fn id(&self) -> &str {
        "trading-analyzer"
    }

    fn name(&self) -> &str {
        "Trading Analyzer"
    }

    fn description(&self) -> &str {
        "Collect ALEX and Bitflow market data for a token and suggest whether to buy, sell or hold."
    }

    fn input_fields(&self) -> Vec<InputField> {
        vec![InputField::required("token_symbol", "Token symbol")]
    }

    fn assemble(&self, inputs: &CrewInputs) -> Result<CrewSpec, CrewError> {
        check_inputs(&self.input_fields(), inputs)?;
        let token = typed_input(inputs, "token_symbol", ArgKind::Token)?;

        let agents = vec![
            AgentSpec::new(
                "market_data",
                "Market Data Collector",
                "Gather accurate price, volume and liquidity data for Stacks tokens",
                "You pull numbers from decentralized exchanges on Stacks and never round away detail \
                 that matters to traders.",
            )
            .with_tools(&[
                "alex_price_history",
                "alex_token_pool_volume",
                "bitflow_available_tokens",
            ]),
            AgentSpec::new(
                "strategist",
                "Trading Strategist",
                "Turn market data into a clear, risk-aware trading recommendation",
                "You have traded Bitcoin-layer assets for years. You weigh trend, liquidity and \
                 volatility, and you state your confidence honestly.",
            )
            .with_memory(),
        ];

        let tasks = vec![
            TaskSpec::new(
                "collect",
                "market_data",
                format!(
                    "Collect market data for {token}: recent price history and pool volume on ALEX, \
                     and whether it can be swapped on Bitflow."
                ),
                format!("A table of {token} prices over time, current pool volume and Bitflow availability."),
            ),
            TaskSpec::new(
                "analyze",
                "strategist",
                format!(
                    "Analyze the trend, volatility and liquidity of {token} from the collected data."
                ),
                "A short analysis covering trend direction, volatility and liquidity depth.",
            )
            .with_context(&["collect"]),
            TaskSpec::new(
                "recommend",
                "strategist",
                format!("Recommend whether to buy, sell or hold {token}, with reasoning and risks."),
                "A recommendation (buy, sell or hold), a confidence level, the key reasons and the main risks.",
            )
            .with_context(&["collect", "analyze"]),
        ];

        Ok(CrewSpec {
            name: self.name().to_string(),
            process: Process::Hierarchical,
            agents,
            tasks,
        })
    }
}
