//! Crews compiled into the binary.

mod analyzer;
mod clarity;
mod trading;
mod transaction;
mod wallet;

pub use analyzer::SmartContractAnalyzer;
pub use clarity::ClarityCodeGenerator;
pub use trading::TradingAnalyzer;
pub use transaction::TransactionExplainer;
pub use wallet::WalletSummary;

use super::Crew;

/// The static registration table. Order here is the order crews are
/// registered in.
pub fn builtin_crews() -> Vec<Box<dyn Crew>> {
    vec![
        Box::new(WalletSummary),
        Box::new(ClarityCodeGenerator),
        Box::new(SmartContractAnalyzer),
        Box::new(TradingAnalyzer),
        Box::new(TransactionExplainer),
    ]
}
