//! Argument checks applied to tool inputs before anything is spawned or
//! fetched. The model supplies these strings, so they are validated against
//! the shapes the Stacks toolchain actually accepts.

use std::sync::LazyLock;

use regex::Regex;
use crate::error::ArgumentError;

static PRINCIPAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^S[PMTN][0-9A-Z]{38,40}(\.[a-zA-Z][a-zA-Z0-9_-]{0,39})?$").expect("valid regex")
});
static CONTRACT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^S[PMTN][0-9A-Z]{38,40}\.[a-zA-Z][a-zA-Z0-9_-]{0,39}$").expect("valid regex")
});
static TX_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(0x)?[0-9a-fA-F]{64}$").expect("valid regex"));
static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_-]{0,39}$").expect("valid regex"));
static BNS_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9-]+\.[a-z]+$").expect("valid regex"));
static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9.\-]{1,32}$").expect("valid regex"));

const MAX_TEXT_BYTES: usize = 4096;
const MAX_SOURCE_BYTES: usize = 256 * 1024;

/// The shape a tool argument must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Standard or contract principal (`SP...` / `SP....name`).
    Principal,
    /// Fully qualified contract identifier (`SP....name`).
    ContractId,
    /// Transaction id, with or without `0x`.
    TxId,
    /// Clarinet project or contract name.
    Name,
    /// BNS name such as `satoshi.btc`.
    BnsName,
    /// Token symbol or pool identifier.
    Token,
    /// Short free-form text.
    Text,
    /// Clarity source code.
    Source,
}

impl ArgKind {
    /// Validate `value` for the argument called `name`, returning it trimmed.
    pub fn check<'a>(self, name: &str, value: &'a str) -> Result<&'a str, ArgumentError> {
        let value = match self {
            ArgKind::Source => value,
            _ => value.trim(),
        };

        let failure = match self {
            ArgKind::Principal if !PRINCIPAL.is_match(value) => Some("not a Stacks principal"),
            ArgKind::ContractId if !CONTRACT_ID.is_match(value) => {
                Some("expected <principal>.<contract-name>")
            }
            ArgKind::TxId if !TX_ID.is_match(value) => Some("expected 64 hex characters"),
            ArgKind::Name if !NAME.is_match(value) => {
                Some("must start with a letter and contain only letters, digits, '-' or '_'")
            }
            ArgKind::BnsName if !BNS_NAME.is_match(value) => Some("expected <name>.<namespace>"),
            ArgKind::Token if !TOKEN.is_match(value) => Some("not a token symbol"),
            ArgKind::Text if value.is_empty() => Some("must not be empty"),
            ArgKind::Text if value.len() > MAX_TEXT_BYTES => Some("too long"),
            ArgKind::Source if value.trim().is_empty() => Some("must not be empty"),
            ArgKind::Source if value.len() > MAX_SOURCE_BYTES => Some("too long"),
            _ if value.contains('\0') => Some("contains a NUL byte"),
            _ => None,
        };

        match failure {
            Some(reason) => Err(ArgumentError::Invalid {
                name: name.to_string(),
                value: preview(value),
                reason: reason.to_string(),
            }),
            None => Ok(value),
        }
    }
}

/// Split a contract identifier into `(address, contract_name)`.
pub fn split_contract_id(contract_id: &str) -> Result<(&str, &str), ArgumentError> {
    let id = ArgKind::ContractId.check("contract_id", contract_id)?;
    id.split_once('.').ok_or_else(|| ArgumentError::Invalid {
        name: "contract_id".into(),
        value: id.to_string(),
        reason: "expected <principal>.<contract-name>".into(),
    })
}

fn preview(value: &str) -> String {
    const MAX: usize = 80;
    if value.len() <= MAX {
        return value.to_string();
    }
    let mut end = MAX;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &value[..end])
}
