//! The static tool catalog.
//!
//! Each entry names a tool the model can call, the arguments it takes, and
//! what backs it: a TypeScript script run through the script runtime, a
//! Clarinet CLI operation, or a Stacks API fetch. Crews reference tools by
//! name; [`ToolCatalog::define_tools`] turns a crew agent's tool list into
//! [`genai::chat::Tool`] schemas.

use genai::chat::Tool;
use serde_json::{json, Map, Value};

use crate::error::ArgumentError;
use crate::validate::ArgKind;

/// One argument of a tool.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ArgKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClarinetOp {
    NewProject,
    AddContract,
    WriteContract,
    Check,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOp {
    ContractSource,
    AccountBalances,
}

/// What executes a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    /// Script path relative to `<scripts_dir>/src`.
    Script(&'static str),
    Clarinet(ClarinetOp),
    Api(ApiOp),
}

#[derive(Debug, Clone, Copy)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: ToolKind,
    pub params: &'static [ParamSpec],
}

const TX_ID: ParamSpec = ParamSpec {
    name: "tx_id",
    description: "Stacks transaction id (64 hex characters, optional 0x prefix)",
    kind: ArgKind::TxId,
};
const PROJECT: ParamSpec = ParamSpec {
    name: "project",
    description: "Clarinet project name",
    kind: ArgKind::Name,
};
const CONTRACT: ParamSpec = ParamSpec {
    name: "contract",
    description: "Contract name, without the .clar extension",
    kind: ArgKind::Name,
};

const BUILTIN_TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "wallet_get_my_address",
        description: "Get the Stacks address of the agent's configured wallet.",
        kind: ToolKind::Script("stacks-wallet/get-my-wallet-address.ts"),
        params: &[],
    },
    ToolSpec {
        name: "wallet_get_my_balance",
        description: "Get the STX, fungible and non-fungible token balances of the agent's wallet.",
        kind: ToolKind::Script("stacks-wallet/get-my-wallet-balance.ts"),
        params: &[],
    },
    ToolSpec {
        name: "wallet_get_my_transactions",
        description: "List recent transactions sent from or received by the agent's wallet.",
        kind: ToolKind::Script("stacks-wallet/get-my-wallet-transactions.ts"),
        params: &[],
    },
    ToolSpec {
        name: "wallet_fund_testnet",
        description: "Request testnet STX from the faucet for the agent's wallet.",
        kind: ToolKind::Script("stacks-wallet/fund-my-wallet-faucet.ts"),
        params: &[],
    },
    ToolSpec {
        name: "stacks_transaction_status",
        description: "Get the status (pending, success, abort) of a Stacks transaction.",
        kind: ToolKind::Script("stacks-wallet/get-transaction-status.ts"),
        params: &[TX_ID],
    },
    ToolSpec {
        name: "stacks_transaction_details",
        description: "Get the full details of a Stacks transaction, including events and function arguments.",
        kind: ToolKind::Script("stacks-wallet/get-transaction.ts"),
        params: &[TX_ID],
    },
    ToolSpec {
        name: "bns_get_address",
        description: "Resolve a BNS name (e.g. satoshi.btc) to its Stacks address.",
        kind: ToolKind::Script("stacks-bns/get-address-by-bns.ts"),
        params: &[ParamSpec {
            name: "bns_name",
            description: "BNS name including namespace, e.g. satoshi.btc",
            kind: ArgKind::BnsName,
        }],
    },
    ToolSpec {
        name: "bns_get_names",
        description: "List the BNS names owned by a Stacks address.",
        kind: ToolKind::Script("stacks-bns/get-bns-names-by-address.ts"),
        params: &[ParamSpec {
            name: "address",
            description: "Stacks address",
            kind: ArgKind::Principal,
        }],
    },
    ToolSpec {
        name: "alex_price_history",
        description: "Get the price history of a token on the ALEX exchange.",
        kind: ToolKind::Script("stacks-alex/get-price-history.ts"),
        params: &[ParamSpec {
            name: "token",
            description: "Token symbol or ALEX token id",
            kind: ArgKind::Token,
        }],
    },
    ToolSpec {
        name: "alex_token_pool_volume",
        description: "Get the trading volume of an ALEX liquidity pool.",
        kind: ToolKind::Script("stacks-alex/get-token-pool-volume.ts"),
        params: &[ParamSpec {
            name: "pool_id",
            description: "ALEX pool id",
            kind: ArgKind::Token,
        }],
    },
    ToolSpec {
        name: "bitflow_available_tokens",
        description: "List the tokens that can be swapped on Bitflow.",
        kind: ToolKind::Script("stacks-bitflow/get-available-tokens.ts"),
        params: &[],
    },
    ToolSpec {
        name: "clarinet_new_project",
        description: "Create a new Clarinet project for Clarity smart contracts.",
        kind: ToolKind::Clarinet(ClarinetOp::NewProject),
        params: &[PROJECT],
    },
    ToolSpec {
        name: "clarinet_add_contract",
        description: "Scaffold a new, empty contract inside an existing Clarinet project.",
        kind: ToolKind::Clarinet(ClarinetOp::AddContract),
        params: &[PROJECT, CONTRACT],
    },
    ToolSpec {
        name: "clarinet_write_contract",
        description: "Write Clarity source code to contracts/<contract>.clar in an existing Clarinet project.",
        kind: ToolKind::Clarinet(ClarinetOp::WriteContract),
        params: &[
            PROJECT,
            CONTRACT,
            ParamSpec {
                name: "source",
                description: "Complete Clarity source code of the contract",
                kind: ArgKind::Source,
            },
        ],
    },
    ToolSpec {
        name: "clarinet_check",
        description: "Run `clarinet check` on a project to find syntax and type errors in its contracts.",
        kind: ToolKind::Clarinet(ClarinetOp::Check),
        params: &[PROJECT],
    },
    ToolSpec {
        name: "fetch_contract_source",
        description: "Fetch the deployed Clarity source code of a contract from the Stacks API.",
        kind: ToolKind::Api(ApiOp::ContractSource),
        params: &[ParamSpec {
            name: "contract_id",
            description: "Fully qualified contract id, <address>.<contract-name>",
            kind: ArgKind::ContractId,
        }],
    },
    ToolSpec {
        name: "get_account_balances",
        description: "Fetch the STX and token balances of any Stacks principal from the Stacks API.",
        kind: ToolKind::Api(ApiOp::AccountBalances),
        params: &[ParamSpec {
            name: "principal",
            description: "Stacks address or contract principal",
            kind: ArgKind::Principal,
        }],
    },
];

impl ToolSpec {
    /// JSON schema for the tool's arguments. Every parameter is required.
    pub fn schema(&self) -> Value {
        let mut properties = Map::new();
        for p in self.params {
            properties.insert(
                p.name.to_string(),
                json!({"type": "string", "description": p.description}),
            );
        }
        let required: Vec<&str> = self.params.iter().map(|p| p.name).collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    pub fn to_genai_tool(&self) -> Tool {
        Tool::new(self.name)
            .with_description(self.description)
            .with_schema(self.schema())
    }

    /// Pull and validate every parameter out of a JSON argument object.
    /// Values come back in parameter order.
    pub fn extract_args(&self, args: &Value) -> Result<Vec<String>, ArgumentError> {
        self.params
            .iter()
            .map(|p| {
                let raw = args
                    .get(p.name)
                    .and_then(Value::as_str)
                    .ok_or_else(|| ArgumentError::Missing(p.name.to_string()))?;
                p.kind.check(p.name, raw).map(str::to_string)
            })
            .collect()
    }

    /// Map positional values onto the parameters, in order.
    pub fn positional_args(&self, values: &[String]) -> Result<Value, ArgumentError> {
        if values.len() > self.params.len() {
            return Err(ArgumentError::Invalid {
                name: self.name.to_string(),
                value: values.join(" "),
                reason: format!("takes {} argument(s)", self.params.len()),
            });
        }
        let object: Map<String, Value> = self
            .params
            .iter()
            .zip(values)
            .map(|(p, v)| (p.name.to_string(), Value::String(v.clone())))
            .collect();
        Ok(Value::Object(object))
    }
}

/// Lookup table over the tool specs.
#[derive(Debug, Clone, Copy)]
pub struct ToolCatalog {
    tools: &'static [ToolSpec],
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ToolCatalog {
    pub fn builtin() -> Self {
        Self {
            tools: BUILTIN_TOOLS,
        }
    }

    pub fn get(&self, name: &str) -> Option<&'static ToolSpec> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static ToolSpec> {
        self.tools.iter()
    }

    /// genai schemas for the named tools. Unknown names are skipped.
    pub fn define_tools<S: AsRef<str>>(&self, names: &[S]) -> Vec<Tool> {
        names
            .iter()
            .filter_map(|n| self.get(n.as_ref()))
            .map(ToolSpec::to_genai_tool)
            .collect()
    }

    /// Markdown listing of the named tools, embedded in agent prompts.
    pub fn descriptions<S: AsRef<str>>(&self, names: &[S]) -> String {
        names
            .iter()
            .filter_map(|n| self.get(n.as_ref()))
            .map(|t| {
                let mut entry = format!("### {}\n{}", t.name, t.description);
                for p in t.params {
                    entry.push_str(&format!("\n- **{}** (string, required): {}", p.name, p.description));
                }
                entry
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tool_names_are_unique() {
        let catalog = ToolCatalog::builtin();
        let names: HashSet<_> = catalog.iter().map(|t| t.name).collect();
        assert_eq!(names.len(), catalog.iter().count());
    }

    #[test]
    fn script_tools_take_at_most_one_argument() {
        for tool in ToolCatalog::builtin().iter() {
            if let ToolKind::Script(_) = tool.kind {
                assert!(tool.params.len() <= 1, "{} has too many params", tool.name);
            }
        }
    }

    #[test]
    fn schema_lists_required_params() {
        let tool = ToolCatalog::builtin().get("clarinet_add_contract").unwrap();
        let schema = tool.schema();
        assert_eq!(schema["required"], json!(["project", "contract"]));
        assert_eq!(schema["properties"]["contract"]["type"], "string");
    }

    #[test]
    fn define_tools_skips_unknown_names() {
        let tools = ToolCatalog::builtin().define_tools(&["wallet_get_my_balance", "nope"]);
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name.as_str(), "wallet_get_my_balance");
        assert!(tools[0].description.is_some());
        assert!(tools[0].schema.is_some());
    }

    #[test]
    fn extract_args_validates_each_param() {
        let tool = ToolCatalog::builtin().get("stacks_transaction_status").unwrap();
        let ok = tool
            .extract_args(&json!({"tx_id": format!("0x{}", "b".repeat(64))}))
            .unwrap();
        assert_eq!(ok.len(), 1);

        assert!(matches!(
            tool.extract_args(&json!({})),
            Err(ArgumentError::Missing(_))
        ));
        assert!(matches!(
            tool.extract_args(&json!({"tx_id": "nope"})),
            Err(ArgumentError::Invalid { .. })
        ));
    }

    #[test]
    fn positional_args_map_in_order() {
        let tool = ToolCatalog::builtin().get("clarinet_add_contract").unwrap();
        let args = tool
            .positional_args(&["demo".to_string(), "counter".to_string()])
            .unwrap();
        assert_eq!(args, json!({"project": "demo", "contract": "counter"}));

        let too_many = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert!(tool.positional_args(&too_many).is_err());
    }

    #[test]
    fn descriptions_include_params() {
        let desc = ToolCatalog::builtin().descriptions(&["fetch_contract_source"]);
        assert!(desc.contains("### fetch_contract_source"));
        assert!(desc.contains("**contract_id**"));
    }
}
