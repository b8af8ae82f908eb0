//! Minimal client for the Hiro Stacks blockchain API.
//!
//! Plain request/response JSON fetches: no retries, no pagination.

use std::time::Duration;

use serde_json::Value;

use crate::error::ApiError;
use crate::validate::{split_contract_id, ArgKind};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct HiroClient {
    http: reqwest::Client,
    base_url: String,
}

impl HiroClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Deployed Clarity source of `<address>.<name>`.
    pub async fn contract_source(&self, contract_id: &str) -> Result<String, ApiError> {
        let (address, name) =
            split_contract_id(contract_id).map_err(|e| ApiError::Malformed(e.to_string()))?;
        let body = self
            .get_json(&format!("/v2/contracts/source/{address}/{name}?proof=0"))
            .await?;
        body.get("source")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ApiError::Malformed("response has no `source` field".into()))
    }

    /// STX, fungible and non-fungible balances of a principal.
    pub async fn account_balances(&self, principal: &str) -> Result<Value, ApiError> {
        let principal = ArgKind::Principal
            .check("principal", principal)
            .map_err(|e| ApiError::Malformed(e.to_string()))?;
        self.get_json(&format!("/extended/v1/address/{principal}/balances"))
            .await
    }

    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%url, "GET");

        let resp = self
            .http
            .get(&url)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                url,
                body,
            });
        }
        Ok(resp.json::<Value>().await?)
    }
}
