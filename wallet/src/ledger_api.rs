use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use ajo_common::{
    address::Address,
    api::{
        ledger::{GetAccountStateParams, GetAccountStateResult, GetVersionResult},
        RpcRequest,
        RpcResponse,
    },
    config::LEDGER_REQUEST_TIMEOUT,
};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::trace;
use serde::{de::DeserializeOwned, Serialize};

/// Narrow read contract against the ledger collaborator
///
/// This is the only surface the core depends on: one connectivity probe and
/// one account state read. Deposits and withdrawals are out of scope here,
/// their acknowledgment simply triggers a refresh through the source.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    async fn get_version(&self) -> Result<String>;

    async fn get_account_state(&self, address: &Address) -> Result<GetAccountStateResult>;
}

/// JSON-RPC 2.0 client over HTTP for the ledger collaborator
pub struct LedgerClient {
    url: String,
    client: reqwest::Client,
    request_id: AtomicU64,
}

impl LedgerClient {
    pub fn new<S: ToString>(ledger_address: S) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(LEDGER_REQUEST_TIMEOUT))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            url: ledger_address.to_string(),
            client,
            request_id: AtomicU64::new(1),
        })
    }

    pub fn get_url(&self) -> &str {
        &self.url
    }

    async fn call<P: Serialize, R: DeserializeOwned>(&self, method: &str, params: &P) -> Result<R> {
        if log::log_enabled!(log::Level::Trace) {
            trace!("call: {}", method);
        }

        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = RpcRequest::new(method, Some(serde_json::to_value(params)?), id);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("RPC request {} failed", method))?;

        let response: RpcResponse<R> = response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", method))?;

        if let Some(error) = response.error {
            return Err(error.into());
        }

        response
            .result
            .ok_or_else(|| anyhow!("RPC response for {} has no result", method))
    }
}

#[async_trait]
impl LedgerApi for LedgerClient {
    async fn get_version(&self) -> Result<String> {
        let result: GetVersionResult = self.call("get_version", &serde_json::json!({})).await?;
        Ok(result.version)
    }

    async fn get_account_state(&self, address: &Address) -> Result<GetAccountStateResult> {
        self.call(
            "get_account_state",
            &GetAccountStateParams { address: *address },
        )
        .await
    }
}
