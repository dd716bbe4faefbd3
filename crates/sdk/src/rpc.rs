//! Ledger collaborators
//!
//! `LedgerRpc` and `TransactionSigner` are injected into the client. The
//! bundled `HttpLedgerRpc` is a lightweight JSON-RPC transport built on ureq
//! rather than the heavy solana-client dependency chain.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, signature::Signature};
use tracing::debug;

use crate::config::SdkConfig;
use crate::error::LedgerError;
use crate::filters::AccountFilter;

/// Account excluded from the node's secondary indexes
pub const RPC_NOT_INDEXED: i64 = -32010;
/// Method not enabled on this node
pub const RPC_METHOD_NOT_FOUND: i64 = -32601;
/// Node is behind the cluster and refusing reads
pub const RPC_NODE_UNHEALTHY: i64 = -32005;
/// Requested block or slot is not available on this node
pub const RPC_BLOCK_NOT_AVAILABLE: i64 = -32004;

/// Result of a program-account scan.
///
/// `NotIndexed` means the node cannot answer the query at all, which is
/// different from a confirmed empty result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum IndexState<T> {
    NotIndexed,
    Ready(T),
}

impl<T> IndexState<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            IndexState::Ready(value) => Some(value),
            IndexState::NotIndexed => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> IndexState<U> {
        match self {
            IndexState::Ready(value) => IndexState::Ready(f(value)),
            IndexState::NotIndexed => IndexState::NotIndexed,
        }
    }
}

/// Raw program accounts keyed by address
pub type ProgramAccounts = Vec<(Pubkey, Vec<u8>)>;

// ============================================================================
// Collaborator Ports
// ============================================================================

#[async_trait]
pub trait LedgerRpc: Send + Sync {
    /// Raw data of one account, `None` when it does not exist
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Raw data of several accounts, in request order
    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Vec<u8>>>, LedgerError>;

    /// All accounts owned by `program` that match every filter
    async fn get_program_accounts(
        &self,
        program: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<IndexState<ProgramAccounts>, LedgerError>;
}

/// Signs and broadcasts transactions on behalf of one authority
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    fn authority(&self) -> Pubkey;

    async fn sign_and_submit(
        &self,
        instructions: Vec<Instruction>,
    ) -> Result<Signature, LedgerError>;
}

// ============================================================================
// HTTP Transport
// ============================================================================

/// RPC response wrapper
#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct AccountInfo {
    data: (String, String), // (data, encoding)
}

#[derive(Debug, Deserialize)]
struct ValueWrapper<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct KeyedAccount {
    pubkey: String,
    account: AccountInfo,
}

/// JSON-RPC 2.0 ledger client over ureq
pub struct HttpLedgerRpc {
    url: String,
    commitment: String,
    agent: ureq::Agent,
}

impl HttpLedgerRpc {
    pub fn new(config: &SdkConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.http.connect_timeout())
            .timeout_read(config.http.read_timeout())
            .build();

        Self {
            url: config.rpc_url.clone(),
            commitment: config.commitment.clone(),
            agent,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Make a JSON-RPC call
    async fn call<T>(&self, method: &str, params: Value) -> Result<T, LedgerError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        debug!("RPC call: {} with params: {}", method, params);

        // ureq is blocking
        let response_body = tokio::task::spawn_blocking({
            let agent = self.agent.clone();
            let url = self.url.clone();
            let body = request_body.to_string();

            move || post_json(&agent, &url, &body)
        })
        .await
        .map_err(LedgerError::unreachable)??;

        let rpc_response: RpcResponse<T> =
            serde_json::from_str(&response_body).map_err(LedgerError::malformed)?;

        if let Some(error) = rpc_response.error {
            return Err(LedgerError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response
            .result
            .ok_or_else(|| LedgerError::malformed("No result in RPC response"))
    }

    fn account_config(&self) -> Value {
        json!({
            "encoding": "base64",
            "commitment": self.commitment,
        })
    }
}

fn post_json(agent: &ureq::Agent, url: &str, body: &str) -> Result<String, LedgerError> {
    let response = agent
        .post(url)
        .set("Content-Type", "application/json")
        .send_string(body)
        .map_err(|e| match e {
            ureq::Error::Status(code, response) => LedgerError::Rpc {
                code: code as i64,
                message: response.status_text().to_string(),
            },
            ureq::Error::Transport(transport) => {
                let reason = transport.to_string();
                if reason.contains("timed out") {
                    LedgerError::Timeout { reason }
                } else {
                    LedgerError::Unreachable { reason }
                }
            }
        })?;

    response.into_string().map_err(LedgerError::unreachable)
}

fn decode_account_data(info: &AccountInfo) -> Result<Vec<u8>, LedgerError> {
    if info.data.1 != "base64" {
        return Err(LedgerError::malformed(format!(
            "Unsupported data encoding: {}",
            info.data.1
        )));
    }
    base64::engine::general_purpose::STANDARD
        .decode(&info.data.0)
        .map_err(|e| LedgerError::malformed(format!("Failed to decode account data: {}", e)))
}

#[async_trait]
impl LedgerRpc for HttpLedgerRpc {
    async fn get_account_data(&self, address: &Pubkey) -> Result<Option<Vec<u8>>, LedgerError> {
        let params = json!([address.to_string(), self.account_config()]);
        let response: ValueWrapper<Option<AccountInfo>> =
            self.call("getAccountInfo", params).await?;

        response.value.as_ref().map(decode_account_data).transpose()
    }

    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Vec<u8>>>, LedgerError> {
        let keys: Vec<String> = addresses.iter().map(|a| a.to_string()).collect();
        let params = json!([keys, self.account_config()]);
        let response: ValueWrapper<Vec<Option<AccountInfo>>> =
            self.call("getMultipleAccounts", params).await?;

        response
            .value
            .iter()
            .map(|info| info.as_ref().map(decode_account_data).transpose())
            .collect()
    }

    async fn get_program_accounts(
        &self,
        program: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<IndexState<ProgramAccounts>, LedgerError> {
        let filters: Vec<Value> = filters.iter().map(AccountFilter::to_rpc_json).collect();
        let params = json!([
            program.to_string(),
            {
                "encoding": "base64",
                "commitment": self.commitment,
                "filters": filters,
            }
        ]);

        let response: Vec<KeyedAccount> = match self.call("getProgramAccounts", params).await {
            Ok(response) => response,
            Err(LedgerError::Rpc { code, message })
                if code == RPC_NOT_INDEXED || code == RPC_METHOD_NOT_FOUND =>
            {
                debug!("Program account scan unavailable ({}): {}", code, message);
                return Ok(IndexState::NotIndexed);
            }
            Err(e) => return Err(e),
        };

        let mut accounts = Vec::with_capacity(response.len());
        for keyed in response {
            let pubkey = keyed
                .pubkey
                .parse()
                .map_err(|e| LedgerError::malformed(format!("Failed to parse pubkey: {}", e)))?;
            accounts.push((pubkey, decode_account_data(&keyed.account)?));
        }
        Ok(IndexState::Ready(accounts))
    }
}
