use crate::config::BitcoinRpcConfig;
use crate::connectors::RawTransactionSource;
use crate::errors::{RpcError, RpcResult};
use crate::rpc::run_blocking;
use async_trait::async_trait;
use corepc_client::client_sync::{v28::Client, Auth};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Bitcoin Core error messages meaning the node does not know the txid
const NOT_FOUND_MESSAGES: [&str; 2] = [
    "No such mempool or blockchain transaction",
    "Invalid or non-wallet transaction id",
];

/// Bitcoin Core JSON-RPC client
///
/// Calls are raw JSON so the connector sees the node's reply as-is.
#[derive(Clone)]
pub struct BitcoindRpcClient {
    client: Arc<Client>,
    timeout_seconds: u64,
}

impl BitcoindRpcClient {
    /// Create a client. No request is made until the first call.
    pub fn new(config: &BitcoinRpcConfig) -> RpcResult<Self> {
        let auth = Auth::UserPass(config.username.clone(), config.password.clone());
        let client = Client::new_with_auth(&config.url, auth).map_err(|e| {
            RpcError::ConnectionFailed(format!("Failed to create Bitcoin RPC client: {}", e))
        })?;

        Ok(Self {
            client: Arc::new(client),
            timeout_seconds: config.timeout_seconds,
        })
    }

    /// Issue one JSON-RPC call on the blocking pool
    pub async fn call(&self, method: &'static str, args: Vec<Value>) -> RpcResult<Value> {
        let client = Arc::clone(&self.client);

        run_blocking(method, self.timeout_seconds, move || -> RpcResult<Value> {
            client
                .call::<Value>(method, &args)
                .map_err(|e| RpcError::CallFailed {
                    method: method.to_string(),
                    message: e.to_string(),
                })
        })
        .await
    }

    /// Check connectivity with `getblockchaininfo`
    pub async fn test_connection(&self) -> RpcResult<Value> {
        let info = self.call("getblockchaininfo", Vec::new()).await.map_err(|e| {
            RpcError::ConnectionFailed(format!(
                "Failed to connect to Bitcoin RPC - check URL, credentials, and that Bitcoin Core is running: {}",
                e
            ))
        })?;

        let chain = info.get("chain").and_then(Value::as_str).unwrap_or("unknown");
        let blocks = info.get("blocks").and_then(Value::as_u64).unwrap_or_default();
        info!(
            "Bitcoin Core connection test successful - chain: {}, blocks: {}",
            chain, blocks
        );
        Ok(info)
    }
}

/// Map the node's "unknown transaction" errors onto `TransactionNotFound`
fn classify_not_found(err: RpcError, txid: &str) -> RpcError {
    let message = err.to_string();
    if NOT_FOUND_MESSAGES.iter().any(|m| message.contains(m)) {
        debug!("Transaction {} not found: {}", txid, message);
        return RpcError::TransactionNotFound {
            txid: txid.to_string(),
        };
    }
    err
}

#[async_trait]
impl RawTransactionSource for BitcoindRpcClient {
    async fn get_raw_transaction(&self, txid: &str, verbose: bool) -> RpcResult<Value> {
        self.call("getrawtransaction", vec![json!(txid), json!(verbose)])
            .await
            .map_err(|e| classify_not_found(e, txid))
    }

    async fn get_tx_out(&self, txid: &str, vout: u32) -> RpcResult<Option<Value>> {
        let result = self
            .call("gettxout", vec![json!(txid), json!(vout), json!(true)])
            .await?;

        Ok(match result {
            Value::Null => None,
            utxo => Some(utxo),
        })
    }
}
