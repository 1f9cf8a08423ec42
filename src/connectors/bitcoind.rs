//! Bitcoin Core full node (`getrawtransaction`)
//!
//! Nothing here is pre-classified by a third party: the raw transaction bytes
//! are decoded locally and every output goes through the script decoder.
//! Spent status and the signing input's previous output are not part of a
//! `getrawtransaction` reply, so `lookup_tx` resolves them with follow-up
//! calls and embeds them in the response it returns. `parse_tx` then reads:
//!
//! - `hex`: the raw transaction (or the whole response when it is a bare string)
//! - `spent_outputs`: indices reported spent by `gettxout`
//! - `vin[0].prevout.scriptPubKey`: address hint for the signing key

use super::{assemble_bitcoin_transaction, ensure_supported, Connector, RawResponse};
use crate::config::BitcoinRpcConfig;
use crate::decoder::raw_tx::signing_input;
use crate::decoder::{
    classify_script, decode_raw_transaction, output_address, script_sig_signing_key,
    transaction_outputs, DecoderError,
};
use crate::errors::{ConnectorError, ConnectorResult, RpcError, RpcResult};
use crate::registry::ProviderKind;
use crate::rpc::BitcoindRpcClient;
use crate::types::{Chain, TransactionData};
use async_trait::async_trait;
use bitcoin::Transaction;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

const PROVIDER: ProviderKind = ProviderKind::BitcoindRpc;

/// The two node calls the connector depends on
#[async_trait]
pub trait RawTransactionSource: Send + Sync {
    /// `getrawtransaction <txid> <verbose>`
    async fn get_raw_transaction(&self, txid: &str, verbose: bool) -> RpcResult<Value>;

    /// `gettxout <txid> <vout> true`; `None` once the output is spent
    async fn get_tx_out(&self, txid: &str, vout: u32) -> RpcResult<Option<Value>>;
}

/// How the signing key of a full-node lookup is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SigningKeyStrategy {
    /// Use the prevout the node embedded (verbosity 2), else the first
    /// input's scriptSig
    #[default]
    ScriptSig,
    /// Fetch the previous transaction and decode the spent output
    PreviousOutput,
}

pub struct BitcoindConnector<S = BitcoindRpcClient> {
    chain: Chain,
    source: S,
    verbose: bool,
    check_spent: bool,
    strategy: SigningKeyStrategy,
}

impl BitcoindConnector<BitcoindRpcClient> {
    pub fn new(chain: Chain, config: &BitcoinRpcConfig) -> ConnectorResult<Self> {
        let client = BitcoindRpcClient::new(config)
            .map_err(|e| ConnectorError::from_rpc(PROVIDER, e))?;
        Self::with_source(chain, client, config)
    }
}

impl<S: RawTransactionSource> BitcoindConnector<S> {
    /// Build the connector over any node-call source
    pub fn with_source(chain: Chain, source: S, config: &BitcoinRpcConfig) -> ConnectorResult<Self> {
        ensure_supported(PROVIDER, chain)?;

        Ok(Self {
            chain,
            source,
            verbose: config.verbose,
            check_spent: config.check_spent,
            strategy: config.signing_key_strategy,
        })
    }

    fn rpc_error(err: RpcError) -> ConnectorError {
        ConnectorError::from_rpc(PROVIDER, err)
    }

    /// Indices of non-data outputs that no longer appear in the UTXO set
    async fn spent_outputs(&self, txid: &str, tx: &Transaction) -> ConnectorResult<Vec<u32>> {
        let mut spent = Vec::new();
        for (index, output) in tx.output.iter().enumerate() {
            if classify_script(output.script_pubkey.as_bytes()).is_data_carrier() {
                continue;
            }
            let index = index as u32;
            let utxo = self
                .source
                .get_tx_out(txid, index)
                .await
                .map_err(Self::rpc_error)?;
            if utxo.is_none() {
                debug!("{}: {}:{} is spent", PROVIDER, txid, index);
                spent.push(index);
            }
        }
        Ok(spent)
    }

    /// scriptPubKey hex of the output the first input spends
    ///
    /// A previous transaction the node cannot serve (no txindex) leaves the
    /// key to the scriptSig fallback.
    async fn previous_output_script(&self, tx: &Transaction) -> ConnectorResult<Option<String>> {
        let Some(input) = signing_input(tx) else {
            return Ok(None);
        };
        let prev_txid = input.previous_output.txid.to_string();
        let vout = input.previous_output.vout;

        let prev_raw = match self.source.get_raw_transaction(&prev_txid, false).await {
            Ok(raw) => raw,
            Err(RpcError::TransactionNotFound { .. }) => {
                warn!(
                    "{}: previous transaction {} unavailable, falling back to scriptSig",
                    PROVIDER, prev_txid
                );
                return Ok(None);
            }
            Err(e) => return Err(Self::rpc_error(e)),
        };

        let prev_hex = raw_hex(&prev_raw)?;
        let prev_tx = decode_raw_transaction(prev_hex)
            .map_err(|e| ConnectorError::malformed(PROVIDER, format!("previous transaction: {}", e)))?;
        let output = prev_tx.output.get(vout as usize).ok_or_else(|| {
            ConnectorError::malformed(
                PROVIDER,
                format!("previous transaction {} has no output {}", prev_txid, vout),
            )
        })?;

        Ok(Some(hex::encode(output.script_pubkey.as_bytes())))
    }
}

#[async_trait]
impl<S: RawTransactionSource> Connector for BitcoindConnector<S> {
    fn provider(&self) -> ProviderKind {
        PROVIDER
    }

    fn chain(&self) -> Chain {
        self.chain
    }

    async fn lookup_tx(&self, txid: &str) -> ConnectorResult<RawResponse> {
        let raw = self
            .source
            .get_raw_transaction(txid, self.verbose)
            .await
            .map_err(Self::rpc_error)?;

        let mut response = match raw {
            Value::String(hex) => {
                let mut map = Map::new();
                map.insert("hex".to_string(), Value::String(hex));
                map
            }
            Value::Object(map) => map,
            other => {
                return Err(ConnectorError::malformed(
                    PROVIDER,
                    format!("unexpected getrawtransaction result: {}", other),
                ))
            }
        };

        let needs_prevout = self.strategy == SigningKeyStrategy::PreviousOutput
            && prevout_script(&response).is_none();
        if !self.check_spent && !needs_prevout {
            return Ok(Value::Object(response));
        }

        let tx = {
            let hex = response.get("hex").and_then(Value::as_str).ok_or_else(|| {
                ConnectorError::malformed(PROVIDER, "getrawtransaction result has no hex")
            })?;
            decode_raw_transaction(hex).map_err(|e| ConnectorError::malformed(PROVIDER, e.to_string()))?
        };

        if self.check_spent {
            let spent = self.spent_outputs(txid, &tx).await?;
            response.insert("spent_outputs".to_string(), json!(spent));
        }

        if needs_prevout {
            if let Some(script_hex) = self.previous_output_script(&tx).await? {
                attach_prevout(&mut response, script_hex);
            }
        }

        Ok(Value::Object(response))
    }

    fn parse_tx(&self, raw: &RawResponse) -> ConnectorResult<TransactionData> {
        let tx = decode_raw_transaction(raw_hex(raw)?)
            .map_err(|e| ConnectorError::malformed(PROVIDER, e.to_string()))?;

        let spent = spent_indices(raw)?;
        let outputs = transaction_outputs(&tx, &spent);
        let signing_key = resolve_signing_key(raw, &tx, self.chain)?;

        assemble_bitcoin_transaction(PROVIDER, self.chain, &outputs, signing_key)
    }
}

/// Raw transaction hex from a bare-string or object reply
fn raw_hex(raw: &Value) -> ConnectorResult<&str> {
    match raw {
        Value::String(hex) => Ok(hex.as_str()),
        Value::Object(map) => map
            .get("hex")
            .and_then(Value::as_str)
            .ok_or_else(|| ConnectorError::malformed(PROVIDER, "response has no hex field")),
        _ => Err(ConnectorError::malformed(
            PROVIDER,
            "response is neither a hex string nor an object",
        )),
    }
}

fn spent_indices(raw: &Value) -> ConnectorResult<HashSet<u32>> {
    let Some(list) = raw.get("spent_outputs") else {
        return Ok(HashSet::new());
    };

    let list = list
        .as_array()
        .ok_or_else(|| ConnectorError::malformed(PROVIDER, "spent_outputs is not an array"))?;
    list.iter()
        .map(|index| {
            index
                .as_u64()
                .and_then(|index| u32::try_from(index).ok())
                .ok_or_else(|| {
                    ConnectorError::malformed(PROVIDER, format!("bad spent output index {}", index))
                })
        })
        .collect()
}

fn prevout_script(response: &Map<String, Value>) -> Option<&Value> {
    response
        .get("vin")?
        .get(0)?
        .get("prevout")?
        .get("scriptPubKey")
}

fn attach_prevout(response: &mut Map<String, Value>, script_hex: String) {
    let prevout = json!({ "scriptPubKey": { "hex": script_hex } });

    if let Some(Value::Object(first_input)) = response
        .get_mut("vin")
        .and_then(|vin| vin.get_mut(0))
    {
        first_input.insert("prevout".to_string(), prevout);
        return;
    }
    response.insert("vin".to_string(), json!([{ "prevout": prevout }]));
}

/// Signing key: embedded prevout address, then prevout script, then scriptSig
fn resolve_signing_key(raw: &Value, tx: &Transaction, chain: Chain) -> ConnectorResult<String> {
    if let Some(script_pubkey) = raw.pointer("/vin/0/prevout/scriptPubKey") {
        if let Some(address) = script_pubkey.get("address").and_then(Value::as_str) {
            return Ok(address.to_string());
        }
        if let Some(script_hex) = script_pubkey.get("hex").and_then(Value::as_str) {
            match output_address(script_hex, chain) {
                Ok(address) => return Ok(address),
                Err(DecoderError::UnsupportedScript) => {
                    debug!("{}: prevout script has no address form", PROVIDER)
                }
                Err(e) => {
                    return Err(ConnectorError::malformed(
                        PROVIDER,
                        format!("prevout script: {}", e),
                    ))
                }
            }
        }
    }

    Ok(script_sig_signing_key(tx, chain).unwrap_or_default())
}
