//! Provider connectors
//!
//! Every provider implements [`Connector`]: `lookup_tx` performs the single
//! outbound call and returns the provider's raw JSON, `parse_tx` turns that
//! JSON into a [`TransactionData`] without any I/O. For the same logical
//! transaction every Bitcoin-family parser yields the same payload and the
//! same revoked set.
//!
//! - **blockchain_info**, **blockcypher**, **blockr_io**: explorer APIs
//! - **bitcoind**: Bitcoin Core JSON-RPC, decoding raw transaction bytes itself
//! - **etherscan**: Ethereum transactions, payload taken from `input`

use crate::decoder::{decode_script_hex, ScriptKind};
use crate::errors::{ConnectorError, ConnectorResult};
use crate::registry::{self, ProviderKind};
use crate::types::{Chain, Output, PayloadError, TransactionData};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use tracing::debug;

pub mod bitcoind;
pub mod blockchain_info;
pub mod blockcypher;
pub mod blockr_io;
pub mod etherscan;
pub mod http;

pub use bitcoind::{BitcoindConnector, RawTransactionSource, SigningKeyStrategy};
pub use blockchain_info::BlockchainInfoConnector;
pub use blockcypher::BlockcypherConnector;
pub use blockr_io::BlockrIoConnector;
pub use etherscan::EtherscanConnector;

/// Provider response exactly as received (JSON body or RPC result)
pub type RawResponse = serde_json::Value;

/// Uniform lookup contract implemented once per provider
#[async_trait]
pub trait Connector: Send + Sync {
    fn provider(&self) -> ProviderKind;

    /// Network this connector instance was configured for
    fn chain(&self) -> Chain;

    /// Fetch the raw transaction. One outbound call (the full-node connector
    /// may need follow-up calls to resolve spent outputs and the signing
    /// input); never retried here.
    async fn lookup_tx(&self, txid: &str) -> ConnectorResult<RawResponse>;

    /// Parse a raw response. Pure.
    fn parse_tx(&self, raw: &RawResponse) -> ConnectorResult<TransactionData>;

    async fn get_transaction(&self, txid: &str) -> ConnectorResult<TransactionData> {
        let raw = self.lookup_tx(txid).await?;
        self.parse_tx(&raw)
    }
}

pub(crate) fn ensure_supported(provider: ProviderKind, chain: Chain) -> ConnectorResult<()> {
    if registry::supports(provider, chain) {
        Ok(())
    } else {
        Err(ConnectorError::UnsupportedChain { provider, chain })
    }
}

/// Deserialize a provider response into its schema type
pub(crate) fn parse_schema<T: DeserializeOwned>(
    provider: ProviderKind,
    raw: &RawResponse,
) -> ConnectorResult<T> {
    T::deserialize(raw).map_err(|e| ConnectorError::malformed(provider, e.to_string()))
}

pub(crate) fn payload_error(provider: ProviderKind, err: PayloadError) -> ConnectorError {
    match err {
        PayloadError::Empty => ConnectorError::MissingProofPayload { provider },
        PayloadError::InvalidHex(_) => ConnectorError::malformed(provider, err.to_string()),
    }
}

/// Shared Bitcoin-family assembly
///
/// Exactly one output must be a data carrier; its payload becomes
/// `op_return` and it is never treated as address-bearing. Every other spent
/// output contributes its address (provider-resolved, else decoded from the
/// script) to the revoked set.
pub(crate) fn assemble_bitcoin_transaction(
    provider: ProviderKind,
    chain: Chain,
    outputs: &[Output],
    signing_key: String,
) -> ConnectorResult<TransactionData> {
    let mut op_return: Option<String> = None;
    let mut revoked_addresses = BTreeSet::new();

    for output in outputs {
        let kind = decode_script_hex(&output.script_hex).map_err(|e| {
            ConnectorError::malformed(provider, format!("output {}: {}", output.index, e))
        })?;

        if let ScriptKind::DataCarrier { .. } = kind {
            if op_return.is_some() {
                return Err(ConnectorError::malformed(
                    provider,
                    "more than one data-carrier output",
                ));
            }
            op_return = kind.payload_hex();
            continue;
        }

        if !output.spent {
            continue;
        }

        let address = output
            .address
            .clone()
            .filter(|address| !address.is_empty())
            .or_else(|| kind.address(chain));
        match address {
            Some(address) => {
                revoked_addresses.insert(address);
            }
            None => debug!(
                "{}: spent output {} has an unsupported script, no address recorded",
                provider, output.index
            ),
        }
    }

    let op_return = op_return.ok_or(ConnectorError::MissingProofPayload { provider })?;

    TransactionData::new(op_return, signing_key, revoked_addresses, chain)
        .map_err(|e| payload_error(provider, e))
}

/// Configured base URL, falling back to the provider default
pub(crate) fn resolve_base_url(configured: Option<&str>, default: &str) -> String {
    configured
        .filter(|url| !url.is_empty())
        .unwrap_or(default)
        .trim_end_matches('/')
        .to_string()
}
