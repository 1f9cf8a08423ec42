//! Etherscan proxy API (`eth_getTransactionByHash`)
//!
//! The payload is the transaction `input` verbatim and the signing key is
//! `from`; no script decoding is involved and nothing is ever revoked.

use super::http::HttpTransport;
use super::{ensure_supported, parse_schema, payload_error, resolve_base_url, Connector, RawResponse};
use crate::config::EtherscanConfig;
use crate::errors::{ConnectorError, ConnectorResult};
use crate::registry::ProviderKind;
use crate::types::{Chain, TransactionData};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeSet;

pub const MAINNET_URL: &str = "https://api.etherscan.io";
pub const ROPSTEN_URL: &str = "https://api-ropsten.etherscan.io";

const PROVIDER: ProviderKind = ProviderKind::Etherscan;

#[derive(Debug, Deserialize)]
struct EthTransaction {
    from: String,
    input: String,
}

pub struct EtherscanConnector {
    chain: Chain,
    base_url: String,
    api_key: String,
    http: HttpTransport,
}

impl EtherscanConnector {
    pub fn new(chain: Chain, config: &EtherscanConfig) -> ConnectorResult<Self> {
        ensure_supported(PROVIDER, chain)?;

        let default_url = if chain.is_testnet() {
            ROPSTEN_URL
        } else {
            MAINNET_URL
        };

        Ok(Self {
            chain,
            base_url: resolve_base_url(config.base_url.as_deref(), default_url),
            api_key: config.api_key.clone(),
            http: HttpTransport::new(PROVIDER, config.timeout_seconds)?,
        })
    }
}

#[async_trait]
impl Connector for EtherscanConnector {
    fn provider(&self) -> ProviderKind {
        PROVIDER
    }

    fn chain(&self) -> Chain {
        self.chain
    }

    async fn lookup_tx(&self, txid: &str) -> ConnectorResult<RawResponse> {
        let url = format!("{}/api", self.base_url);
        let query = [
            ("module", "proxy"),
            ("action", "eth_getTransactionByHash"),
            ("txhash", txid),
            ("apikey", self.api_key.as_str()),
        ];
        let body = self.http.get_json(&url, &query, txid).await?;

        if let Some(error) = body.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(ConnectorError::network(PROVIDER, message));
        }

        match body.get("result") {
            Some(Value::Null) => Err(ConnectorError::NotFound {
                provider: PROVIDER,
                txid: txid.to_string(),
            }),
            // Rate limits and key problems come back as a bare string result
            Some(Value::String(message)) => Err(ConnectorError::network(PROVIDER, message.clone())),
            Some(_) => Ok(body),
            None => Err(ConnectorError::malformed(PROVIDER, "response has no result field")),
        }
    }

    fn parse_tx(&self, raw: &RawResponse) -> ConnectorResult<TransactionData> {
        let tx_value = match raw.get("result") {
            Some(result @ Value::Object(_)) => result,
            Some(_) => {
                return Err(ConnectorError::malformed(
                    PROVIDER,
                    "result is not a transaction object",
                ))
            }
            None => raw,
        };
        let tx: EthTransaction = parse_schema(PROVIDER, tx_value)?;

        TransactionData::new(tx.input, tx.from, BTreeSet::new(), self.chain)
            .map_err(|e| payload_error(PROVIDER, e))
    }
}
