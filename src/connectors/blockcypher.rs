//! Blockcypher explorer (`/txs/{txid}`)

use super::http::HttpTransport;
use super::{
    assemble_bitcoin_transaction, ensure_supported, parse_schema, resolve_base_url, Connector,
    RawResponse,
};
use crate::config::ExplorerConfig;
use crate::errors::ConnectorResult;
use crate::registry::ProviderKind;
use crate::types::{Chain, Output, TransactionData};
use async_trait::async_trait;
use serde::Deserialize;

pub const MAINNET_URL: &str = "https://api.blockcypher.com/v1/btc/main";
pub const TESTNET_URL: &str = "https://api.blockcypher.com/v1/btc/test3";

const PROVIDER: ProviderKind = ProviderKind::Blockcypher;

/// Blockcypher truncates `outputs` at 20 entries unless asked for more
const OUTPUT_LIMIT: &str = "500";

#[derive(Debug, Deserialize)]
struct RawTx {
    #[serde(default)]
    inputs: Vec<RawInput>,
    outputs: Vec<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawInput {
    addresses: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    value: u64,
    script: String,
    addresses: Option<Vec<String>>,
    spent_by: Option<String>,
}

pub struct BlockcypherConnector {
    chain: Chain,
    base_url: String,
    token: Option<String>,
    http: HttpTransport,
}

impl BlockcypherConnector {
    pub fn new(chain: Chain, config: &ExplorerConfig) -> ConnectorResult<Self> {
        ensure_supported(PROVIDER, chain)?;

        let default_url = if chain.is_testnet() {
            TESTNET_URL
        } else {
            MAINNET_URL
        };

        Ok(Self {
            chain,
            base_url: resolve_base_url(config.base_url.as_deref(), default_url),
            token: config.api_token.clone().filter(|token| !token.is_empty()),
            http: HttpTransport::new(PROVIDER, config.timeout_seconds)?,
        })
    }
}

#[async_trait]
impl Connector for BlockcypherConnector {
    fn provider(&self) -> ProviderKind {
        PROVIDER
    }

    fn chain(&self) -> Chain {
        self.chain
    }

    async fn lookup_tx(&self, txid: &str) -> ConnectorResult<RawResponse> {
        let url = format!("{}/txs/{}", self.base_url, txid);
        let mut query = vec![("limit", OUTPUT_LIMIT)];
        if let Some(token) = &self.token {
            query.push(("token", token.as_str()));
        }
        self.http.get_json(&url, &query, txid).await
    }

    fn parse_tx(&self, raw: &RawResponse) -> ConnectorResult<TransactionData> {
        let tx: RawTx = parse_schema(PROVIDER, raw)?;

        let signing_key = tx
            .inputs
            .into_iter()
            .next()
            .and_then(|input| input.addresses)
            .and_then(|addresses| addresses.into_iter().next())
            .unwrap_or_default();

        let outputs: Vec<Output> = tx
            .outputs
            .into_iter()
            .enumerate()
            .map(|(index, raw)| Output {
                value: raw.value,
                script_hex: raw.script,
                address: raw.addresses.and_then(|addresses| addresses.into_iter().next()),
                spent: raw.spent_by.is_some(),
                index: index as u32,
            })
            .collect();

        assemble_bitcoin_transaction(PROVIDER, self.chain, &outputs, signing_key)
    }
}
