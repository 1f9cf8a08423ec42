//! Blockchain.info explorer (`/rawtx/{txid}`)

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

pub const MAINNET_URL: &str = "https://blockchain.info";

const PROVIDER: ProviderKind = ProviderKind::BlockchainInfo;

#[derive(Debug, Deserialize)]
struct RawTx {
    #[serde(default)]
    inputs: Vec<RawInput>,
    out: Vec<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawInput {
    prev_out: Option<PrevOut>,
}

#[derive(Debug, Deserialize)]
struct PrevOut {
    addr: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    value: u64,
    script: String,
    #[serde(default)]
    spent: bool,
    addr: Option<String>,
    n: u32,
}

impl From<RawOutput> for Output {
    fn from(raw: RawOutput) -> Self {
        Output {
            value: raw.value,
            script_hex: raw.script,
            address: raw.addr,
            spent: raw.spent,
            index: raw.n,
        }
    }
}

pub struct BlockchainInfoConnector {
    chain: Chain,
    base_url: String,
    http: HttpTransport,
}

impl BlockchainInfoConnector {
    pub fn new(chain: Chain, config: &ExplorerConfig) -> ConnectorResult<Self> {
        ensure_supported(PROVIDER, chain)?;

        Ok(Self {
            chain,
            base_url: resolve_base_url(config.base_url.as_deref(), MAINNET_URL),
            http: HttpTransport::new(PROVIDER, config.timeout_seconds)?,
        })
    }
}

#[async_trait]
impl Connector for BlockchainInfoConnector {
    fn provider(&self) -> ProviderKind {
        PROVIDER
    }

    fn chain(&self) -> Chain {
        self.chain
    }

    async fn lookup_tx(&self, txid: &str) -> ConnectorResult<RawResponse> {
        let url = format!("{}/rawtx/{}", self.base_url, txid);
        self.http.get_json(&url, &[], txid).await
    }

    fn parse_tx(&self, raw: &RawResponse) -> ConnectorResult<TransactionData> {
        let tx: RawTx = parse_schema(PROVIDER, raw)?;

        let signing_key = tx
            .inputs
            .into_iter()
            .next()
            .and_then(|input| input.prev_out)
            .and_then(|prev_out| prev_out.addr)
            .unwrap_or_default();

        let outputs: Vec<Output> = tx.out.into_iter().map(Output::from).collect();
        assemble_bitcoin_transaction(PROVIDER, self.chain, &outputs, signing_key)
    }
}
