//! Blockr.io explorer (`/tx/info/{txid}`)
//!
//! Replies are wrapped in a `{status, data, code, message}` envelope. Output
//! amounts are BTC decimals, sometimes as strings and sometimes as numbers.

use super::http::HttpTransport;
use super::{
    assemble_bitcoin_transaction, ensure_supported, parse_schema, resolve_base_url, Connector,
    RawResponse,
};
use crate::config::ExplorerConfig;
use crate::errors::{ConnectorError, ConnectorResult};
use crate::registry::ProviderKind;
use crate::types::{Chain, Output, TransactionData};
use async_trait::async_trait;
use bitcoin::{Amount, Denomination};
use serde::Deserialize;
use tracing::debug;

pub const MAINNET_URL: &str = "https://btc.blockr.io/api/v1";
pub const TESTNET_URL: &str = "https://tbtc.blockr.io/api/v1";

const PROVIDER: ProviderKind = ProviderKind::BlockrIo;

#[derive(Debug, Deserialize)]
struct Envelope {
    status: String,
    data: Option<RawTx>,
    code: Option<u16>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct RawTx {
    #[serde(default)]
    vins: Vec<RawInput>,
    vouts: Vec<RawOutput>,
}

#[derive(Debug, Deserialize)]
struct RawInput {
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    address: Option<String>,
    amount: BtcAmount,
    n: u32,
    #[serde(default)]
    is_spent: Flag,
    extras: Option<OutputExtras>,
}

#[derive(Debug, Deserialize)]
struct OutputExtras {
    script: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BtcAmount {
    Text(String),
    Number(f64),
}

impl BtcAmount {
    fn to_sat(&self) -> Result<u64, String> {
        let amount = match self {
            BtcAmount::Text(text) => Amount::from_str_in(text.trim(), Denomination::Bitcoin),
            BtcAmount::Number(btc) => Amount::from_btc(*btc),
        };
        amount
            .map(Amount::to_sat)
            .map_err(|e| format!("unparsable amount {:?}: {}", self, e))
    }
}

/// `is_spent` arrives as 0/1 or as a boolean
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Default for Flag {
    fn default() -> Self {
        Flag::Bool(false)
    }
}

impl Flag {
    fn is_set(&self) -> bool {
        match self {
            Flag::Bool(value) => *value,
            Flag::Int(value) => *value != 0,
        }
    }
}

pub struct BlockrIoConnector {
    chain: Chain,
    base_url: String,
    http: HttpTransport,
}

impl BlockrIoConnector {
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
            http: HttpTransport::new(PROVIDER, config.timeout_seconds)?,
        })
    }
}

#[async_trait]
impl Connector for BlockrIoConnector {
    fn provider(&self) -> ProviderKind {
        PROVIDER
    }

    fn chain(&self) -> Chain {
        self.chain
    }

    async fn lookup_tx(&self, txid: &str) -> ConnectorResult<RawResponse> {
        let url = format!("{}/tx/info/{}", self.base_url, txid);
        let body = self.http.get_json(&url, &[], txid).await?;

        let status = body.get("status").and_then(|s| s.as_str()).unwrap_or_default();
        if status == "success" {
            return Ok(body);
        }

        let code = body.get("code").and_then(|c| c.as_u64());
        let message = body
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or_default();
        debug!("{}: status={:?} code={:?} message={:?}", PROVIDER, status, code, message);

        if status == "fail" && code == Some(404) {
            return Err(ConnectorError::NotFound {
                provider: PROVIDER,
                txid: txid.to_string(),
            });
        }
        Err(ConnectorError::network(
            PROVIDER,
            format!("request unsuccessful (status {:?}, code {:?}): {}", status, code, message),
        ))
    }

    fn parse_tx(&self, raw: &RawResponse) -> ConnectorResult<TransactionData> {
        let envelope: Envelope = parse_schema(PROVIDER, raw)?;
        let tx = envelope.data.ok_or_else(|| {
            ConnectorError::malformed(
                PROVIDER,
                format!(
                    "envelope without data (status {}, code {:?}, message {:?})",
                    envelope.status, envelope.code, envelope.message
                ),
            )
        })?;

        let signing_key = tx
            .vins
            .into_iter()
            .next()
            .and_then(|input| input.address)
            .unwrap_or_default();

        let outputs = tx
            .vouts
            .into_iter()
            .map(|raw| {
                let script_hex = raw
                    .extras
                    .and_then(|extras| extras.script)
                    .ok_or_else(|| {
                        ConnectorError::malformed(PROVIDER, format!("vout {} has no script", raw.n))
                    })?;
                let value = raw
                    .amount
                    .to_sat()
                    .map_err(|reason| ConnectorError::malformed(PROVIDER, reason))?;

                Ok(Output {
                    value,
                    script_hex,
                    address: raw.address.filter(|address| !address.is_empty()),
                    spent: raw.is_spent.is_set(),
                    index: raw.n,
                })
            })
            .collect::<ConnectorResult<Vec<Output>>>()?;

        assemble_bitcoin_transaction(PROVIDER, self.chain, &outputs, signing_key)
    }
}
