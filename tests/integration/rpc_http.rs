use anyhow::Result;
use cert_tx_lookup::config::BitcoinRpcConfig;
use cert_tx_lookup::connectors::{BitcoindConnector, RawTransactionSource};
use cert_tx_lookup::errors::RpcError;
use cert_tx_lookup::rpc::BitcoindRpcClient;
use cert_tx_lookup::{Chain, Connector};
use serde_json::{json, Value};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use crate::common::fixture_registry::testnet::{BITCOIND, BITCOIND_OUTPUT_0, BITCOIND_TXID};
use crate::common::load_fixture;

/// Bitcoin Core JSON-RPC over HTTP
///
/// A mock server answers the node methods the full-node connector uses,
/// echoing each request id the way bitcoind does.

/// Canned node: `getrawtransaction` serves one transaction, `gettxout`
/// reports the listed outputs as spent
struct NodeReplies {
    transaction: Value,
    spent: Vec<u64>,
}

impl Respond for NodeReplies {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: Value = serde_json::from_slice(&request.body).unwrap_or_default();
        let params = &body["params"];

        let (result, error) = match body["method"].as_str() {
            Some("getrawtransaction") if params[0] == json!(BITCOIND_TXID) => {
                (self.transaction.clone(), Value::Null)
            }
            Some("getrawtransaction") => (
                Value::Null,
                json!({
                    "code": -5,
                    "message": "No such mempool or blockchain transaction. Use gettransaction for wallet transactions."
                }),
            ),
            Some("gettxout") if params[1].as_u64().map_or(false, |v| self.spent.contains(&v)) => {
                (Value::Null, Value::Null)
            }
            Some("gettxout") => (json!({ "confirmations": 12, "value": 0.0000275 }), Value::Null),
            Some("getblockchaininfo") => (json!({ "chain": "test", "blocks": 1_200_000 }), Value::Null),
            _ => (
                Value::Null,
                json!({ "code": -32601, "message": "Method not found" }),
            ),
        };

        ResponseTemplate::new(200).set_body_json(json!({
            "result": result,
            "error": error,
            "id": body["id"],
        }))
    }
}

async fn start_node(spent: Vec<u64>) -> Result<(MockServer, BitcoinRpcConfig)> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(NodeReplies {
            transaction: load_fixture(BITCOIND.file)?,
            spent,
        })
        .mount(&server)
        .await;

    let config = BitcoinRpcConfig {
        url: server.uri(),
        timeout_seconds: 5,
        ..BitcoinRpcConfig::default()
    };
    Ok((server, config))
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connection_reports_chain_info() -> Result<()> {
    let (_server, config) = start_node(Vec::new()).await?;
    let client = BitcoindRpcClient::new(&config)?;

    let info = client.test_connection().await?;
    assert_eq!(info["chain"], "test");
    assert_eq!(info["blocks"], 1_200_000);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_transaction_is_classified() -> Result<()> {
    let (_server, config) = start_node(Vec::new()).await?;
    let client = BitcoindRpcClient::new(&config)?;

    let err = client
        .get_raw_transaction(&"00".repeat(32), true)
        .await
        .unwrap_err();
    assert!(matches!(err, RpcError::TransactionNotFound { .. }));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_null_gettxout_is_spent() -> Result<()> {
    let (_server, config) = start_node(vec![0]).await?;
    let client = BitcoindRpcClient::new(&config)?;

    assert!(client.get_tx_out(BITCOIND_TXID, 0).await?.is_none());
    assert!(client.get_tx_out(BITCOIND_TXID, 2).await?.is_some());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connector_over_rpc() -> Result<()> {
    let (_server, config) = start_node(vec![0]).await?;
    let connector = BitcoindConnector::new(Chain::BitcoinTestnet, &config)?;

    let data = connector.get_transaction(BITCOIND_TXID).await?;
    assert_eq!(data.op_return(), BITCOIND.op_return);
    assert_eq!(data.signing_key(), BITCOIND.signing_key);
    assert!(data.revoked_addresses().contains(BITCOIND_OUTPUT_0));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn test_closed_port_fails_connection_test() -> Result<()> {
    let config = BitcoinRpcConfig {
        url: "http://127.0.0.1:1".to_string(),
        timeout_seconds: 5,
        ..BitcoinRpcConfig::default()
    };
    let client = BitcoindRpcClient::new(&config)?;

    assert!(matches!(
        client.test_connection().await,
        Err(RpcError::ConnectionFailed(_))
    ));
    Ok(())
}
