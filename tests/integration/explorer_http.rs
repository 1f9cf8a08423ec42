use anyhow::Result;
use cert_tx_lookup::config::{EtherscanConfig, ExplorerConfig};
use cert_tx_lookup::connectors::{
    BlockchainInfoConnector, BlockcypherConnector, BlockrIoConnector, EtherscanConnector,
};
use cert_tx_lookup::errors::ConnectorError;
use cert_tx_lookup::{Chain, Connector};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::assert_matches_fixture;
use crate::common::fixture_registry::{ethereum, mainnet, testnet, MAINNET_TXID};
use crate::common::load_fixture;

/// HTTP behaviour of the explorer connectors
///
/// Each test points a connector at a local mock server through `base_url`
/// and checks the request it sends and how the reply is classified.

fn explorer_config(base_url: String) -> ExplorerConfig {
    ExplorerConfig {
        base_url: Some(base_url),
        timeout_seconds: 5,
        api_token: None,
    }
}

fn blockchain_info(server: &MockServer) -> Result<BlockchainInfoConnector> {
    Ok(BlockchainInfoConnector::new(
        Chain::BitcoinMainnet,
        &explorer_config(server.uri()),
    )?)
}

#[tokio::test]
async fn test_blockchain_info_lookup() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/rawtx/{}", MAINNET_TXID)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(load_fixture(mainnet::BLOCKCHAIN_INFO.file)?),
        )
        .expect(1)
        .mount(&server)
        .await;

    let connector = blockchain_info(&server)?;
    let data = connector.get_transaction(MAINNET_TXID).await?;
    assert_matches_fixture(&data, &mainnet::BLOCKCHAIN_INFO);
    Ok(())
}

#[tokio::test]
async fn test_http_404_is_not_found() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Transaction not found"))
        .mount(&server)
        .await;

    let connector = blockchain_info(&server)?;
    let err = connector.lookup_tx(MAINNET_TXID).await.unwrap_err();
    assert!(matches!(err, ConnectorError::NotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn test_http_503_is_network_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let connector = blockchain_info(&server)?;
    let err = connector.lookup_tx(MAINNET_TXID).await.unwrap_err();
    assert!(matches!(err, ConnectorError::Network { .. }));
    assert!(err.to_string().contains("503"));
    Ok(())
}

#[tokio::test]
async fn test_non_json_body_is_malformed() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let connector = blockchain_info(&server)?;
    let err = connector.lookup_tx(MAINNET_TXID).await.unwrap_err();
    assert!(matches!(err, ConnectorError::MalformedResponse { .. }));
    Ok(())
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() -> Result<()> {
    let connector = BlockchainInfoConnector::new(
        Chain::BitcoinMainnet,
        &explorer_config("http://127.0.0.1:1".to_string()),
    )?;

    let err = connector.lookup_tx(MAINNET_TXID).await.unwrap_err();
    assert!(matches!(err, ConnectorError::Network { .. }));
    Ok(())
}

#[tokio::test]
async fn test_blockcypher_sends_limit_and_token() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/btc/main/txs/{}", MAINNET_TXID)))
        .and(query_param("limit", "500"))
        .and(query_param("token", "secret-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(load_fixture(mainnet::BLOCKCYPHER_REVOKED.file)?),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = ExplorerConfig {
        api_token: Some("secret-token".to_string()),
        ..explorer_config(format!("{}/v1/btc/main/", server.uri()))
    };
    let connector = BlockcypherConnector::new(Chain::BitcoinMainnet, &config)?;

    let data = connector.get_transaction(MAINNET_TXID).await?;
    assert_matches_fixture(&data, &mainnet::BLOCKCYPHER_REVOKED);
    Ok(())
}

#[tokio::test]
async fn test_blockr_io_success_envelope() -> Result<()> {
    let fixture = testnet::BLOCKR_IO;
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/tx/info/{}", fixture.txid)))
        .respond_with(ResponseTemplate::new(200).set_body_json(load_fixture(fixture.file)?))
        .mount(&server)
        .await;

    let connector = BlockrIoConnector::new(Chain::BitcoinTestnet, &explorer_config(server.uri()))?;
    let data = connector.get_transaction(fixture.txid).await?;
    assert_matches_fixture(&data, &fixture);
    Ok(())
}

#[tokio::test]
async fn test_blockr_io_fail_envelope_with_404_code_is_not_found() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "fail",
            "data": MAINNET_TXID,
            "code": 404,
            "message": "Transaction not found"
        })))
        .mount(&server)
        .await;

    let connector = BlockrIoConnector::new(Chain::BitcoinMainnet, &explorer_config(server.uri()))?;
    let err = connector.lookup_tx(MAINNET_TXID).await.unwrap_err();
    assert!(matches!(err, ConnectorError::NotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn test_blockr_io_error_envelope_is_network_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "data": null,
            "code": 500,
            "message": "Internal error"
        })))
        .mount(&server)
        .await;

    let connector = BlockrIoConnector::new(Chain::BitcoinMainnet, &explorer_config(server.uri()))?;
    let err = connector.lookup_tx(MAINNET_TXID).await.unwrap_err();
    assert!(matches!(err, ConnectorError::Network { .. }));
    Ok(())
}

fn etherscan_config(server: &MockServer) -> EtherscanConfig {
    EtherscanConfig {
        base_url: Some(server.uri()),
        timeout_seconds: 5,
        api_key: "test-key".to_string(),
    }
}

#[tokio::test]
async fn test_etherscan_proxy_query() -> Result<()> {
    let fixture = ethereum::ETHERSCAN;
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .and(query_param("module", "proxy"))
        .and(query_param("action", "eth_getTransactionByHash"))
        .and(query_param("txhash", fixture.txid))
        .and(query_param("apikey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(load_fixture(fixture.file)?))
        .expect(1)
        .mount(&server)
        .await;

    let connector = EtherscanConnector::new(Chain::EthereumMainnet, &etherscan_config(&server))?;
    let data = connector.get_transaction(fixture.txid).await?;
    assert_matches_fixture(&data, &fixture);
    Ok(())
}

#[tokio::test]
async fn test_etherscan_null_result_is_not_found() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(load_fixture(ethereum::ETHERSCAN_NOT_FOUND)?),
        )
        .mount(&server)
        .await;

    let connector = EtherscanConnector::new(Chain::EthereumMainnet, &etherscan_config(&server))?;
    let err = connector
        .lookup_tx(ethereum::ETHERSCAN.txid)
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectorError::NotFound { .. }));
    Ok(())
}

#[tokio::test]
async fn test_etherscan_string_result_is_network_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "0",
            "message": "NOTOK",
            "result": "Max rate limit reached"
        })))
        .mount(&server)
        .await;

    let connector = EtherscanConnector::new(Chain::EthereumMainnet, &etherscan_config(&server))?;
    let err = connector
        .lookup_tx(ethereum::ETHERSCAN.txid)
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectorError::Network { .. }));
    assert!(err.to_string().contains("Max rate limit reached"));
    Ok(())
}

#[tokio::test]
async fn test_etherscan_error_object_is_network_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32602, "message": "invalid argument 0: hex string has length 4" }
        })))
        .mount(&server)
        .await;

    let connector = EtherscanConnector::new(Chain::EthereumMainnet, &etherscan_config(&server))?;
    let err = connector
        .lookup_tx(ethereum::ETHERSCAN.txid)
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectorError::Network { .. }));
    Ok(())
}
