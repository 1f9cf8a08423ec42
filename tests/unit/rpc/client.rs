use cert_tx_lookup::config::BitcoinRpcConfig;
use cert_tx_lookup::connectors::SigningKeyStrategy;
use cert_tx_lookup::rpc::BitcoindRpcClient;

/// Tests for the Bitcoin RPC client component
///
/// These tests cover configuration and client construction and do not
/// require a live Bitcoin node.

#[test]
fn test_rpc_config_defaults() {
    let config = BitcoinRpcConfig::default();

    assert_eq!(config.url, "http://localhost:8332");
    assert_eq!(config.timeout_seconds, 60);
    assert!(config.verbose);
    assert!(config.check_spent);
    assert_eq!(config.signing_key_strategy, SigningKeyStrategy::ScriptSig);
}

#[test]
fn test_rpc_config_partial_document() {
    let config: BitcoinRpcConfig = from_json(
        r#"{ "url": "http://10.0.0.2:18332", "signing_key_strategy": "previous_output" }"#,
    );

    assert_eq!(config.url, "http://10.0.0.2:18332");
    assert_eq!(
        config.signing_key_strategy,
        SigningKeyStrategy::PreviousOutput
    );
    // Unset fields keep their defaults
    assert_eq!(config.username, "bitcoin");
    assert!(config.check_spent);
}

#[test]
fn test_client_is_created_without_a_node() {
    let config = BitcoinRpcConfig {
        url: "http://127.0.0.1:1".to_string(),
        timeout_seconds: 1,
        ..BitcoinRpcConfig::default()
    };

    assert!(BitcoindRpcClient::new(&config).is_ok());
}

fn from_json(json: &str) -> BitcoinRpcConfig {
    serde_json::from_str(json).expect("config JSON should deserialize")
}
