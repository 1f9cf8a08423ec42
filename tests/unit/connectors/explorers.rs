use anyhow::Result;
use cert_tx_lookup::config::ExplorerConfig;
use cert_tx_lookup::connectors::{BlockchainInfoConnector, BlockcypherConnector, BlockrIoConnector};
use cert_tx_lookup::errors::ConnectorError;
use cert_tx_lookup::{Chain, Connector};
use serde_json::json;

use crate::common::fixture_registry::{mainnet, testnet, MAINNET_OP_RETURN, MAINNET_REVOKED};
use crate::common::{assert_matches_fixture, load_fixture, parse_fixture};

/// Tests for the Bitcoin-family explorer parsers
///
/// Every fixture explorer reply is parsed offline and compared with the
/// record the fixture registry expects.

#[test]
fn test_blockchain_info_without_spent_outputs() -> Result<()> {
    let data = parse_fixture(&mainnet::BLOCKCHAIN_INFO)?;

    assert_eq!(data.op_return(), MAINNET_OP_RETURN);
    assert!(data.revoked_addresses().is_empty());
    assert_matches_fixture(&data, &mainnet::BLOCKCHAIN_INFO);
    Ok(())
}

#[test]
fn test_blockchain_info_with_spent_output() -> Result<()> {
    let data = parse_fixture(&mainnet::BLOCKCHAIN_INFO_REVOKED)?;

    assert!(data.revoked_addresses().contains(MAINNET_REVOKED));
    assert_eq!(data.revoked_addresses().len(), 1);
    assert!(!data.signing_key_revoked());
    Ok(())
}

#[test]
fn test_blockcypher_fixtures() -> Result<()> {
    for fixture in [mainnet::BLOCKCYPHER, mainnet::BLOCKCYPHER_REVOKED] {
        let data = parse_fixture(&fixture)?;
        assert_matches_fixture(&data, &fixture);
    }
    Ok(())
}

#[test]
fn test_blockr_io_fixtures() -> Result<()> {
    for fixture in [mainnet::BLOCKR_IO_REVOKED, testnet::BLOCKR_IO] {
        let data = parse_fixture(&fixture)?;
        assert_matches_fixture(&data, &fixture);
    }
    Ok(())
}

#[test]
fn test_blockr_io_testnet_addresses_are_testnet() -> Result<()> {
    let data = parse_fixture(&testnet::BLOCKR_IO)?;
    assert!(data.signing_key().starts_with('m') || data.signing_key().starts_with('n'));
    assert_eq!(data.chain(), Chain::BitcoinTestnet);
    Ok(())
}

#[test]
fn test_every_output_spent_except_data_carrier() -> Result<()> {
    let mut raw = load_fixture(mainnet::BLOCKCHAIN_INFO.file)?;
    for output in raw["out"].as_array_mut().unwrap() {
        output["spent"] = json!(true);
    }

    let connector = BlockchainInfoConnector::new(Chain::BitcoinMainnet, &ExplorerConfig::default())?;
    let data = connector.parse_tx(&raw)?;

    let revoked: Vec<&str> = data.revoked_addresses().iter().map(String::as_str).collect();
    assert_eq!(
        revoked,
        vec![MAINNET_REVOKED, "1C1iqyXbk2rXVzGKyvs8HrFH79RMzTQQxA"]
    );
    Ok(())
}

#[test]
fn test_output_without_provider_address_uses_script() -> Result<()> {
    let mut raw = load_fixture(mainnet::BLOCKCYPHER_REVOKED.file)?;
    raw["outputs"][1]["addresses"] = json!(null);

    let connector = BlockcypherConnector::new(Chain::BitcoinMainnet, &ExplorerConfig::default())?;
    let data = connector.parse_tx(&raw)?;
    assert!(data.revoked_addresses().contains(MAINNET_REVOKED));
    Ok(())
}

#[test]
fn test_duplicate_revoked_addresses_collapse() -> Result<()> {
    let mut raw = load_fixture(mainnet::BLOCKCHAIN_INFO_REVOKED.file)?;
    let mut duplicate = raw["out"][1].clone();
    duplicate["n"] = json!(3);
    raw["out"].as_array_mut().unwrap().push(duplicate);

    let connector = BlockchainInfoConnector::new(Chain::BitcoinMainnet, &ExplorerConfig::default())?;
    let data = connector.parse_tx(&raw)?;
    assert_eq!(data.revoked_addresses().len(), 1);
    Ok(())
}

#[test]
fn test_transaction_without_data_carrier() -> Result<()> {
    let mut raw = load_fixture(mainnet::BLOCKR_IO_REVOKED.file)?;
    raw["data"]["vouts"].as_array_mut().unwrap().pop();

    let connector = BlockrIoConnector::new(Chain::BitcoinMainnet, &ExplorerConfig::default())?;
    assert!(matches!(
        connector.parse_tx(&raw),
        Err(ConnectorError::MissingProofPayload { .. })
    ));
    Ok(())
}

#[test]
fn test_unparsable_spent_flag_is_malformed() -> Result<()> {
    let mut raw = load_fixture(mainnet::BLOCKCHAIN_INFO.file)?;
    raw["out"][0]["spent"] = json!("sometimes");

    let connector = BlockchainInfoConnector::new(Chain::BitcoinMainnet, &ExplorerConfig::default())?;
    assert!(matches!(
        connector.parse_tx(&raw),
        Err(ConnectorError::MalformedResponse { .. })
    ));
    Ok(())
}
