//! Chain registry: which providers serve which network, and in what order

use crate::config::ProvidersConfig;
use crate::connectors::{
    BitcoindConnector, BlockchainInfoConnector, BlockcypherConnector, BlockrIoConnector,
    Connector, EtherscanConnector,
};
use crate::errors::{ConnectorError, ConnectorResult};
use crate::types::Chain;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Data providers with a connector implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    BlockchainInfo,
    Blockcypher,
    BlockrIo,
    BitcoindRpc,
    Etherscan,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::BlockchainInfo,
        ProviderKind::Blockcypher,
        ProviderKind::BlockrIo,
        ProviderKind::BitcoindRpc,
        ProviderKind::Etherscan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::BlockchainInfo => "blockchain_info",
            ProviderKind::Blockcypher => "blockcypher",
            ProviderKind::BlockrIo => "blockr_io",
            ProviderKind::BitcoindRpc => "bitcoind_rpc",
            ProviderKind::Etherscan => "etherscan",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalised.as_str() {
            "blockchain_info" | "blockchaininfo" => Ok(ProviderKind::BlockchainInfo),
            "blockcypher" => Ok(ProviderKind::Blockcypher),
            "blockr_io" | "blockrio" => Ok(ProviderKind::BlockrIo),
            "bitcoind_rpc" | "bitcoind" => Ok(ProviderKind::BitcoindRpc),
            "etherscan" => Ok(ProviderKind::Etherscan),
            _ => Err(format!(
                "unknown provider '{}' (expected one of: {})",
                s,
                ProviderKind::ALL
                    .iter()
                    .map(ProviderKind::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

/// Networks a provider can serve
pub fn supported_chains(provider: ProviderKind) -> &'static [Chain] {
    match provider {
        ProviderKind::BlockchainInfo => &[Chain::BitcoinMainnet],
        ProviderKind::Blockcypher | ProviderKind::BlockrIo | ProviderKind::BitcoindRpc => {
            &[Chain::BitcoinMainnet, Chain::BitcoinTestnet]
        }
        ProviderKind::Etherscan => &[Chain::EthereumMainnet, Chain::EthereumRopsten],
    }
}

pub fn supports(provider: ProviderKind, chain: Chain) -> bool {
    supported_chains(provider).contains(&chain)
}

/// Provider order used when the configuration does not name one
///
/// The full node is never in a default route; it has to be opted into.
pub fn default_provider_order(chain: Chain) -> &'static [ProviderKind] {
    match chain {
        Chain::BitcoinMainnet => &[
            ProviderKind::BlockchainInfo,
            ProviderKind::Blockcypher,
            ProviderKind::BlockrIo,
        ],
        Chain::BitcoinTestnet => &[ProviderKind::Blockcypher, ProviderKind::BlockrIo],
        Chain::EthereumMainnet | Chain::EthereumRopsten => &[ProviderKind::Etherscan],
    }
}

/// Construct a connector for `provider` on `chain` from its explicit config
pub fn build_connector(
    provider: ProviderKind,
    chain: Chain,
    config: &ProvidersConfig,
) -> ConnectorResult<Arc<dyn Connector>> {
    if !supports(provider, chain) {
        return Err(ConnectorError::UnsupportedChain { provider, chain });
    }

    let connector: Arc<dyn Connector> = match provider {
        ProviderKind::BlockchainInfo => Arc::new(BlockchainInfoConnector::new(
            chain,
            &config.blockchain_info,
        )?),
        ProviderKind::Blockcypher => {
            Arc::new(BlockcypherConnector::new(chain, &config.blockcypher)?)
        }
        ProviderKind::BlockrIo => Arc::new(BlockrIoConnector::new(chain, &config.blockr_io)?),
        ProviderKind::BitcoindRpc => Arc::new(BitcoindConnector::new(chain, &config.bitcoind)?),
        ProviderKind::Etherscan => Arc::new(EtherscanConnector::new(chain, &config.etherscan)?),
    };

    Ok(connector)
}
