//! Supported blockchain networks
//!
//! A `Chain` is carried through every lookup so that address encoding and
//! transaction id validation stay consistent with the network the record was
//! resolved against.

use bitcoin::Network;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Blockchain network targeted by a lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Chain {
    BitcoinMainnet,
    BitcoinTestnet,
    EthereumMainnet,
    EthereumRopsten,
}

impl Chain {
    pub const ALL: [Chain; 4] = [
        Chain::BitcoinMainnet,
        Chain::BitcoinTestnet,
        Chain::EthereumMainnet,
        Chain::EthereumRopsten,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Chain::BitcoinMainnet => "bitcoin-mainnet",
            Chain::BitcoinTestnet => "bitcoin-testnet",
            Chain::EthereumMainnet => "ethereum-mainnet",
            Chain::EthereumRopsten => "ethereum-ropsten",
        }
    }

    pub fn is_bitcoin(&self) -> bool {
        matches!(self, Chain::BitcoinMainnet | Chain::BitcoinTestnet)
    }

    pub fn is_ethereum(&self) -> bool {
        matches!(self, Chain::EthereumMainnet | Chain::EthereumRopsten)
    }

    pub fn is_testnet(&self) -> bool {
        matches!(self, Chain::BitcoinTestnet | Chain::EthereumRopsten)
    }

    /// Bitcoin network used for address encoding, `None` for Ethereum
    pub fn bitcoin_network(&self) -> Option<Network> {
        match self {
            Chain::BitcoinMainnet => Some(Network::Bitcoin),
            Chain::BitcoinTestnet => Some(Network::Testnet),
            Chain::EthereumMainnet | Chain::EthereumRopsten => None,
        }
    }

    /// Check that a transaction id has the shape this chain uses
    ///
    /// Bitcoin ids are 64 hex characters; Ethereum hashes carry a `0x` prefix.
    pub fn is_valid_txid(&self, txid: &str) -> bool {
        let digits = if self.is_ethereum() {
            match txid.strip_prefix("0x") {
                Some(rest) => rest,
                None => return false,
            }
        } else {
            txid
        };

        digits.len() == 64 && digits.chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = String;

    /// Accepts the kebab-case form and its snake_case spelling
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "bitcoin-mainnet" => Ok(Chain::BitcoinMainnet),
            "bitcoin-testnet" => Ok(Chain::BitcoinTestnet),
            "ethereum-mainnet" => Ok(Chain::EthereumMainnet),
            "ethereum-ropsten" => Ok(Chain::EthereumRopsten),
            other => Err(format!(
                "unknown chain '{}' (expected one of: bitcoin-mainnet, bitcoin-testnet, ethereum-mainnet, ethereum-ropsten)",
                other
            )),
        }
    }
}
