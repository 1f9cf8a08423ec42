use crate::connectors::SigningKeyStrategy;
use crate::registry::{self, ProviderKind};
use crate::types::Chain;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

const ENV_PREFIX: &str = "CERT_TX";

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Application configuration loaded from config.toml and environment variables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub providers: ProvidersConfig,
    pub lookup: LookupConfig,
}

/// One explicit configuration value per provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub blockchain_info: ExplorerConfig,
    pub blockcypher: ExplorerConfig,
    pub blockr_io: ExplorerConfig,
    pub etherscan: EtherscanConfig,
    pub bitcoind: BitcoinRpcConfig,
}

/// Public block explorer endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Overrides the per-chain default endpoint
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
    pub api_token: Option<String>,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            api_token: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EtherscanConfig {
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
    pub api_key: String,
}

impl Default for EtherscanConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            api_key: String::new(),
        }
    }
}

/// Bitcoin Core RPC endpoint for the full-node connector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BitcoinRpcConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub timeout_seconds: u64,
    /// Request the decoded object rather than the bare hex string
    pub verbose: bool,
    /// Resolve spent outputs with `gettxout`
    pub check_spent: bool,
    pub signing_key_strategy: SigningKeyStrategy,
}

impl Default for BitcoinRpcConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8332".to_string(),
            username: "bitcoin".to_string(),
            password: "password".to_string(),
            timeout_seconds: 60,
            verbose: true,
            check_spent: true,
            signing_key_strategy: SigningKeyStrategy::default(),
        }
    }
}

/// Provider order per chain and failover policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupConfig {
    pub bitcoin_mainnet: Option<Vec<ProviderKind>>,
    pub bitcoin_testnet: Option<Vec<ProviderKind>>,
    pub ethereum_mainnet: Option<Vec<ProviderKind>>,
    pub ethereum_ropsten: Option<Vec<ProviderKind>>,
    /// Advance past a provider whose response fails to parse
    pub fail_over_on_malformed: bool,
}

impl LookupConfig {
    /// Configured provider order for `chain`, or the registry default
    pub fn order_for(&self, chain: Chain) -> Vec<ProviderKind> {
        let configured = match chain {
            Chain::BitcoinMainnet => &self.bitcoin_mainnet,
            Chain::BitcoinTestnet => &self.bitcoin_testnet,
            Chain::EthereumMainnet => &self.ethereum_mainnet,
            Chain::EthereumRopsten => &self.ethereum_ropsten,
        };

        configured
            .clone()
            .unwrap_or_else(|| registry::default_provider_order(chain).to_vec())
    }
}

impl AppConfig {
    /// Load configuration from config.toml and environment variables
    /// Environment variables take precedence over file configuration
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Same as [`AppConfig::load`], reading `path` instead of ./config.toml
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path),
            None => File::with_name("config").required(false),
        };

        let config = Config::builder()
            .add_source(file)
            // CERT_TX_PROVIDERS__ETHERSCAN__API_KEY -> providers.etherscan.api_key
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("lookup.bitcoin_mainnet")
                    .with_list_parse_key("lookup.bitcoin_testnet")
                    .with_list_parse_key("lookup.ethereum_mainnet")
                    .with_list_parse_key("lookup.ethereum_ropsten"),
            )
            .build()?;

        let mut app_config: AppConfig = config.try_deserialize()?;

        // Check for specific environment variables with custom names
        if let Ok(api_key) = env::var("ETHERSCAN_API_KEY") {
            app_config.providers.etherscan.api_key = api_key;
        }
        if let Ok(token) = env::var("BLOCKCYPHER_TOKEN") {
            app_config.providers.blockcypher.api_token = Some(token);
        }
        if let Ok(url) = env::var("BITCOIN_RPC_URL") {
            app_config.providers.bitcoind.url = url;
        }
        if let Ok(username) = env::var("BITCOIN_RPC_USERNAME") {
            app_config.providers.bitcoind.username = username;
        }
        if let Ok(password) = env::var("BITCOIN_RPC_PASSWORD") {
            app_config.providers.bitcoind.password = password;
        }

        app_config.validate()?;
        Ok(app_config)
    }

    /// Every configured provider must be able to serve the chain it is listed for,
    /// and every provider timeout must be non-zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timeouts = [
            ("blockchain_info", self.providers.blockchain_info.timeout_seconds),
            ("blockcypher", self.providers.blockcypher.timeout_seconds),
            ("blockr_io", self.providers.blockr_io.timeout_seconds),
            ("etherscan", self.providers.etherscan.timeout_seconds),
            ("bitcoind", self.providers.bitcoind.timeout_seconds),
        ];
        for (provider, timeout_seconds) in timeouts {
            if timeout_seconds == 0 {
                return Err(ConfigError::Message(format!(
                    "providers.{}.timeout_seconds must be greater than zero",
                    provider
                )));
            }
        }

        for chain in Chain::ALL {
            for provider in self.lookup.order_for(chain) {
                if !registry::supports(provider, chain) {
                    return Err(ConfigError::Message(format!(
                        "provider {} is configured for {} but does not support it",
                        provider, chain
                    )));
                }
            }
        }
        Ok(())
    }
}
