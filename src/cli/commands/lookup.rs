use super::load_config;
use crate::coordinator::FailoverCoordinator;
use crate::errors::AppResult;
use crate::registry::{self, ProviderKind};
use crate::types::{Chain, TransactionData};
use clap::Args;
use std::path::PathBuf;
use tracing::info;

/// Look up a transaction and print the resolved record as JSON
#[derive(Args)]
pub struct LookupCommand {
    /// Transaction id (Ethereum ids carry the 0x prefix)
    pub txid: String,

    /// Chain to resolve against
    #[arg(long, default_value = "bitcoin-mainnet")]
    pub chain: Chain,

    /// Provider to try, in order (repeatable); overrides the configured order
    #[arg(long = "provider")]
    pub providers: Vec<ProviderKind>,

    /// Configuration file (defaults to ./config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fail over past providers whose response cannot be parsed
    #[arg(long)]
    pub fail_over_on_malformed: bool,
}

impl LookupCommand {
    pub async fn run(&self) -> AppResult<()> {
        let data = self.execute().await?;
        println!("{}", serde_json::to_string_pretty(&data)?);
        Ok(())
    }

    pub async fn execute(&self) -> AppResult<TransactionData> {
        let mut config = load_config(self.config.as_deref())?;
        if self.fail_over_on_malformed {
            config.lookup.fail_over_on_malformed = true;
        }

        let coordinator = if self.providers.is_empty() {
            FailoverCoordinator::from_config(&config)?
        } else {
            let mut coordinator = FailoverCoordinator::new(config.lookup.fail_over_on_malformed);
            for provider in &self.providers {
                coordinator.register(registry::build_connector(
                    *provider,
                    self.chain,
                    &config.providers,
                )?);
            }
            coordinator
        };

        info!(
            "Looking up {} on {} via [{}]",
            self.txid,
            self.chain,
            coordinator
                .providers_for(self.chain)
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(coordinator.lookup(&self.txid, self.chain).await?)
    }
}
