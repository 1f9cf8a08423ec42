use crate::config::AppConfig;
use crate::connectors::RawResponse;
use crate::errors::{AppError, AppResult};
use crate::registry::{self, ProviderKind};
use crate::types::{Chain, TransactionData};
use clap::Args;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Parse a recorded provider response offline
#[derive(Args)]
pub struct ParseCommand {
    /// JSON file holding the provider's raw response
    pub file: PathBuf,

    /// Provider that produced the response
    #[arg(long)]
    pub provider: ProviderKind,

    /// Chain the response belongs to
    #[arg(long, default_value = "bitcoin-mainnet")]
    pub chain: Chain,
}

impl ParseCommand {
    pub fn run(&self) -> AppResult<()> {
        let data = self.execute()?;
        println!("{}", serde_json::to_string_pretty(&data)?);
        Ok(())
    }

    pub fn execute(&self) -> AppResult<TransactionData> {
        let contents = fs::read_to_string(&self.file).map_err(|e| {
            AppError::InvalidData(format!("cannot read {}: {}", self.file.display(), e))
        })?;
        let raw: RawResponse = serde_json::from_str(&contents)?;
        debug!("Parsing {} as {} ({})", self.file.display(), self.provider, self.chain);

        // Parsing is pure, so connector settings never matter here
        let connector =
            registry::build_connector(self.provider, self.chain, &AppConfig::default().providers)?;
        Ok(connector.parse_tx(&raw)?)
    }
}
