use super::load_config;
use crate::errors::AppResult;
use crate::registry::{self, ProviderKind};
use crate::types::Chain;
use clap::Args;
use std::path::PathBuf;

/// Print the support matrix and the effective provider order
#[derive(Args)]
pub struct ProvidersCommand {
    /// Only show this chain
    #[arg(long)]
    pub chain: Option<Chain>,

    /// Configuration file (defaults to ./config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ProvidersCommand {
    pub fn run(&self) -> AppResult<()> {
        let config = load_config(self.config.as_deref())?;

        let chains: Vec<Chain> = match self.chain {
            Some(chain) => vec![chain],
            None => Chain::ALL.to_vec(),
        };

        for chain in chains {
            let supported: Vec<&str> = ProviderKind::ALL
                .iter()
                .filter(|provider| registry::supports(**provider, chain))
                .map(ProviderKind::as_str)
                .collect();
            let order: Vec<String> = config
                .lookup
                .order_for(chain)
                .iter()
                .map(ToString::to_string)
                .collect();

            println!("{}", chain);
            println!("  supported: {}", supported.join(", "));
            println!("  order:     {}", order.join(" -> "));
        }

        if config.lookup.fail_over_on_malformed {
            println!("Malformed responses fail over to the next provider");
        }

        Ok(())
    }
}
