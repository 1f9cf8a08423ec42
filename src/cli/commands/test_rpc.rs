use super::load_config;
use crate::errors::{AppError, AppResult};
use crate::rpc::BitcoindRpcClient;
use clap::Args;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{error, info};

/// Test Bitcoin RPC connectivity
#[derive(Args)]
pub struct TestRpcCommand {
    /// Bitcoin RPC URL
    #[arg(long)]
    pub rpc_url: Option<String>,

    /// Bitcoin RPC username
    #[arg(long)]
    pub rpc_username: Option<String>,

    /// Bitcoin RPC password
    #[arg(long)]
    pub rpc_password: Option<String>,

    /// Configuration file (defaults to ./config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl TestRpcCommand {
    pub async fn run(&self) -> AppResult<()> {
        info!("=== Testing Bitcoin RPC Connection ===");

        let mut rpc_config = load_config(self.config.as_deref())?.providers.bitcoind;

        // Override with CLI arguments
        if let Some(url) = &self.rpc_url {
            rpc_config.url = url.clone();
        }
        if let Some(username) = &self.rpc_username {
            rpc_config.username = username.clone();
        }
        if let Some(password) = &self.rpc_password {
            rpc_config.password = password.clone();
        }

        info!("Testing connection to: {}", rpc_config.url);
        info!("Username: {}", rpc_config.username);

        let result = match BitcoindRpcClient::new(&rpc_config) {
            Ok(client) => client.test_connection().await,
            Err(e) => Err(e),
        };

        match result {
            Ok(chain_info) => {
                println!("Bitcoin RPC connection test PASSED");
                println!(
                    "Chain: {}, blocks: {}",
                    chain_info.get("chain").and_then(Value::as_str).unwrap_or("unknown"),
                    chain_info.get("blocks").and_then(Value::as_u64).unwrap_or_default()
                );
                Ok(())
            }
            Err(e) => {
                error!("RPC connection test failed: {}", e);
                println!("Bitcoin RPC connection test FAILED");
                println!("Error: {}", e);
                println!("\nTroubleshooting tips:");
                println!("1. Check that Bitcoin Core is running");
                println!("2. Verify the RPC URL is correct");
                println!("3. Ensure RPC credentials are valid");
                println!("4. Check that RPC server is enabled in bitcoin.conf");

                Err(AppError::Rpc(e))
            }
        }
    }
}
