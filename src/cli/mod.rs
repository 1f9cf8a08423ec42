use crate::errors::AppResult;
use clap::{Parser, Subcommand};

pub mod commands;

/// Certificate transaction lookup
#[derive(Parser)]
#[command(name = "cert-tx-lookup")]
#[command(about = "Resolve certificate-anchoring transactions across blockchain providers")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Look up a transaction, failing over between the configured providers
    Lookup(commands::lookup::LookupCommand),
    /// Parse a recorded provider response without any network access
    Parse(commands::parse::ParseCommand),
    /// Show which providers serve each chain and in what order
    Providers(commands::providers::ProvidersCommand),
    /// Test Bitcoin RPC connectivity
    TestRpc(commands::test_rpc::TestRpcCommand),
}

pub async fn run() -> AppResult<()> {
    // Uses RUST_LOG environment variable (defaults to "warn" if not set)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Lookup(command) => command.run().await,
        Commands::Parse(command) => command.run(),
        Commands::Providers(command) => command.run(),
        Commands::TestRpc(command) => command.run().await,
    }
}
