//! Bitcoin Core RPC integration module
//!
//! - **Client** - JSON-RPC client over `corepc-client`, feeding the bitcoind connector
//! - **Timeout** - spawn_blocking + timeout wrapper for the synchronous client

pub mod client;
pub mod timeout;

pub use client::BitcoindRpcClient;
pub use timeout::run_blocking;
