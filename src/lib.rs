//! Certificate transaction lookup
//!
//! Resolves a transaction id on a given chain to the proof payload, signing
//! address and revoked addresses a certificate verifier needs, through
//! interchangeable provider connectors with ordered failover.

pub mod cli;
pub mod config;
pub mod connectors;
pub mod coordinator;
pub mod decoder;
pub mod errors;
pub mod registry;
pub mod rpc;
pub mod types;

pub use connectors::{Connector, RawResponse};
pub use coordinator::FailoverCoordinator;
pub use errors::{ConnectorError, ConnectorResult};
pub use registry::ProviderKind;
pub use types::{Chain, TransactionData};
