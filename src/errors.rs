use crate::registry::ProviderKind;
use crate::types::Chain;
use std::fmt;
use thiserror::Error;

/// Application-wide error type for the CLI layer
#[derive(Error, Debug)]
pub enum AppError {
    /// Transaction lookup failures
    #[error("Lookup error: {0}")]
    Connector(#[from] ConnectorError),

    /// Bitcoin RPC operations
    #[error("RPC error: {0}")]
    Rpc(#[from] RpcError),

    /// File I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration issues
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation/parsing
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Lookup and parsing failures raised by connectors and the coordinator
#[derive(Error, Debug)]
pub enum ConnectorError {
    /// Transport, connection or timeout failure reaching a provider
    #[error("{provider}: network error: {message}")]
    Network {
        provider: ProviderKind,
        message: String,
    },

    /// Provider reports the transaction id as unknown
    #[error("{provider}: transaction not found: {txid}")]
    NotFound { provider: ProviderKind, txid: String },

    /// Response arrived but does not match the provider's schema
    #[error("{provider}: malformed response: {reason}")]
    MalformedResponse {
        provider: ProviderKind,
        reason: String,
    },

    /// Well-formed transaction without a data-carrier payload
    #[error("{provider}: transaction carries no proof payload")]
    MissingProofPayload { provider: ProviderKind },

    /// Transaction id does not have the shape the chain uses
    #[error("invalid transaction id for {chain}: {txid}")]
    InvalidTransactionId { chain: Chain, txid: String },

    /// Connector asked to serve a chain it does not support
    #[error("{provider} does not support {chain}")]
    UnsupportedChain { provider: ProviderKind, chain: Chain },

    /// Nothing configured to serve the chain
    #[error("no connectors configured for {chain}")]
    NoConnectors { chain: Chain },

    /// Every configured connector for the chain failed
    #[error("all providers exhausted for {chain}: {}", describe_failures(.failures))]
    AllProvidersExhausted {
        chain: Chain,
        failures: Vec<ProviderFailure>,
    },
}

impl ConnectorError {
    /// Errors that allow the coordinator to move on to the next provider
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ConnectorError::Network { .. } | ConnectorError::NotFound { .. }
        )
    }

    /// Short kind name used in aggregated diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            ConnectorError::Network { .. } => "network",
            ConnectorError::NotFound { .. } => "not_found",
            ConnectorError::MalformedResponse { .. } => "malformed_response",
            ConnectorError::MissingProofPayload { .. } => "missing_proof_payload",
            ConnectorError::InvalidTransactionId { .. } => "invalid_transaction_id",
            ConnectorError::UnsupportedChain { .. } => "unsupported_chain",
            ConnectorError::NoConnectors { .. } => "no_connectors",
            ConnectorError::AllProvidersExhausted { .. } => "all_providers_exhausted",
        }
    }

    pub(crate) fn malformed(provider: ProviderKind, reason: impl Into<String>) -> Self {
        ConnectorError::MalformedResponse {
            provider,
            reason: reason.into(),
        }
    }

    pub(crate) fn network(provider: ProviderKind, message: impl Into<String>) -> Self {
        ConnectorError::Network {
            provider,
            message: message.into(),
        }
    }

    /// Map a full-node transport error onto the connector taxonomy
    pub fn from_rpc(provider: ProviderKind, err: RpcError) -> Self {
        match err {
            RpcError::TransactionNotFound { txid } => ConnectorError::NotFound { provider, txid },
            RpcError::InvalidResponse(reason) => {
                ConnectorError::MalformedResponse { provider, reason }
            }
            other => ConnectorError::Network {
                provider,
                message: other.to_string(),
            },
        }
    }
}

/// One failed attempt recorded by the coordinator
#[derive(Debug)]
pub struct ProviderFailure {
    pub provider: ProviderKind,
    pub error: ConnectorError,
}

impl fmt::Display for ProviderFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.provider, self.error.kind())
    }
}

fn describe_failures(failures: &[ProviderFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// RPC error types
#[derive(Error, Debug)]
pub enum RpcError {
    /// Failed to establish connection to Bitcoin Core RPC server
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// RPC method call failed (covers network errors, authentication, etc.)
    #[error("RPC call failed: {method} - {message}")]
    CallFailed { method: String, message: String },

    /// RPC request timed out
    #[error("Request timeout: {timeout_seconds}s for {operation}")]
    Timeout {
        timeout_seconds: u64,
        operation: String,
    },

    /// RPC returned unexpected or malformed response data
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Transaction not found in blockchain/mempool
    #[error("Transaction not found: {txid}")]
    TransactionNotFound { txid: String },
}

/// Application-wide result type
pub type AppResult<T> = Result<T, AppError>;

/// Result type for connector operations
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Result type for RPC operations
pub type RpcResult<T> = Result<T, RpcError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidData(format!("JSON error: {}", err))
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
