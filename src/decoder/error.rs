//! Decoder-specific error types

/// Result type for decoder operations
pub type DecoderResult<T> = Result<T, DecoderError>;

/// Decoder-specific error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecoderError {
    #[error("Invalid script hex: {0}")]
    InvalidHex(String),

    /// Soft failure: the script is neither a data carrier nor a known
    /// pay-to-hash template. Callers treat the output as non-actionable.
    #[error("Unsupported script")]
    UnsupportedScript,

    #[error("Invalid raw transaction: {0}")]
    InvalidTransaction(String),
}
