//! Normalised lookup result and per-output intermediate record

use super::Chain;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Proof-bearing record resolved from a single transaction
///
/// Built once from a provider response and never mutated afterwards; the
/// fields are only reachable through accessors. Deserialising goes through
/// the same payload validation as [`TransactionData::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TransactionRecord")]
pub struct TransactionData {
    op_return: String,
    signing_key: String,
    revoked_addresses: BTreeSet<String>,
    chain: Chain,
}

/// Unvalidated wire form of [`TransactionData`]
#[derive(Deserialize)]
struct TransactionRecord {
    op_return: String,
    signing_key: String,
    revoked_addresses: BTreeSet<String>,
    chain: Chain,
}

impl TryFrom<TransactionRecord> for TransactionData {
    type Error = PayloadError;

    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        TransactionData::new(
            record.op_return,
            record.signing_key,
            record.revoked_addresses,
            record.chain,
        )
    }
}

/// Reasons a data-carrier payload is rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("data-carrier payload is empty")]
    Empty,

    #[error("data-carrier payload is not even-length hex: {0}")]
    InvalidHex(String),
}

impl TransactionData {
    /// Validate the payload and assemble the record
    ///
    /// `op_return` must be even-length hex, optionally `0x`-prefixed (Ethereum
    /// input data is kept verbatim).
    pub fn new(
        op_return: String,
        signing_key: String,
        revoked_addresses: BTreeSet<String>,
        chain: Chain,
    ) -> Result<Self, PayloadError> {
        validate_payload_hex(&op_return)?;

        Ok(Self {
            op_return,
            signing_key,
            revoked_addresses,
            chain,
        })
    }

    pub fn op_return(&self) -> &str {
        &self.op_return
    }

    /// Address that authorised the transaction; may be empty
    pub fn signing_key(&self) -> &str {
        &self.signing_key
    }

    pub fn revoked_addresses(&self) -> &BTreeSet<String> {
        &self.revoked_addresses
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// True when the signing key also shows up as a revoked address
    ///
    /// Advisory only: nothing in the lookup path rejects such a record.
    pub fn signing_key_revoked(&self) -> bool {
        !self.signing_key.is_empty() && self.revoked_addresses.contains(&self.signing_key)
    }
}

fn validate_payload_hex(payload: &str) -> Result<(), PayloadError> {
    let digits = payload.strip_prefix("0x").unwrap_or(payload);

    if digits.is_empty() {
        return Err(PayloadError::Empty);
    }
    if digits.len() % 2 != 0 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(PayloadError::InvalidHex(payload.to_string()));
    }

    Ok(())
}

/// One parsed transaction output, independent of the provider shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Value in satoshis
    pub value: u64,
    pub script_hex: String,
    /// Provider-resolved address, if the provider reported one
    pub address: Option<String>,
    pub spent: bool,
    pub index: u32,
}
