//! Raw transaction decoding for the full-node path
//!
//! Bitcoin Core hands back consensus-serialised bytes with no explorer-side
//! classification, so outputs and the signing input are recovered here.

use super::error::{DecoderError, DecoderResult};
use super::script::script_sig_address;
use crate::types::{Chain, Output};
use bitcoin::{Transaction, TxIn};
use std::collections::HashSet;

/// Deserialise a hex-encoded raw transaction
pub fn decode_raw_transaction(raw_hex: &str) -> DecoderResult<Transaction> {
    let bytes = hex::decode(raw_hex.trim()).map_err(|e| {
        DecoderError::InvalidTransaction(format!("raw transaction is not hex: {}", e))
    })?;

    bitcoin::consensus::deserialize(&bytes).map_err(|e| {
        DecoderError::InvalidTransaction(format!("failed to deserialise transaction: {}", e))
    })
}

/// Outputs of a decoded transaction, flagging the indices in `spent`
///
/// Addresses are left unresolved; the caller runs each script through the
/// script decoder.
pub fn transaction_outputs(tx: &Transaction, spent: &HashSet<u32>) -> Vec<Output> {
    tx.output
        .iter()
        .enumerate()
        .map(|(index, out)| {
            let index = index as u32;
            Output {
                value: out.value.to_sat(),
                script_hex: hex::encode(out.script_pubkey.as_bytes()),
                address: None,
                spent: spent.contains(&index),
                index,
            }
        })
        .collect()
}

/// First input of a non-coinbase transaction
pub fn signing_input(tx: &Transaction) -> Option<&TxIn> {
    if tx.is_coinbase() {
        return None;
    }
    tx.input.first()
}

/// Address derived from the first input's scriptSig, if it is a legacy spend
pub fn script_sig_signing_key(tx: &Transaction, chain: Chain) -> Option<String> {
    let input = signing_input(tx)?;
    script_sig_address(input.script_sig.as_bytes(), chain)
}
