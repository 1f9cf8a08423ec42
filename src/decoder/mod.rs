//! Script and raw transaction decoding
//!
//! - **script**: classifies output scripts (data carrier, P2PKH, P2SH) and
//!   encodes addresses per chain
//! - **raw_tx**: consensus decoding of raw transactions for the full-node path
//! - **error**: decoder error types; `UnsupportedScript` is the soft failure
//!   connectors downgrade to "no address"

pub mod error;
pub mod raw_tx;
pub mod script;

pub use error::{DecoderError, DecoderResult};
pub use raw_tx::{decode_raw_transaction, script_sig_signing_key, transaction_outputs};
pub use script::{
    classify_script, data_carrier_payload, decode_script_hex, output_address,
    script_sig_address, ScriptKind,
};
