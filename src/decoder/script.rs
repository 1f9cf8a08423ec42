//! Output and input script decoding without a script interpreter
//!
//! Scripts are wrapped as `bitcoin::Script` and matched against the handful
//! of templates the lookup path cares about:
//!
//! - `OP_RETURN <push>` data carriers, whose pushed bytes are the proof payload
//! - `OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG` (P2PKH)
//! - `OP_HASH160 <20> OP_EQUAL` (P2SH)
//!
//! Anything else is `ScriptKind::Unsupported`. Every function here is pure.

use super::error::{DecoderError, DecoderResult};
use crate::types::Chain;
use bitcoin::opcodes::all::{OP_PUSHBYTES_75, OP_PUSHDATA1, OP_PUSHDATA2, OP_PUSHDATA4};
use bitcoin::script::Instruction;
use bitcoin::{Address, PublicKey, Script, ScriptBuf};

const PUSHBYTES_75: u8 = OP_PUSHBYTES_75.to_u8();
const PUSHDATA1: u8 = OP_PUSHDATA1.to_u8();
const PUSHDATA2: u8 = OP_PUSHDATA2.to_u8();
const PUSHDATA4: u8 = OP_PUSHDATA4.to_u8();

/// Classification of an output script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptKind {
    /// `OP_RETURN` output; `payload` is everything after the push header
    DataCarrier { payload: Vec<u8> },
    PubkeyHash(ScriptBuf),
    ScriptHash(ScriptBuf),
    Unsupported,
}

impl ScriptKind {
    pub fn is_data_carrier(&self) -> bool {
        matches!(self, ScriptKind::DataCarrier { .. })
    }

    /// Hex-encoded payload of a data carrier
    pub fn payload_hex(&self) -> Option<String> {
        match self {
            ScriptKind::DataCarrier { payload } => Some(hex::encode(payload)),
            _ => None,
        }
    }

    /// Base58Check address for pay-to-hash scripts on a Bitcoin chain
    pub fn address(&self, chain: Chain) -> Option<String> {
        let network = chain.bitcoin_network()?;
        match self {
            ScriptKind::PubkeyHash(script) | ScriptKind::ScriptHash(script) => {
                Address::from_script(script, network)
                    .ok()
                    .map(|address| address.to_string())
            }
            ScriptKind::DataCarrier { .. } | ScriptKind::Unsupported => None,
        }
    }
}

/// Decode a hex script and classify it
pub fn decode_script_hex(script_hex: &str) -> DecoderResult<ScriptKind> {
    let bytes =
        hex::decode(script_hex).map_err(|_| DecoderError::InvalidHex(script_hex.to_string()))?;
    Ok(classify_script(&bytes))
}

/// Classify raw script bytes
pub fn classify_script(bytes: &[u8]) -> ScriptKind {
    let script = Script::from_bytes(bytes);

    if script.is_op_return() {
        ScriptKind::DataCarrier {
            payload: data_carrier_payload(bytes).to_vec(),
        }
    } else if script.is_p2pkh() {
        ScriptKind::PubkeyHash(script.to_owned())
    } else if script.is_p2sh() {
        ScriptKind::ScriptHash(script.to_owned())
    } else {
        ScriptKind::Unsupported
    }
}

/// Bytes following the push header after `OP_RETURN`
///
/// The declared push length is not enforced: everything after the length
/// byte(s) is payload, including any further pushes or opcodes. A script
/// with no push opcode after `OP_RETURN` yields an empty payload.
pub fn data_carrier_payload(bytes: &[u8]) -> &[u8] {
    if !Script::from_bytes(bytes).is_op_return() {
        return &[];
    }

    let header_len = match bytes.get(1) {
        Some(op) if *op <= PUSHBYTES_75 => 1,
        Some(&PUSHDATA1) => 2,
        Some(&PUSHDATA2) => 3,
        Some(&PUSHDATA4) => 5,
        _ => return &[],
    };

    bytes.get(1 + header_len..).unwrap_or(&[])
}

/// Address of a decodable output script, `UnsupportedScript` otherwise
pub fn output_address(script_hex: &str, chain: Chain) -> DecoderResult<String> {
    decode_script_hex(script_hex)?
        .address(chain)
        .ok_or(DecoderError::UnsupportedScript)
}

/// Recover the spending address from a legacy scriptSig
///
/// The scriptSig must be push-only. A final push that parses as a public key
/// yields its P2PKH address; any other final push following at least one
/// signature push is taken as a redeem script and yields a P2SH address.
pub fn script_sig_address(script_sig: &[u8], chain: Chain) -> Option<String> {
    let network = chain.bitcoin_network()?;

    let mut pushes = Vec::new();
    for instruction in Script::from_bytes(script_sig).instructions() {
        match instruction.ok()? {
            Instruction::PushBytes(data) => pushes.push(data.as_bytes()),
            Instruction::Op(_) => return None,
        }
    }

    let last = *pushes.last()?;
    if let Ok(key) = PublicKey::from_slice(last) {
        Some(Address::p2pkh(key.pubkey_hash(), network).to_string())
    } else if pushes.len() > 1 && !last.is_empty() {
        Address::p2sh(Script::from_bytes(last), network)
            .ok()
            .map(|address| address.to_string())
    } else {
        None
    }
}
