//! Core data model
//!
//! - `chain`: supported networks and their address/id conventions
//! - `transaction`: the normalised `TransactionData` result and parsed `Output`s

mod chain;
mod transaction;

pub use chain::Chain;
pub use transaction::{Output, PayloadError, TransactionData};
