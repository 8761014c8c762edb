//! Transaction submission payloads
//!
//! A payload spends the sender's reconstructed history: every receipt found
//! in the cached chain is listed as an input, whether or not an earlier
//! transaction already spent it. Peers are expected to reject overspends.
//!
//! Keys travel as the hex encoding of the wallet's key strings. Nothing is
//! signed; that is the format coil nodes accept.

use crate::blockchain::Amount;
use crate::crypto::encode_key;
use crate::history::{HistoryRecord, InputRecord};
use crate::wallet::Wallet;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A requested payment. `time` is the submission time in fractional unix
/// seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub amount: Amount,
    pub to: String,
    pub time: f64,
}

impl Payment {
    pub fn new(to: impl Into<String>, amount: Amount) -> Self {
        Self {
            amount,
            to: to.into(),
            time: now_secs(),
        }
    }
}

/// Body of `POST /tx`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionPayload {
    pub private: String,
    pub public: String,
    pub inputs: Vec<InputRecord>,
    pub outputs: Vec<Payment>,
}

impl TransactionPayload {
    /// Build a payload from `wallet`, using `history` (which must belong to
    /// the wallet's address) as the input list.
    pub fn build(wallet: &Wallet, history: HistoryRecord, payment: Payment) -> Self {
        if history.address != wallet.address {
            warn!(
                "History for {} used to spend from wallet {}",
                history.address, wallet.address
            );
        }

        Self {
            private: encode_key(&wallet.private_key),
            public: encode_key(&wallet.public_key),
            inputs: history.inputs,
            outputs: vec![payment],
        }
    }
}

fn now_secs() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{Block, Chain, Output, Transaction};
    use crate::history::reconstruct;

    fn wallet() -> Wallet {
        Wallet {
            address: "alice".to_string(),
            public_key: "pk".to_string(),
            private_key: "sk".to_string(),
        }
    }

    #[test]
    fn test_build_payload() {
        let chain = Chain::from_blocks(vec![
            Block::new(10, vec![Transaction::new("coinbase", vec![Output::new("alice", 50)])]),
            Block::new(20, vec![Transaction::new("alice", vec![Output::new("bob", 20)])]),
        ]);
        let history = reconstruct("alice", &chain);
        let payment = Payment::new("carol", "12.5".parse().unwrap());

        let payload = TransactionPayload::build(&wallet(), history.clone(), payment.clone());

        assert_eq!(payload.private, "736b");
        assert_eq!(payload.public, "706b");
        // Full receipt history, spent or not.
        assert_eq!(payload.inputs, history.inputs);
        assert_eq!(payload.outputs, vec![payment]);
    }

    #[test]
    fn test_payload_json_shape() {
        let payment = Payment {
            amount: "3".parse().unwrap(),
            to: "bob".to_string(),
            time: 1700000000.25,
        };
        let payload = TransactionPayload::build(&wallet(), reconstruct("alice", &Chain::from_blocks(vec![])), payment);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["private"], "736b");
        assert_eq!(json["public"], "706b");
        assert!(json["inputs"].as_array().unwrap().is_empty());
        assert_eq!(json["outputs"][0]["to"], "bob");
        assert_eq!(json["outputs"][0]["amount"], 3);
        assert_eq!(json["outputs"][0]["time"], 1700000000.25);
    }

    #[test]
    fn test_payment_time_is_now() {
        let before = chrono::Utc::now().timestamp() as f64;
        let payment = Payment::new("bob", "1".parse().unwrap());
        assert!(payment.time >= before);
        assert!(payment.time < before + 60.0);
    }
}
