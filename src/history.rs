//! Per-address transaction history reconstructed from the cached chain
//!
//! The history doubles as the input list for new transactions: every output
//! ever paid to an address becomes an input record carrying the hash and
//! index of the block it was found in. Nothing here tracks whether an input
//! was already spent by a later transaction.

use crate::blockchain::{Amount, Chain, Timestamp};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// An amount received by the address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputRecord {
    pub amount: Amount,
    pub from: String,
    pub time: Timestamp,
    pub previous_block_hash: String,
    pub block_index: usize,
}

/// An amount sent by the address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub amount: Amount,
    pub to: String,
    pub time: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub address: String,
    pub inputs: Vec<InputRecord>,
    pub outputs: Vec<OutputRecord>,
}

impl HistoryRecord {
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }
}

/// Scan every block and transaction once, in chain order.
///
/// A transaction sent by `address` contributes all of its outputs to
/// `outputs`; independently, each of its outputs paying `address` contributes
/// an input. A self-transfer therefore shows up on both sides.
pub fn reconstruct(address: &str, chain: &Chain) -> HistoryRecord {
    let mut inputs = Vec::new();
    let mut outputs = Vec::new();

    for (block_index, block) in chain.blocks().iter().enumerate() {
        let mut block_hash: Option<String> = None;

        for tx in block.transactions() {
            if tx.address == address {
                outputs.extend(tx.outputs.iter().map(|o| OutputRecord {
                    amount: o.amount.clone(),
                    to: o.address.clone(),
                    time: block.timestamp().clone(),
                }));
            }

            for o in tx.outputs.iter().filter(|o| o.address == address) {
                let hash = block_hash.get_or_insert_with(|| block.hash()).clone();
                inputs.push(InputRecord {
                    amount: o.amount.clone(),
                    from: tx.address.clone(),
                    time: block.timestamp().clone(),
                    previous_block_hash: hash,
                    block_index,
                });
            }
        }
    }

    HistoryRecord {
        address: address.to_string(),
        inputs,
        outputs,
    }
}

/// Reconstruct several histories in parallel over the same snapshot. Results
/// follow the order of `addresses`.
pub fn reconstruct_many<S>(addresses: &[S], chain: &Chain) -> Vec<HistoryRecord>
where
    S: AsRef<str> + Sync,
{
    addresses
        .par_iter()
        .map(|address| reconstruct(address.as_ref(), chain))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{Block, Output, Transaction};

    fn scenario_chain() -> Chain {
        Chain::from_blocks(vec![Block::new(
            1000,
            vec![Transaction::new("alice", vec![Output::new("bob", 5)])],
        )])
    }

    /// alice mines, pays bob twice, bob pays carol and himself.
    fn busy_chain() -> Chain {
        Chain::from_blocks(vec![
            Block::new(
                100,
                vec![Transaction::new("coinbase", vec![Output::new("alice", 50)])],
            ),
            Block::new(
                200,
                vec![
                    Transaction::new(
                        "alice",
                        vec![Output::new("bob", 10), Output::new("bob", 3)],
                    ),
                    Transaction::new("coinbase", vec![Output::new("alice", 50)]),
                ],
            ),
            Block::new(
                300,
                vec![Transaction::new(
                    "bob",
                    vec![Output::new("carol", 4), Output::new("bob", 9)],
                )],
            ),
        ])
    }

    #[test]
    fn test_sender_scenario() {
        let history = reconstruct("alice", &scenario_chain());
        assert_eq!(history.address, "alice");
        assert!(history.inputs.is_empty());
        assert_eq!(
            history.outputs,
            vec![OutputRecord {
                amount: Amount::from(5),
                to: "bob".to_string(),
                time: Timestamp::from(1000),
            }]
        );
    }

    #[test]
    fn test_recipient_scenario() {
        let chain = scenario_chain();
        let history = reconstruct("bob", &chain);
        assert!(history.outputs.is_empty());
        assert_eq!(
            history.inputs,
            vec![InputRecord {
                amount: Amount::from(5),
                from: "alice".to_string(),
                time: Timestamp::from(1000),
                previous_block_hash: chain.blocks()[0].hash(),
                block_index: 0,
            }]
        );
    }

    #[test]
    fn test_unknown_address_is_empty() {
        let history = reconstruct("mallory", &busy_chain());
        assert!(history.is_empty());

        let empty = reconstruct("alice", &Chain::from_blocks(Vec::new()));
        assert!(empty.is_empty());
    }

    #[test]
    fn test_counts_follow_outputs_not_transactions() {
        let chain = busy_chain();

        let alice = reconstruct("alice", &chain);
        assert_eq!(alice.outputs.len(), 2);
        assert_eq!(alice.inputs.len(), 2);

        let bob = reconstruct("bob", &chain);
        // Two outputs of one transaction from alice, plus bob's change.
        assert_eq!(bob.inputs.len(), 3);
        assert_eq!(bob.outputs.len(), 2);
    }

    #[test]
    fn test_self_transfer_appears_on_both_sides() {
        let chain = Chain::from_blocks(vec![Block::new(
            7,
            vec![Transaction::new("dave", vec![Output::new("dave", 12)])],
        )]);
        let history = reconstruct("dave", &chain);

        assert_eq!(history.outputs.len(), 1);
        assert_eq!(history.outputs[0].to, "dave");
        assert_eq!(history.inputs.len(), 1);
        assert_eq!(history.inputs[0].from, "dave");
        assert_eq!(history.inputs[0].amount, history.outputs[0].amount);
    }

    #[test]
    fn test_ordering_and_provenance() {
        let chain = busy_chain();
        let bob = reconstruct("bob", &chain);

        let amounts: Vec<String> = bob.inputs.iter().map(|i| i.amount.to_string()).collect();
        assert_eq!(amounts, vec!["10", "3", "9"]);

        let indices: Vec<usize> = bob.inputs.iter().map(|i| i.block_index).collect();
        assert_eq!(indices, vec![1, 1, 2]);
        assert!(indices.windows(2).all(|w| w[0] <= w[1]));

        for input in &bob.inputs {
            assert_eq!(
                input.previous_block_hash,
                chain.blocks()[input.block_index].hash()
            );
        }

        let to: Vec<&str> = bob.outputs.iter().map(|o| o.to.as_str()).collect();
        assert_eq!(to, vec!["carol", "bob"]);
        assert!(bob.outputs.iter().all(|o| o.time == Timestamp::from(300)));
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(reconstruct("bob", &scenario_chain())).unwrap();
        let input = &json["inputs"][0];
        assert_eq!(input["from"], "alice");
        assert_eq!(input["blockIndex"], 0);
        assert_eq!(input["time"], 1000);
        assert!(input["previousBlockHash"].is_string());
        assert_eq!(json["address"], "bob");
        assert!(json["outputs"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_reconstruct_many_keeps_request_order() {
        let chain = busy_chain();
        let histories = reconstruct_many(&["carol", "alice", "bob"], &chain);
        let addresses: Vec<&str> = histories.iter().map(|h| h.address.as_str()).collect();
        assert_eq!(addresses, vec!["carol", "alice", "bob"]);
        assert_eq!(histories[1], reconstruct("alice", &chain));
    }
}
