//! Command implementations shared by the `coil` binary.
//!
//! Each command is a plain function over explicit collaborators (config,
//! chain store, peer client) so it can be exercised without a terminal or a
//! live network.

use crate::blockchain::{Amount, Timestamp};
use crate::config::Config;
use crate::error::{ChainError, Result};
use crate::history::{reconstruct, reconstruct_many, HistoryRecord};
use crate::persistence::{is_stale, ChainStore, FileChainStore};
use crate::sync::{PeerClient, Transport};
use crate::transaction::{Payment, TransactionPayload};
use crate::wallet::Wallet;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

/// Result of `update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The cache was missing or differed and has been rewritten.
    Updated { blocks: usize },
    UpToDate { blocks: usize },
}

pub fn chain_store_from_config(config: &Config) -> FileChainStore {
    FileChainStore::new(&config.chain.path)
}

/// Fetch the chain from the first responsive peer and persist it when the
/// local cache is missing, unreadable, or different.
pub fn update<T: Transport>(client: &PeerClient<T>, store: &dyn ChainStore) -> Result<UpdateOutcome> {
    info!("Attempting to fetch chain from node");
    let remote = client.fetch_chain()?;
    let blocks = remote.len();

    let stale = match store.load() {
        Ok(local) => is_stale(&local, &remote),
        Err(ChainError::NotFound(_)) => true,
        Err(e @ (ChainError::Parse(_) | ChainError::MalformedRecord { .. })) => {
            warn!("Cached chain is unreadable ({}), replacing it", e);
            true
        }
        Err(e) => return Err(e),
    };

    if stale {
        store.save(&remote)?;
        Ok(UpdateOutcome::Updated { blocks })
    } else {
        Ok(UpdateOutcome::UpToDate { blocks })
    }
}

/// Histories for `addresses`, in request order, from the cached chain.
pub fn history<S>(store: &dyn ChainStore, addresses: &[S]) -> Result<Vec<HistoryRecord>>
where
    S: AsRef<str> + Sync,
{
    let chain = store.load()?;
    Ok(reconstruct_many(addresses, &chain))
}

pub fn balance<T: Transport>(client: &PeerClient<T>, address: &str) -> Result<Value> {
    client.fetch_balance(address)
}

/// Build a payment from `wallet` to `to` over the cached chain and submit it.
pub fn send<T: Transport>(
    client: &PeerClient<T>,
    store: &dyn ChainStore,
    wallet: &Wallet,
    to: &str,
    amount: Amount,
) -> Result<Value> {
    let chain = store.load()?;
    let history = reconstruct(&wallet.address, &chain);

    warn!("Submitting unsigned transaction; wallet keys are sent hex-encoded");
    let payload = TransactionPayload::build(wallet, history, Payment::new(to, amount));

    info!("Attempting to submit transaction to node");
    client.submit_transaction(&payload)
}

/// Two-space indented JSON, the format every command prints.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Human-readable rendering of a history.
pub fn render_history_table(history: &HistoryRecord) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Block").add_attribute(Attribute::Bold),
            Cell::new("Direction").add_attribute(Attribute::Bold),
            Cell::new("Counterparty").add_attribute(Attribute::Bold),
            Cell::new("Amount").add_attribute(Attribute::Bold),
            Cell::new("Date").add_attribute(Attribute::Bold),
        ]);

    for input in &history.inputs {
        table.add_row(vec![
            Cell::new(format!("#{}", input.block_index)),
            Cell::new("Received").fg(Color::Green),
            Cell::new(format!("From: {}", input.from)),
            Cell::new(input.amount.to_string()),
            Cell::new(format_timestamp(&input.time)),
        ]);
    }

    for output in &history.outputs {
        table.add_row(vec![
            Cell::new("-"),
            Cell::new("Sent").fg(Color::Red),
            Cell::new(format!("To: {}", output.to)),
            Cell::new(output.amount.to_string()),
            Cell::new(format_timestamp(&output.time)),
        ]);
    }

    format!("Address: {}\n{}", history.address, table)
}

fn format_timestamp(time: &Timestamp) -> String {
    time.as_secs()
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| time.to_string())
}
