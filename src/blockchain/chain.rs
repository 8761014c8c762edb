use crate::blockchain::canonical::{float_repr, to_canonical_string};
use crate::crypto::double_hash_str;
use crate::error::{ChainError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;
use std::str::FromStr;

/// Key under which the cached document and `/resolve/chain` wrap the blocks.
pub const CHAIN_KEY: &str = "chain";

/// A decimal amount, kept exactly as written in the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Number);

impl Amount {
    /// Parse a command-line amount the way nodes expect it: as a float,
    /// always written in float form (`5` becomes `5.0`).
    pub fn parse_float(s: &str) -> Result<Self> {
        let invalid = || ChainError::InvalidAmount(s.to_string());
        let value: f64 = s.trim().parse().map_err(|_| invalid())?;
        if !value.is_finite() {
            return Err(invalid());
        }
        serde_json::from_str::<Number>(&float_repr(value))
            .map(Amount)
            .map_err(|_| invalid())
    }
}

impl From<Number> for Amount {
    fn from(n: Number) -> Self {
        Amount(n)
    }
}

impl From<u64> for Amount {
    fn from(n: u64) -> Self {
        Amount(Number::from(n))
    }
}

impl FromStr for Amount {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self> {
        serde_json::from_str::<Number>(s.trim())
            .map(Amount)
            .map_err(|_| ChainError::InvalidAmount(s.to_string()))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Block time in unix seconds, kept exactly as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(Number);

impl Timestamp {
    /// Whole seconds, truncating any fractional part.
    pub fn as_secs(&self) -> Option<i64> {
        self.0
            .as_i64()
            .or_else(|| self.0.as_f64().map(|f| f.trunc() as i64))
    }
}

impl From<i64> for Timestamp {
    fn from(secs: i64) -> Self {
        Timestamp(Number::from(secs))
    }
}

impl From<Number> for Timestamp {
    fn from(n: Number) -> Self {
        Timestamp(n)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Output {
    /// Recipient
    pub address: String,
    pub amount: Amount,
}

impl Output {
    pub fn new(address: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Output {
            address: address.into(),
            amount: amount.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender
    pub address: String,
    pub outputs: Vec<Output>,
}

impl Transaction {
    pub fn new(address: impl Into<String>, outputs: Vec<Output>) -> Self {
        Transaction {
            address: address.into(),
            outputs,
        }
    }

    fn from_value(block_index: usize, tx_index: usize, value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ChainError::malformed_tx(block_index, tx_index, "transaction"))?;

        let address = obj
            .get("address")
            .and_then(Value::as_str)
            .ok_or_else(|| ChainError::malformed_tx(block_index, tx_index, "address"))?;

        let raw_outputs = obj
            .get("outputs")
            .and_then(Value::as_array)
            .ok_or_else(|| ChainError::malformed_tx(block_index, tx_index, "outputs"))?;

        let mut outputs = Vec::with_capacity(raw_outputs.len());
        for (k, raw) in raw_outputs.iter().enumerate() {
            let recipient = raw
                .get("address")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ChainError::malformed_tx(block_index, tx_index, format!("outputs[{}].address", k))
                })?;
            let amount = match raw.get("amount") {
                Some(Value::Number(n)) => Amount(n.clone()),
                _ => {
                    return Err(ChainError::malformed_tx(
                        block_index,
                        tx_index,
                        format!("outputs[{}].amount", k),
                    ))
                }
            };
            outputs.push(Output::new(recipient, amount));
        }

        Ok(Transaction::new(address, outputs))
    }
}

/// A block of the cached chain.
///
/// Only `timestamp` and `transactions` are interpreted; the full decoded
/// object is retained because the block hash covers every field a node wrote.
#[derive(Debug, Clone)]
pub struct Block {
    timestamp: Timestamp,
    transactions: Vec<Transaction>,
    raw: Value,
}

impl Block {
    pub fn new(timestamp: impl Into<Timestamp>, transactions: Vec<Transaction>) -> Self {
        let timestamp = timestamp.into();
        let mut raw = Map::new();
        raw.insert("timestamp".to_string(), Value::Number(timestamp.0.clone()));
        raw.insert(
            "transactions".to_string(),
            Value::Array(transactions.iter().map(transaction_value).collect()),
        );

        Block {
            timestamp,
            transactions,
            raw: Value::Object(raw),
        }
    }

    /// Decode and validate the block found at `index`.
    pub fn from_value(index: usize, value: Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| ChainError::malformed_block(index, "block"))?;

        let timestamp = match obj.get("timestamp") {
            Some(Value::Number(n)) => Timestamp(n.clone()),
            _ => return Err(ChainError::malformed_block(index, "timestamp")),
        };

        let raw_txs = obj
            .get("transactions")
            .and_then(Value::as_array)
            .ok_or_else(|| ChainError::malformed_block(index, "transactions"))?;

        let transactions = raw_txs
            .iter()
            .enumerate()
            .map(|(j, tx)| Transaction::from_value(index, j, tx))
            .collect::<Result<Vec<_>>>()?;

        Ok(Block {
            timestamp,
            transactions,
            raw: value,
        })
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn canonical_string(&self) -> String {
        to_canonical_string(&self.raw)
    }

    /// Double SHA-256 of the canonical form, hex-encoded.
    pub fn hash(&self) -> String {
        double_hash_str(&self.canonical_string())
    }
}

fn transaction_value(tx: &Transaction) -> Value {
    let outputs = tx
        .outputs
        .iter()
        .map(|o| {
            let mut m = Map::new();
            m.insert("address".to_string(), Value::String(o.address.clone()));
            m.insert("amount".to_string(), Value::Number(o.amount.0.clone()));
            Value::Object(m)
        })
        .collect();

    let mut m = Map::new();
    m.insert("address".to_string(), Value::String(tx.address.clone()));
    m.insert("outputs".to_string(), Value::Array(outputs));
    Value::Object(m)
}

/// The cached chain document: blocks in chronological order plus whatever
/// other top-level fields the serving node included.
#[derive(Debug, Clone)]
pub struct Chain {
    blocks: Vec<Block>,
    document: Value,
}

impl Chain {
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        let mut document = Map::new();
        document.insert(
            CHAIN_KEY.to_string(),
            Value::Array(blocks.iter().map(|b| b.raw.clone()).collect()),
        );
        Chain {
            blocks,
            document: Value::Object(document),
        }
    }

    pub fn from_value(document: Value) -> Result<Self> {
        let raw_blocks = document
            .get(CHAIN_KEY)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                ChainError::Parse(format!("expected an object with a `{}` array", CHAIN_KEY))
            })?;

        let blocks = raw_blocks
            .iter()
            .enumerate()
            .map(|(i, raw)| Block::from_value(i, raw.clone()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Chain { blocks, document })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(json)?;
        Self::from_value(document)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.document)?)
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Structural equality of the whole document. Object key order is ignored
/// and numbers compare by value, so `1` equals `1.0`.
impl PartialEq for Chain {
    fn eq(&self, other: &Self) -> bool {
        values_equal(&self.document, &other.document)
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map_or(false, |y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    if x == y {
        return true;
    }
    let (xs, ys) = (x.to_string(), y.to_string());
    let is_integer = |t: &str| !t.contains(['.', 'e', 'E']);
    if is_integer(&xs) && is_integer(&ys) {
        // Integers too wide for i128 only match textually.
        return matches!((xs.parse::<i128>(), ys.parse::<i128>()), (Ok(a), Ok(b)) if a == b);
    }
    match (xs.parse::<f64>(), ys.parse::<f64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
