//! Error types for coil

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Malformed record in block {block_index}{}: {field}", tx_suffix(.transaction_index))]
    MalformedRecord {
        block_index: usize,
        transaction_index: Option<usize>,
        field: String,
    },
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Could not connect to any nodes")]
    NoPeerAvailable,
    #[error("IO error: {0}")]
    Io(String),
}

fn tx_suffix(transaction_index: &Option<usize>) -> String {
    match transaction_index {
        Some(i) => format!(", transaction {}", i),
        None => String::new(),
    }
}

impl ChainError {
    pub(crate) fn malformed_block(block_index: usize, field: impl Into<String>) -> Self {
        ChainError::MalformedRecord {
            block_index,
            transaction_index: None,
            field: field.into(),
        }
    }

    pub(crate) fn malformed_tx(
        block_index: usize,
        transaction_index: usize,
        field: impl Into<String>,
    ) -> Self {
        ChainError::MalformedRecord {
            block_index,
            transaction_index: Some(transaction_index),
            field: field.into(),
        }
    }
}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ChainError {
    fn from(err: serde_json::Error) -> Self {
        ChainError::Parse(err.to_string())
    }
}

impl From<reqwest::Error> for ChainError {
    fn from(err: reqwest::Error) -> Self {
        ChainError::Network(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;
