//! Wallet files
//!
//! A wallet is the JSON object a coil node hands out on creation:
//! `{"address": ..., "publicKey": ..., "privateKey": ...}`. The client only
//! reads it.

use crate::error::{ChainError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub address: String,
    pub public_key: String,
    pub private_key: String,
}

impl Wallet {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                ChainError::NotFound(format!("wallet file {}", path.display()))
            }
            _ => ChainError::Io(format!("Failed to read wallet {}: {}", path.display(), e)),
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            ChainError::Parse(format!("Failed to parse wallet {}: {}", path.display(), e))
        })
    }
}
