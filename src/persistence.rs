//! Local chain cache for coil

use crate::blockchain::Chain;
use crate::error::{ChainError, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use tracing::debug;

/// Abstraction for chain cache backends. `save` must replace the cached chain
/// atomically: a concurrent `load` sees either the old or the new chain.
pub trait ChainStore: Send + Sync {
    fn load(&self) -> Result<Chain>;
    fn save(&self, chain: &Chain) -> Result<()>;
}

/// True iff `remote` differs structurally from `local`, i.e. the cache needs
/// to be rewritten.
pub fn is_stale(local: &Chain, remote: &Chain) -> bool {
    local != remote
}

/// `chain.json` on disk.
#[derive(Debug, Clone)]
pub struct FileChainStore {
    path: PathBuf,
}

impl FileChainStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChainStore for FileChainStore {
    fn load(&self) -> Result<Chain> {
        let contents = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                ChainError::NotFound(format!("cached chain {}", self.path.display()))
            }
            _ => ChainError::Io(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            )),
        })?;

        let chain = Chain::from_json(&contents)?;
        debug!(path = %self.path.display(), blocks = chain.len(), "loaded cached chain");
        Ok(chain)
    }

    fn save(&self, chain: &Chain) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)
            .map_err(|e| ChainError::Io(format!("Failed to create {}: {}", dir.display(), e)))?;

        let json = chain.to_json()?;

        // Temp file in the same directory so the final rename stays on one
        // filesystem. Dropping it on any error path removes it.
        let mut file = NamedTempFile::new_in(&dir)
            .map_err(|e| ChainError::Io(format!("Failed to create temp file: {}", e)))?;
        file.write_all(json.as_bytes())
            .map_err(|e| ChainError::Io(format!("Failed to write chain: {}", e)))?;
        file.as_file()
            .sync_all()
            .map_err(|e| ChainError::Io(format!("Failed to sync file: {}", e)))?;
        file.persist(&self.path)
            .map_err(|e| ChainError::Io(format!("Failed to finalize write: {}", e.error)))?;

        debug!(path = %self.path.display(), blocks = chain.len(), "saved chain");
        Ok(())
    }
}

/// In-memory store, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct InMemoryChainStore {
    chain: Mutex<Option<Chain>>,
}

impl InMemoryChainStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain(chain: Chain) -> Self {
        Self {
            chain: Mutex::new(Some(chain)),
        }
    }
}

impl ChainStore for InMemoryChainStore {
    fn load(&self) -> Result<Chain> {
        let guard = self
            .chain
            .lock()
            .map_err(|_| ChainError::Io("Mutex poisoned".to_string()))?;
        guard
            .clone()
            .ok_or_else(|| ChainError::NotFound("no chain in memory store".to_string()))
    }

    fn save(&self, chain: &Chain) -> Result<()> {
        let mut guard = self
            .chain
            .lock()
            .map_err(|_| ChainError::Io("Mutex poisoned".to_string()))?;
        *guard = Some(chain.clone());
        Ok(())
    }
}
