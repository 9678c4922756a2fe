//! Snapshot file backing the CLI host.
//!
//! Every host call runs under an OS-level lock on a `<state>.lock` sidecar:
//! exclusive for the whole load → invoke → save span of a mutating call,
//! shared for reads. Snapshots are written to a fresh temp file in the same
//! directory and renamed over the state file.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use fs2::FileExt;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::ContractError;
use crate::ledger::{LedgerSnapshot, MemoryLedger, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("state file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("snapshot JSON for state file {}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Contract(#[from] ContractError),
}

fn io_err(path: &Path) -> impl Fn(io::Error) -> StateError + '_ {
    move |source| StateError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Clone, Debug)]
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Blocks until the sidecar lock is held; released when the file drops.
    fn acquire(&self, exclusive: bool) -> Result<File, StateError> {
        fs::create_dir_all(self.dir()).map_err(io_err(self.dir()))?;
        let lock_path = self.lock_path();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&lock_path)
            .map_err(io_err(&lock_path))?;
        let locked = if exclusive {
            FileExt::lock_exclusive(&file)
        } else {
            FileExt::lock_shared(&file)
        };
        locked.map_err(io_err(&lock_path))?;
        debug!(path = %lock_path.display(), exclusive, "state lock held");
        Ok(file)
    }

    /// Runs `op` against the stored ledger and persists the result. Nothing is
    /// written when `op` fails.
    pub fn mutate<T, E>(
        &self,
        op: impl FnOnce(&Arc<MemoryLedger>) -> Result<T, E>,
    ) -> Result<T, StateError>
    where
        StateError: From<E>,
    {
        let _lock = self.acquire(true)?;
        let ledger = Arc::new(self.load()?);
        let out = op(&ledger)?;
        self.save(&ledger)?;
        Ok(out)
    }

    pub fn read<T, E>(
        &self,
        op: impl FnOnce(&Arc<MemoryLedger>) -> Result<T, E>,
    ) -> Result<T, StateError>
    where
        StateError: From<E>,
    {
        let _lock = self.acquire(false)?;
        let ledger = Arc::new(self.load()?);
        Ok(op(&ledger)?)
    }

    fn load(&self) -> Result<MemoryLedger, StateError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no state file, starting empty ledger");
            return Ok(MemoryLedger::new());
        }
        let bytes = fs::read(&self.path).map_err(io_err(&self.path))?;
        let snapshot: LedgerSnapshot =
            serde_json::from_slice(&bytes).map_err(|source| StateError::Json {
                path: self.path.clone(),
                source,
            })?;
        Ok(MemoryLedger::from_snapshot(snapshot)?)
    }

    fn save(&self, ledger: &MemoryLedger) -> Result<(), StateError> {
        let snapshot = ledger.snapshot()?;
        let json = serde_json::to_vec_pretty(&snapshot).map_err(|source| StateError::Json {
            path: self.path.clone(),
            source,
        })?;
        let mut tmp = NamedTempFile::new_in(self.dir()).map_err(io_err(self.dir()))?;
        tmp.write_all(&json).map_err(io_err(tmp.path()))?;
        tmp.as_file().sync_all().map_err(io_err(tmp.path()))?;
        tmp.persist(&self.path)
            .map_err(|e| io_err(&self.path)(e.error))?;
        info!(root = %snapshot.state_root, "ledger saved");
        Ok(())
    }
}
