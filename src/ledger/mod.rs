use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::schema::ColumnDefinition;

pub type TableName = String;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("table {table} already exists")]
    TableExists { table: TableName },
    #[error("unknown table {table}")]
    UnknownTable { table: TableName },
    #[error("table {table} needs at least one key column")]
    NoKeyColumn { table: TableName },
    #[error("table {table} expects {expected} columns, got {got}")]
    ColumnCount {
        table: TableName,
        expected: usize,
        got: usize,
    },
    #[error("snapshot root mismatch: recorded {recorded}, computed {computed}")]
    RootMismatch { recorded: String, computed: String },
    #[error("snapshot holds duplicate key in table {table}")]
    DuplicateSnapshotKey { table: TableName },
    #[error("ledger lock poisoned")]
    Poisoned,
}

/// One tuple of column values, ordered as the table's column definitions.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Row {
    pub columns: Vec<String>,
}

impl Row {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }
}

/// Keyed-table surface of the host ledger.
///
/// `insert_row` returns `Ok(false)` when a row with the same key is already
/// present and `replace_row` returns `Ok(false)` when no such row exists;
/// neither mutates anything in that case. Every call is a single blocking
/// round trip, so implementations serialise writers on the same key.
pub trait TableStore: Send + Sync {
    fn create_table(&self, table: &str, columns: Vec<ColumnDefinition>) -> Result<(), StoreError>;
    fn insert_row(&self, table: &str, row: Row) -> Result<bool, StoreError>;
    fn replace_row(&self, table: &str, row: Row) -> Result<bool, StoreError>;
    fn get_row(&self, table: &str, key: &[String]) -> Result<Option<Row>, StoreError>;
}

#[derive(Clone, Debug)]
struct TableState {
    columns: Vec<ColumnDefinition>,
    rows: BTreeMap<Vec<String>, Row>,
}

impl TableState {
    fn new(table: &str, columns: Vec<ColumnDefinition>) -> Result<Self, StoreError> {
        if !columns.iter().any(|c| c.key) {
            return Err(StoreError::NoKeyColumn {
                table: table.to_string(),
            });
        }
        Ok(Self {
            columns,
            rows: BTreeMap::new(),
        })
    }

    fn key_of(&self, table: &str, row: &Row) -> Result<Vec<String>, StoreError> {
        if row.columns.len() != self.columns.len() {
            return Err(StoreError::ColumnCount {
                table: table.to_string(),
                expected: self.columns.len(),
                got: row.columns.len(),
            });
        }
        Ok(self
            .columns
            .iter()
            .zip(&row.columns)
            .filter(|(def, _)| def.key)
            .map(|(_, value)| value.clone())
            .collect())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSnapshot {
    pub columns: Vec<ColumnDefinition>,
    pub rows: Vec<Row>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerSnapshot {
    pub tables: BTreeMap<TableName, TableSnapshot>,
    /// Hex SHA-256 Merkle root over every table schema and row.
    pub state_root: String,
}

/// In-process ledger used by the CLI host and by tests.
#[derive(Default)]
pub struct MemoryLedger {
    tables: Mutex<BTreeMap<TableName, TableState>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<TableName, TableState>>, StoreError> {
        self.tables.lock().map_err(|_| StoreError::Poisoned)
    }

    pub fn snapshot(&self) -> Result<LedgerSnapshot, StoreError> {
        let tables = self.lock()?;
        let tables: BTreeMap<TableName, TableSnapshot> = tables
            .iter()
            .map(|(name, state)| {
                (
                    name.clone(),
                    TableSnapshot {
                        columns: state.columns.clone(),
                        rows: state.rows.values().cloned().collect(),
                    },
                )
            })
            .collect();
        let state_root = hex::encode(compute_merkle_root(&tables));
        Ok(LedgerSnapshot { tables, state_root })
    }

    /// Rebuilds a ledger, refusing snapshots whose contents do not hash to
    /// the recorded root.
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Result<Self, StoreError> {
        let computed = hex::encode(compute_merkle_root(&snapshot.tables));
        if computed != snapshot.state_root {
            return Err(StoreError::RootMismatch {
                recorded: snapshot.state_root,
                computed,
            });
        }
        let mut tables = BTreeMap::new();
        for (name, table) in snapshot.tables {
            let mut state = TableState::new(&name, table.columns)?;
            for row in table.rows {
                let key = state.key_of(&name, &row)?;
                if state.rows.insert(key, row).is_some() {
                    return Err(StoreError::DuplicateSnapshotKey { table: name });
                }
            }
            tables.insert(name, state);
        }
        Ok(Self {
            tables: Mutex::new(tables),
        })
    }

    pub fn state_root(&self) -> Result<String, StoreError> {
        Ok(self.snapshot()?.state_root)
    }
}

impl TableStore for MemoryLedger {
    fn create_table(&self, table: &str, columns: Vec<ColumnDefinition>) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.contains_key(table) {
            return Err(StoreError::TableExists {
                table: table.to_string(),
            });
        }
        let state = TableState::new(table, columns)?;
        debug!(table, columns = state.columns.len(), "table created");
        tables.insert(table.to_string(), state);
        Ok(())
    }

    fn insert_row(&self, table: &str, row: Row) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        let state = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable {
                table: table.to_string(),
            })?;
        let key = state.key_of(table, &row)?;
        if state.rows.contains_key(&key) {
            return Ok(false);
        }
        state.rows.insert(key, row);
        Ok(true)
    }

    fn replace_row(&self, table: &str, row: Row) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        let state = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::UnknownTable {
                table: table.to_string(),
            })?;
        let key = state.key_of(table, &row)?;
        match state.rows.get_mut(&key) {
            Some(slot) => {
                *slot = row;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn get_row(&self, table: &str, key: &[String]) -> Result<Option<Row>, StoreError> {
        let tables = self.lock()?;
        let state = tables.get(table).ok_or_else(|| StoreError::UnknownTable {
            table: table.to_string(),
        })?;
        Ok(state.rows.get(key).cloned())
    }
}

fn compute_merkle_root(tables: &BTreeMap<TableName, TableSnapshot>) -> [u8; 32] {
    let mut leaves: Vec<[u8; 32]> = Vec::new();
    for (name, table) in tables {
        let mut hasher = Sha256::new();
        hasher.update(b"table");
        hash_field(&mut hasher, name.as_bytes());
        for column in &table.columns {
            hash_field(&mut hasher, column.name.as_bytes());
            hash_field(&mut hasher, column.kind.tag().as_bytes());
            hasher.update([column.key as u8]);
        }
        leaves.push(hasher.finalize().into());

        for row in &table.rows {
            let mut hasher = Sha256::new();
            hasher.update(b"row");
            hash_field(&mut hasher, name.as_bytes());
            for value in &row.columns {
                hash_field(&mut hasher, value.as_bytes());
            }
            leaves.push(hasher.finalize().into());
        }
    }
    fold_state_root(leaves)
}

// length-prefixed field
fn hash_field(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn join_nodes(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    Sha256::new()
        .chain_update(b"node")
        .chain_update(left)
        .chain_update(right)
        .finalize()
        .into()
}

/// Pairs neighbouring hashes level by level; an unpaired last hash moves up
/// unchanged.
fn fold_state_root(mut level: Vec<[u8; 32]>) -> [u8; 32] {
    while level.len() > 1 {
        level = level
            .chunks(2)
            .map(|pair| match pair {
                [left, right] => join_nodes(left, right),
                _ => pair[0],
            })
            .collect();
    }
    level
        .first()
        .copied()
        .unwrap_or_else(|| Sha256::digest(b"trade-ledger-empty").into())
}
