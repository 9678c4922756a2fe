use std::sync::Arc;

use tracing::debug;

use crate::contracts::ContractRecord;
use crate::error::ContractError;
use crate::ledger::{StoreError, TableStore};
use crate::schema::{contract_columns, CONTRACT_TABLE};

/// CRUD surface over the contract table. Holds only a handle to the ledger.
#[derive(Clone)]
pub struct ContractTable {
    store: Arc<dyn TableStore>,
}

impl ContractTable {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self { store }
    }

    pub fn create(&self) -> Result<(), ContractError> {
        match self.store.create_table(CONTRACT_TABLE, contract_columns()) {
            Ok(()) => Ok(()),
            Err(StoreError::TableExists { .. }) => Err(ContractError::AlreadyInitialized),
            Err(e) => Err(ContractError::substrate("create table", CONTRACT_TABLE, e)),
        }
    }

    pub fn insert(&self, record: &ContractRecord) -> Result<(), ContractError> {
        let key = record.key();
        let inserted = self
            .store
            .insert_row(CONTRACT_TABLE, record.to_row()?)
            .map_err(|e| ContractError::substrate("insert", key, e))?;
        if !inserted {
            return Err(ContractError::DuplicateKey {
                key: key.to_string(),
            });
        }
        debug!(key, "row inserted");
        Ok(())
    }

    /// Writes the full row back; the key must already exist.
    pub fn replace(&self, record: &ContractRecord) -> Result<(), ContractError> {
        let key = record.key();
        let replaced = self
            .store
            .replace_row(CONTRACT_TABLE, record.to_row()?)
            .map_err(|e| ContractError::substrate("replace", key, e))?;
        if !replaced {
            return Err(ContractError::NotFound {
                key: key.to_string(),
            });
        }
        debug!(key, "row replaced");
        Ok(())
    }

    pub fn get_by_key(&self, key: &str) -> Result<ContractRecord, ContractError> {
        let row = self
            .store
            .get_row(CONTRACT_TABLE, &[key.to_string()])
            .map_err(|e| ContractError::substrate("get", key, e))?
            .ok_or_else(|| ContractError::NotFound {
                key: key.to_string(),
            })?;
        ContractRecord::from_row(row)
    }
}
