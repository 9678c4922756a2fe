use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::access::authorize_read;
use crate::codec::{decode_assign, decode_update, encode_record};
use crate::contracts::{ContractRecord, StatusUpdate};
use crate::error::ContractError;
use crate::ledger::TableStore;
use crate::table::ContractTable;

/// Entry points the host ledger runtime calls into.
///
/// The service keeps no state of its own; every call goes straight to the
/// injected store, so one instance can serve concurrent callers.
#[derive(Clone)]
pub struct ContractService {
    table: ContractTable,
}

impl ContractService {
    pub fn new(store: Arc<dyn TableStore>) -> Self {
        Self {
            table: ContractTable::new(store),
        }
    }

    /// Creates the contract table. Must run exactly once per ledger.
    pub fn init(&self, args: &[String]) -> Result<Vec<u8>, ContractError> {
        if !args.is_empty() {
            return Err(ContractError::arity("init", 0, args.len()));
        }
        self.table.create()?;
        info!("contract table created");
        Ok(Vec::new())
    }

    /// Mutating entry point: `assign` and `updateDetails`.
    pub fn invoke(&self, function: &str, args: &[String]) -> Result<Vec<u8>, ContractError> {
        debug!(function, args = args.len(), "invoke");
        match function {
            "assign" => {
                let [input] = args else {
                    return Err(ContractError::arity("assign", 1, args.len()));
                };
                self.assign(&decode_assign(input)?)?;
                Ok(Vec::new())
            }
            "updateDetails" => {
                self.update_details(&decode_update(args)?)?;
                Ok(Vec::new())
            }
            other => Err(ContractError::UnknownFunction(other.to_string())),
        }
    }

    /// Read-only entry point: `query(key)` on behalf of `caller`.
    pub fn query(
        &self,
        function: &str,
        args: &[String],
        caller: &str,
    ) -> Result<Vec<u8>, ContractError> {
        debug!(function, caller, "query");
        if function != "query" {
            return Err(ContractError::UnknownFunction(function.to_string()));
        }
        let [key] = args else {
            return Err(ContractError::arity("query", 1, args.len()));
        };
        encode_record(&self.read(key, caller)?)
    }

    pub fn assign(&self, record: &ContractRecord) -> Result<(), ContractError> {
        if record.key().is_empty() {
            return Err(ContractError::MalformedInput(
                "traderLoginUserName must not be empty".into(),
            ));
        }
        match self.table.insert(record) {
            Ok(()) => {
                info!(key = record.key(), buyer = %record.selected_buyer_name, "contract assigned");
                Ok(())
            }
            Err(err @ ContractError::DuplicateKey { .. }) => {
                warn!(key = record.key(), "contract already assigned");
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Read-modify-write of the full row: only the purchase order and the
    /// four workflow statuses change.
    pub fn update_details(&self, update: &StatusUpdate) -> Result<(), ContractError> {
        let mut record = self.table.get_by_key(&update.key)?;
        update.apply(&mut record);
        self.table.replace(&record)?;
        info!(
            key = %update.key,
            contract_status = %update.contract_status,
            delivery_status = %update.delivery_status,
            "contract details updated"
        );
        Ok(())
    }

    pub fn read(&self, key: &str, caller: &str) -> Result<ContractRecord, ContractError> {
        let record = self.table.get_by_key(key)?;
        authorize_read(record, caller).map_err(|err| {
            warn!(key, caller, "query denied");
            err
        })
    }
}
