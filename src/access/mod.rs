use crate::contracts::ContractRecord;
use crate::error::ContractError;

/// Which side of the contract a reader is on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Seller,
    Buyer,
}

pub fn role_of(record: &ContractRecord, caller: &str) -> Option<Role> {
    if caller.is_empty() {
        None
    } else if caller == record.trader_login_user_name {
        Some(Role::Seller)
    } else if caller == record.selected_buyer_name {
        Some(Role::Buyer)
    } else {
        None
    }
}

/// Hands the record back only to its trader or its selected buyer.
pub fn authorize_read(record: ContractRecord, caller: &str) -> Result<ContractRecord, ContractError> {
    match role_of(&record, caller) {
        Some(_) => Ok(record),
        None => Err(ContractError::Forbidden {
            key: record.trader_login_user_name,
            caller: caller.to_string(),
        }),
    }
}
