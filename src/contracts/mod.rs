use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ContractError;
use crate::ledger::Row;
use crate::schema::{CONTRACT_FIELDS, FIELD_COUNT};

pub type Identity = String;

/// A trade contract between the trader (`trader_login_user_name`) and the
/// selected buyer. Serialises with the ledger's camelCase column names.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContractRecord {
    pub trader_login_user_name: Identity,
    pub is_buyer: String,
    pub is_seller: String,
    pub selected_buyer_name: Identity,
    pub purchase_order: String,
    pub total_price: String,
    pub currency: String,
    pub delivery_date: String,
    pub incoterm: String,
    pub payment_conditions: String,
    pub article_id1: String,
    pub article_desc1: String,
    pub article_quantity1: String,
    pub article_id2: String,
    pub article_desc2: String,
    pub article_quantity2: String,
    pub buyer_payment_confrimation: String,
    pub seller_info_counter_party: String,
    pub buyer_bank_commitment: String,
    pub seller_forfait_invoice: String,
    pub invoice_status: String,
    pub payment_status: String,
    pub contract_status: String,
    pub delivery_status: String,
    pub is_order_confirmed: String,
    pub delivery_tracking_id: String,
}

impl ContractRecord {
    pub fn key(&self) -> &str {
        &self.trader_login_user_name
    }

    /// Builds a record from values given in schema column order.
    pub fn from_values(values: Vec<String>) -> Result<Self, ContractError> {
        if values.len() != FIELD_COUNT {
            return Err(ContractError::MalformedInput(format!(
                "expected {FIELD_COUNT} values, got {}",
                values.len()
            )));
        }
        let map: Map<String, Value> = CONTRACT_FIELDS
            .iter()
            .zip(values)
            .map(|(field, value)| (field.name.to_string(), Value::String(value)))
            .collect();
        Ok(serde_json::from_value(Value::Object(map))?)
    }

    pub fn from_row(row: Row) -> Result<Self, ContractError> {
        Self::from_values(row.columns)
    }

    pub fn to_row(&self) -> Result<Row, ContractError> {
        let mut map = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => return Err(ContractError::MalformedInput("record is not an object".into())),
        };
        let mut columns = Vec::with_capacity(FIELD_COUNT);
        for field in CONTRACT_FIELDS.iter() {
            match map.remove(field.name) {
                Some(Value::String(value)) => columns.push(value),
                _ => {
                    return Err(ContractError::MalformedInput(format!(
                        "record has no string column {}",
                        field.name
                    )))
                }
            }
        }
        Ok(Row::new(columns))
    }
}

/// Workflow fields rewritten by `updateDetails`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusUpdate {
    pub key: Identity,
    pub purchase_order: String,
    pub invoice_status: String,
    pub payment_status: String,
    pub contract_status: String,
    pub delivery_status: String,
}

impl StatusUpdate {
    pub fn apply(&self, record: &mut ContractRecord) {
        record.purchase_order = self.purchase_order.clone();
        record.invoice_status = self.invoice_status.clone();
        record.payment_status = self.payment_status.clone();
        record.contract_status = self.contract_status.clone();
        record.delivery_status = self.delivery_status.clone();
    }
}
