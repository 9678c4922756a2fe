use serde::{Deserialize, Serialize};

/// Name of the single logical table holding trade contracts.
pub const CONTRACT_TABLE: &str = "ContractRecords";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    String,
}

impl ColumnType {
    pub fn tag(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub kind: ColumnType,
    pub key: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub key: bool,
}

const fn key(name: &'static str) -> FieldDescriptor {
    FieldDescriptor { name, key: true }
}

const fn col(name: &'static str) -> FieldDescriptor {
    FieldDescriptor { name, key: false }
}

/// Column order of the contract table. Encoding and decoding both walk this
/// list, so a row is always `CONTRACT_FIELDS.len()` values long.
pub const CONTRACT_FIELDS: [FieldDescriptor; 26] = [
    key("traderLoginUserName"),
    col("isBuyer"),
    col("isSeller"),
    col("selectedBuyerName"),
    col("purchaseOrder"),
    col("totalPrice"),
    col("currency"),
    col("deliveryDate"),
    col("incoterm"),
    col("paymentConditions"),
    col("articleId1"),
    col("articleDesc1"),
    col("articleQuantity1"),
    col("articleId2"),
    col("articleDesc2"),
    col("articleQuantity2"),
    col("buyerPaymentConfrimation"),
    col("sellerInfoCounterParty"),
    col("buyerBankCommitment"),
    col("sellerForfaitInvoice"),
    col("invoiceStatus"),
    col("paymentStatus"),
    col("contractStatus"),
    col("deliveryStatus"),
    col("isOrderConfirmed"),
    col("deliveryTrackingId"),
];

pub const FIELD_COUNT: usize = CONTRACT_FIELDS.len();

/// Column definitions handed to the substrate when the table is created.
pub fn contract_columns() -> Vec<ColumnDefinition> {
    CONTRACT_FIELDS
        .iter()
        .map(|f| ColumnDefinition {
            name: f.name.to_string(),
            kind: ColumnType::String,
            key: f.key,
        })
        .collect()
}

pub fn position_of(name: &str) -> Option<usize> {
    CONTRACT_FIELDS.iter().position(|f| f.name == name)
}
