//! Conversions between caller input, [`ContractRecord`] and result bytes.
//!
//! `assign` takes either the delimited `name:value,name:value,…` form with
//! every column in schema order, or a JSON object keyed by column name.
//! `updateDetails` takes six positional arguments.

use crate::contracts::{ContractRecord, StatusUpdate};
use crate::error::ContractError;
use crate::schema::{CONTRACT_FIELDS, FIELD_COUNT};

pub const UPDATE_ARITY: usize = 6;

/// Splits delimited input into column values, checking each name against
/// the schema column at the same position.
pub fn decode_delimited(input: &str) -> Result<Vec<String>, ContractError> {
    let groups: Vec<&str> = input.split(',').collect();
    if groups.len() != FIELD_COUNT {
        return Err(ContractError::MalformedInput(format!(
            "expected {FIELD_COUNT} comma separated fields, got {}",
            groups.len()
        )));
    }

    let mut values = Vec::with_capacity(FIELD_COUNT);
    for (position, (group, field)) in groups.iter().zip(CONTRACT_FIELDS.iter()).enumerate() {
        let (name, value) = group.split_once(':').ok_or_else(|| {
            ContractError::MalformedInput(format!("field {position} has no ':' separator"))
        })?;
        if name != field.name {
            return Err(ContractError::FieldMismatch {
                position,
                expected: field.name,
                found: name.to_string(),
            });
        }
        values.push(value.to_string());
    }
    Ok(values)
}

pub fn decode_assign(input: &str) -> Result<ContractRecord, ContractError> {
    if input.trim_start().starts_with('{') {
        return serde_json::from_str(input)
            .map_err(|e| ContractError::MalformedInput(e.to_string()));
    }
    ContractRecord::from_values(decode_delimited(input)?)
}

pub fn decode_update(args: &[String]) -> Result<StatusUpdate, ContractError> {
    match args {
        [key, purchase_order, invoice_status, payment_status, contract_status, delivery_status] => {
            Ok(StatusUpdate {
                key: key.clone(),
                purchase_order: purchase_order.clone(),
                invoice_status: invoice_status.clone(),
                payment_status: payment_status.clone(),
                contract_status: contract_status.clone(),
                delivery_status: delivery_status.clone(),
            })
        }
        _ => Err(ContractError::arity("updateDetails", UPDATE_ARITY, args.len())),
    }
}

pub fn encode_record(record: &ContractRecord) -> Result<Vec<u8>, ContractError> {
    Ok(serde_json::to_vec(record)?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_input() -> String {
        [
            "traderLoginUserName:alice",
            "isBuyer:false",
            "isSeller:true",
            "selectedBuyerName:bob",
            "purchaseOrder:PO1",
            "totalPrice:100",
            "currency:USD",
            "deliveryDate:2024-01-01",
            "incoterm:FOB",
            "paymentConditions:NET30",
            "articleId1:A1",
            "articleDesc1:Widget",
            "articleQuantity1:10",
            "articleId2:",
            "articleDesc2:",
            "articleQuantity2:",
            "buyerPaymentConfrimation:",
            "sellerInfoCounterParty:",
            "buyerBankCommitment:",
            "sellerForfaitInvoice:",
            "invoiceStatus:pending",
            "paymentStatus:pending",
            "contractStatus:open",
            "deliveryStatus:pending",
            "isOrderConfirmed:false",
            "deliveryTrackingId:",
        ]
        .join(",")
    }

    #[test]
    fn decodes_full_delimited_input() {
        let record = decode_assign(&sample_input()).unwrap();
        assert_eq!(record.trader_login_user_name, "alice");
        assert_eq!(record.selected_buyer_name, "bob");
        assert_eq!(record.purchase_order, "PO1");
        assert_eq!(record.contract_status, "open");
        assert_eq!(record.article_id2, "");
    }

    #[test]
    fn value_may_contain_colon() {
        let input = sample_input().replace("deliveryDate:2024-01-01", "deliveryDate:2024-01-01T10:00");
        let record = decode_assign(&input).unwrap();
        assert_eq!(record.delivery_date, "2024-01-01T10:00");
    }

    #[test]
    fn too_few_fields_is_malformed() {
        let err = decode_delimited("traderLoginUserName:alice,isBuyer:false").unwrap_err();
        assert!(matches!(err, ContractError::MalformedInput(_)));
        assert!(matches!(decode_delimited(""), Err(ContractError::MalformedInput(_))));
    }

    #[test]
    fn missing_separator_is_malformed() {
        let input = sample_input().replace("currency:USD", "currencyUSD");
        let err = decode_delimited(&input).unwrap_err();
        assert!(matches!(err, ContractError::MalformedInput(_)));
    }

    #[test]
    fn misplaced_field_name_is_rejected() {
        let input = sample_input().replace("isBuyer:false", "owner:false");
        match decode_delimited(&input).unwrap_err() {
            ContractError::FieldMismatch {
                position,
                expected,
                found,
            } => {
                assert_eq!(position, 1);
                assert_eq!(expected, "isBuyer");
                assert_eq!(found, "owner");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn json_input_matches_delimited_input() {
        let delimited = decode_assign(&sample_input()).unwrap();
        let json = serde_json::to_string(&delimited).unwrap();
        assert_eq!(decode_assign(&json).unwrap(), delimited);
    }

    #[test]
    fn json_input_with_unknown_field_is_rejected() {
        let mut value = serde_json::to_value(decode_assign(&sample_input()).unwrap()).unwrap();
        value["owner"] = "mallory".into();
        let err = decode_assign(&value.to_string()).unwrap_err();
        assert!(matches!(err, ContractError::MalformedInput(_)));
    }

    #[test]
    fn json_input_missing_field_is_malformed() {
        let mut value = serde_json::to_value(decode_assign(&sample_input()).unwrap()).unwrap();
        value.as_object_mut().unwrap().remove("deliveryTrackingId");
        let err = decode_assign(&value.to_string()).unwrap_err();
        assert!(matches!(err, ContractError::MalformedInput(ref msg) if msg.contains("deliveryTrackingId")));
    }

    #[test]
    fn json_input_with_non_string_value_is_malformed() {
        let mut value = serde_json::to_value(decode_assign(&sample_input()).unwrap()).unwrap();
        value["totalPrice"] = 100.into();
        let err = decode_assign(&value.to_string()).unwrap_err();
        assert!(matches!(err, ContractError::MalformedInput(_)));
    }

    #[test]
    fn update_requires_six_arguments() {
        let args: Vec<String> = vec!["alice".into(), "PO2".into()];
        let err = decode_update(&args).unwrap_err();
        assert!(matches!(
            err,
            ContractError::ArgumentCount {
                expected: 6,
                got: 2,
                ..
            }
        ));

        let args: Vec<String> = ["alice", "PO2", "issued", "paid", "closed", "shipped"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let update = decode_update(&args).unwrap();
        assert_eq!(update.key, "alice");
        assert_eq!(update.delivery_status, "shipped");
    }
}
