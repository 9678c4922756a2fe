use std::sync::{Arc, Barrier};
use std::thread;

use trade_ledger::contracts::ContractRecord;
use trade_ledger::schema::{CONTRACT_FIELDS, FIELD_COUNT};
use trade_ledger::{ContractError, ContractService, MemoryLedger};

const ALICE_CONTRACT: &str = "traderLoginUserName:alice,isBuyer:false,isSeller:true,selectedBuyerName:bob,purchaseOrder:PO1,totalPrice:100,currency:USD,deliveryDate:2024-01-01,incoterm:FOB,paymentConditions:NET30,articleId1:A1,articleDesc1:Widget,articleQuantity1:10,articleId2:,articleDesc2:,articleQuantity2:,buyerPaymentConfrimation:,sellerInfoCounterParty:,buyerBankCommitment:,sellerForfaitInvoice:,invoiceStatus:pending,paymentStatus:pending,contractStatus:open,deliveryStatus:pending,isOrderConfirmed:false,deliveryTrackingId:";

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn setup() -> (Arc<MemoryLedger>, ContractService) {
    let ledger = Arc::new(MemoryLedger::new());
    let service = ContractService::new(ledger.clone());
    service.init(&[]).unwrap();
    (ledger, service)
}

fn query(service: &ContractService, key: &str, caller: &str) -> Result<ContractRecord, ContractError> {
    let bytes = service.query("query", &args(&[key]), caller)?;
    Ok(serde_json::from_slice(&bytes).unwrap())
}

#[test]
fn assigned_fields_come_back_in_schema_order() {
    let (_, service) = setup();
    service.invoke("assign", &args(&[ALICE_CONTRACT])).unwrap();

    let record = query(&service, "alice", "alice").unwrap();
    let value = serde_json::to_value(&record).unwrap();
    let expected: Vec<(&str, &str)> = ALICE_CONTRACT
        .split(',')
        .map(|group| group.split_once(':').unwrap())
        .collect();
    assert_eq!(expected.len(), FIELD_COUNT);
    for ((name, stored), field) in expected.iter().zip(CONTRACT_FIELDS.iter()) {
        assert_eq!(*name, field.name);
        assert_eq!(value[field.name], *stored);
    }
    assert_eq!(record.purchase_order, "PO1");
    assert_eq!(record.contract_status, "open");
}

#[test]
fn buyer_reads_and_stranger_is_refused() {
    let (_, service) = setup();
    service.invoke("assign", &args(&[ALICE_CONTRACT])).unwrap();

    assert_eq!(query(&service, "alice", "bob").unwrap().selected_buyer_name, "bob");
    assert!(matches!(
        query(&service, "alice", "carol"),
        Err(ContractError::Forbidden { .. })
    ));
    assert!(matches!(
        query(&service, "carol", "carol"),
        Err(ContractError::NotFound { .. })
    ));
}

#[test]
fn second_assign_is_rejected_and_first_wins() {
    let (ledger, service) = setup();
    service.invoke("assign", &args(&[ALICE_CONTRACT])).unwrap();
    let root = ledger.state_root().unwrap();

    let rival = ALICE_CONTRACT.replace("selectedBuyerName:bob", "selectedBuyerName:mallory");
    let err = service.invoke("assign", &[rival]).unwrap_err();
    assert!(matches!(err, ContractError::DuplicateKey { ref key } if key == "alice"));
    assert_eq!(ledger.state_root().unwrap(), root);
    assert_eq!(query(&service, "alice", "alice").unwrap().selected_buyer_name, "bob");
}

#[test]
fn update_on_missing_key_leaves_store_unchanged() {
    let (ledger, service) = setup();
    service.invoke("assign", &args(&[ALICE_CONTRACT])).unwrap();
    let root = ledger.state_root().unwrap();

    let err = service
        .invoke(
            "updateDetails",
            &args(&["dave", "PO9", "issued", "paid", "closed", "delivered"]),
        )
        .unwrap_err();
    assert!(matches!(err, ContractError::NotFound { ref key } if key == "dave"));
    assert_eq!(ledger.state_root().unwrap(), root);
}

#[test]
fn repeated_updates_only_touch_workflow_fields() {
    let (_, service) = setup();
    service.invoke("assign", &args(&[ALICE_CONTRACT])).unwrap();
    let original = query(&service, "alice", "alice").unwrap();

    for (po, status) in [("PO2", "shipped"), ("PO3", "delivered")] {
        service
            .invoke(
                "updateDetails",
                &args(&["alice", po, "issued", "paid", "closed", status]),
            )
            .unwrap();
    }

    let updated = query(&service, "alice", "alice").unwrap();
    let mut expected = original.clone();
    expected.purchase_order = "PO3".into();
    expected.invoice_status = "issued".into();
    expected.payment_status = "paid".into();
    expected.contract_status = "closed".into();
    expected.delivery_status = "delivered".into();
    assert_eq!(updated, expected);
}

#[test]
fn concurrent_assigns_on_one_key_admit_exactly_one() {
    let (_, service) = setup();
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = ["bob", "mallory"]
        .into_iter()
        .map(|buyer| {
            let service = service.clone();
            let barrier = barrier.clone();
            let input = ALICE_CONTRACT.replace("selectedBuyerName:bob", &format!("selectedBuyerName:{buyer}"));
            thread::spawn(move || {
                barrier.wait();
                service.invoke("assign", &[input])
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(ContractError::DuplicateKey { .. })))
            .count(),
        1
    );
}

#[test]
fn ledger_survives_snapshot_restore() {
    let (ledger, service) = setup();
    service.invoke("assign", &args(&[ALICE_CONTRACT])).unwrap();

    let json = serde_json::to_string(&ledger.snapshot().unwrap()).unwrap();
    let restored = Arc::new(MemoryLedger::from_snapshot(serde_json::from_str(&json).unwrap()).unwrap());
    let service = ContractService::new(restored);

    assert_eq!(query(&service, "alice", "bob").unwrap().purchase_order, "PO1");
    assert!(matches!(service.init(&[]), Err(ContractError::AlreadyInitialized)));
}
