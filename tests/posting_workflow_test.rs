mod common;

use assert_matches::assert_matches;
use rust_decimal_macros::dec;
use sea_orm::EntityTrait;
use uuid::Uuid;

use ledgercore::entities::counterparty::CounterpartyKind;
use ledgercore::entities::item::TrackingType;
use ledgercore::entities::ledger_entry::LedgerEntryKind;
use ledgercore::entities::outbox_notification::Entity as OutboxEntity;
use ledgercore::events::outbox;
use ledgercore::entities::payment::PaymentDirection;
use ledgercore::entities::sales_invoice::InvoiceStatus;
use ledgercore::queries;
use ledgercore::reference::reference_type;
use ledgercore::services::ledger::{AllocateCreditNote, AllocatePayment, IssueCreditNote, RecordPayment};
use ledgercore::services::posting::{CreateDraftInvoice, GoodsReceiptLine, PostGoodsReceipt};
use ledgercore::LedgerCore;
use ledgercore::ServiceError;

use common::{minutes_after, seed_counterparty, seed_item_with_cost, setup_core, test_epoch};

async fn outbox_event_types(core: &LedgerCore) -> Vec<String> {
    OutboxEntity::find()
        .all(&*core.db)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.event_type)
        .collect()
}

#[tokio::test]
async fn posting_an_invoice_mints_its_number_and_opens_the_receivable() {
    let core = setup_core().await;
    let customer = seed_counterparty(&core, CounterpartyKind::Customer, "Acme").await;

    let draft = core
        .posting
        .create_draft_invoice(CreateDraftInvoice {
            customer_id: customer,
            currency_code: "USD".to_string(),
            total_amount: dec!(100),
        })
        .await
        .unwrap();
    assert_eq!(draft.status, InvoiceStatus::Draft);
    assert_eq!(draft.invoice_number, None);

    let posted = core
        .posting
        .post_sales_invoice(draft.id, minutes_after(5))
        .await
        .unwrap();
    assert_eq!(posted.status, InvoiceStatus::Posted);
    assert_eq!(posted.invoice_number.as_deref(), Some("INV-000001"));
    assert_eq!(posted.posted_at, Some(minutes_after(5)));

    let open = queries::open_entries(&*core.db, LedgerEntryKind::Receivable, customer)
        .await
        .unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].amount, dec!(100));
    assert_eq!(open[0].outstanding, dec!(100));
    assert_eq!(open[0].reference_type, reference_type::SALES_INVOICE);
    assert_eq!(open[0].reference_id, posted.id);

    assert_eq!(outbox_event_types(&core).await, vec!["invoice_posted"]);
}

#[tokio::test]
async fn an_invoice_posts_only_once() {
    let core = setup_core().await;
    let customer = seed_counterparty(&core, CounterpartyKind::Customer, "Acme").await;
    let draft = core
        .posting
        .create_draft_invoice(CreateDraftInvoice {
            customer_id: customer,
            currency_code: "USD".to_string(),
            total_amount: dec!(100),
        })
        .await
        .unwrap();

    core.posting
        .post_sales_invoice(draft.id, test_epoch())
        .await
        .unwrap();
    assert_matches!(
        core.posting.post_sales_invoice(draft.id, test_epoch()).await,
        Err(ServiceError::ValidationError(_))
    );
    assert_matches!(
        core.posting
            .post_sales_invoice(Uuid::new_v4(), test_epoch())
            .await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn settlement_flips_the_invoice_exactly_at_zero_outstanding() {
    let core = setup_core().await;
    let customer = seed_counterparty(&core, CounterpartyKind::Customer, "Acme").await;
    let draft = core
        .posting
        .create_draft_invoice(CreateDraftInvoice {
            customer_id: customer,
            currency_code: "USD".to_string(),
            total_amount: dec!(100),
        })
        .await
        .unwrap();
    let invoice = core
        .posting
        .post_sales_invoice(draft.id, test_epoch())
        .await
        .unwrap();
    let entry_id = queries::open_entries(&*core.db, LedgerEntryKind::Receivable, customer)
        .await
        .unwrap()[0]
        .id;

    let payment = core
        .ledger
        .record_payment(RecordPayment {
            direction: PaymentDirection::Incoming,
            counterparty_kind: CounterpartyKind::Customer,
            counterparty_id: customer,
            currency_code: "USD".to_string(),
            exchange_rate: dec!(1),
            amount: dec!(100),
            paid_at: test_epoch(),
        })
        .await
        .unwrap();

    // Partial allocation leaves the invoice Posted.
    let outcome = core
        .ledger
        .allocate_payment(AllocatePayment {
            payment_id: payment.id,
            entry_id,
            amount: dec!(40),
        })
        .await
        .unwrap();
    assert_eq!(outcome.settled_invoice_id, None);
    let partial = ledgercore::entities::sales_invoice::Entity::find_by_id(invoice.id)
        .one(&*core.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(partial.status, InvoiceStatus::Posted);

    // The allocation that zeroes the entry flips the invoice in the same
    // transaction and stages the paid notification.
    let outcome = core
        .ledger
        .allocate_payment(AllocatePayment {
            payment_id: payment.id,
            entry_id,
            amount: dec!(60),
        })
        .await
        .unwrap();
    assert_eq!(outcome.settled_invoice_id, Some(invoice.id));
    let settled = ledgercore::entities::sales_invoice::Entity::find_by_id(invoice.id)
        .one(&*core.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(settled.status, InvoiceStatus::Paid);

    let event_types = outbox_event_types(&core).await;
    assert!(event_types.contains(&"invoice_paid".to_string()));
}

#[tokio::test]
async fn end_to_end_settlement_with_payment_then_credit_note() {
    let core = setup_core().await;
    let customer = seed_counterparty(&core, CounterpartyKind::Customer, "Acme").await;
    let draft = core
        .posting
        .create_draft_invoice(CreateDraftInvoice {
            customer_id: customer,
            currency_code: "USD".to_string(),
            total_amount: dec!(100),
        })
        .await
        .unwrap();
    let invoice = core
        .posting
        .post_sales_invoice(draft.id, test_epoch())
        .await
        .unwrap();
    let entry_id = queries::open_entries(&*core.db, LedgerEntryKind::Receivable, customer)
        .await
        .unwrap()[0]
        .id;

    // Payment of 40: outstanding 100 -> 60, payment fully spent.
    let payment = core
        .ledger
        .record_payment(RecordPayment {
            direction: PaymentDirection::Incoming,
            counterparty_kind: CounterpartyKind::Customer,
            counterparty_id: customer,
            currency_code: "USD".to_string(),
            exchange_rate: dec!(1),
            amount: dec!(40),
            paid_at: test_epoch(),
        })
        .await
        .unwrap();
    core.ledger
        .allocate_payment(AllocatePayment {
            payment_id: payment.id,
            entry_id,
            amount: dec!(40),
        })
        .await
        .unwrap();
    let entry = core.ledger.get_entry(entry_id).await.unwrap();
    assert_eq!(entry.outstanding, dec!(60));
    let payment = core.ledger.get_payment(payment.id).await.unwrap();
    assert_eq!(
        core.ledger
            .unallocated_amount(&*core.db, &payment)
            .await
            .unwrap(),
        dec!(0)
    );

    // Credit note of 60 settles the rest and pays the invoice.
    let note = core
        .ledger
        .issue_credit_note(IssueCreditNote {
            counterparty_kind: CounterpartyKind::Customer,
            counterparty_id: customer,
            amount: dec!(60),
            issued_at: test_epoch(),
            source_reference_type: Some(reference_type::SALES_INVOICE.to_string()),
            source_reference_id: Some(invoice.id),
        })
        .await
        .unwrap();
    let outcome = core
        .ledger
        .allocate_credit_note(AllocateCreditNote {
            credit_note_id: note.id,
            entry_id,
            amount: dec!(60),
        })
        .await
        .unwrap();
    assert_eq!(outcome.settled_invoice_id, Some(invoice.id));

    let entry = core.ledger.get_entry(entry_id).await.unwrap();
    assert!(entry.is_settled());
    let paid = ledgercore::entities::sales_invoice::Entity::find_by_id(invoice.id)
        .one(&*core.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(paid.status, InvoiceStatus::Paid);

    // Nothing further can be allocated against the settled entry.
    let late_payment = core
        .ledger
        .record_payment(RecordPayment {
            direction: PaymentDirection::Incoming,
            counterparty_kind: CounterpartyKind::Customer,
            counterparty_id: customer,
            currency_code: "USD".to_string(),
            exchange_rate: dec!(1),
            amount: dec!(10),
            paid_at: test_epoch(),
        })
        .await
        .unwrap();
    assert_matches!(
        core.ledger
            .allocate_payment(AllocatePayment {
                payment_id: late_payment.id,
                entry_id,
                amount: dec!(5),
            })
            .await,
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn goods_receipt_posts_lines_and_the_supplier_payable() {
    let core = setup_core().await;
    let supplier = seed_counterparty(&core, CounterpartyKind::Supplier, "Initech").await;
    let warehouse = Uuid::new_v4();
    let bolts = seed_item_with_cost(&core, "BOLT-20", TrackingType::None, dec!(10)).await;
    let resin = seed_item_with_cost(&core, "RESIN-20", TrackingType::Batch, dec!(2.5)).await;

    let receipt_id = Uuid::new_v4();
    let posted = core
        .posting
        .post_goods_receipt(PostGoodsReceipt {
            receipt_id,
            supplier_id: supplier,
            warehouse_id: warehouse,
            received_at: test_epoch(),
            lines: vec![
                GoodsReceiptLine {
                    item_id: bolts,
                    quantity: dec!(3),
                    unit_cost: None,
                    batch_number: None,
                    serial_numbers: Vec::new(),
                    reference_line_id: None,
                },
                GoodsReceiptLine {
                    item_id: resin,
                    quantity: dec!(4),
                    unit_cost: None,
                    batch_number: Some("LOT-D".to_string()),
                    serial_numbers: Vec::new(),
                    reference_line_id: None,
                },
            ],
        })
        .await
        .unwrap();

    assert_eq!(posted.reference, "GR-000001");
    assert_eq!(posted.total_amount, dec!(40));

    assert_eq!(
        ledgercore::services::inventory::on_hand(&*core.db, warehouse, bolts, None)
            .await
            .unwrap(),
        dec!(3)
    );
    assert_eq!(
        ledgercore::services::inventory::on_hand(&*core.db, warehouse, resin, Some("LOT-D"))
            .await
            .unwrap(),
        dec!(4)
    );

    let open = queries::open_entries(&*core.db, LedgerEntryKind::Payable, supplier)
        .await
        .unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].amount, dec!(40));
    assert_eq!(open[0].reference_type, reference_type::GOODS_RECEIPT);
    assert_eq!(open[0].reference_id, receipt_id);
    assert_eq!(Some(open[0].id), posted.payable_entry_id);

    assert_eq!(outbox_event_types(&core).await, vec!["goods_receipt_posted"]);
}

#[tokio::test]
async fn a_bad_line_rolls_back_the_whole_goods_receipt() {
    let core = setup_core().await;
    let supplier = seed_counterparty(&core, CounterpartyKind::Supplier, "Initech").await;
    let warehouse = Uuid::new_v4();
    let bolts = seed_item_with_cost(&core, "BOLT-21", TrackingType::None, dec!(10)).await;
    let pumps = seed_item_with_cost(&core, "PUMP-21", TrackingType::Serial, dec!(100)).await;

    let result = core
        .posting
        .post_goods_receipt(PostGoodsReceipt {
            receipt_id: Uuid::new_v4(),
            supplier_id: supplier,
            warehouse_id: warehouse,
            received_at: test_epoch(),
            lines: vec![
                GoodsReceiptLine {
                    item_id: bolts,
                    quantity: dec!(3),
                    unit_cost: None,
                    batch_number: None,
                    serial_numbers: Vec::new(),
                    reference_line_id: None,
                },
                // Serial-tracked line missing its serial numbers.
                GoodsReceiptLine {
                    item_id: pumps,
                    quantity: dec!(2),
                    unit_cost: None,
                    batch_number: None,
                    serial_numbers: Vec::new(),
                    reference_line_id: None,
                },
            ],
        })
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));

    // Line 1 rolled back with line 2.
    assert!(queries::movement_history(&*core.db, bolts, None)
        .await
        .unwrap()
        .is_empty());
    assert!(queries::open_entries(&*core.db, LedgerEntryKind::Payable, supplier)
        .await
        .unwrap()
        .is_empty());
    assert!(outbox_event_types(&core).await.is_empty());

    // The minted counter rolled back too: the next receipt is still first.
    let posted = core
        .posting
        .post_goods_receipt(PostGoodsReceipt {
            receipt_id: Uuid::new_v4(),
            supplier_id: supplier,
            warehouse_id: warehouse,
            received_at: test_epoch(),
            lines: vec![GoodsReceiptLine {
                item_id: bolts,
                quantity: dec!(1),
                unit_cost: None,
                batch_number: None,
                serial_numbers: Vec::new(),
                reference_line_id: None,
            }],
        })
        .await
        .unwrap();
    assert_eq!(posted.reference, "GR-000001");
}

#[tokio::test]
async fn empty_goods_receipts_are_rejected() {
    let core = setup_core().await;
    let supplier = seed_counterparty(&core, CounterpartyKind::Supplier, "Initech").await;

    let result = core
        .posting
        .post_goods_receipt(PostGoodsReceipt {
            receipt_id: Uuid::new_v4(),
            supplier_id: supplier,
            warehouse_id: Uuid::new_v4(),
            received_at: test_epoch(),
            lines: Vec::new(),
        })
        .await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn counterparty_contact_feeds_the_outbox_payload() {
    let core = setup_core().await;
    let customer = seed_counterparty(&core, CounterpartyKind::Customer, "Acme").await;

    let contact = queries::counterparty_contact(&*core.db, customer)
        .await
        .unwrap();
    assert_eq!(contact.name, "Acme");
    assert_eq!(contact.email.as_deref(), Some("acme@example.test"));

    assert_matches!(
        queries::counterparty_contact(&*core.db, Uuid::new_v4()).await,
        Err(ServiceError::NotFound(_))
    );

    let draft = core
        .posting
        .create_draft_invoice(CreateDraftInvoice {
            customer_id: customer,
            currency_code: "USD".to_string(),
            total_amount: dec!(10),
        })
        .await
        .unwrap();
    core.posting
        .post_sales_invoice(draft.id, test_epoch())
        .await
        .unwrap();

    let rows = outbox::pending(&*core.db, 10).await.unwrap();
    assert_eq!(rows.len(), 1);
    let payload = &rows[0].payload;
    assert_eq!(payload["customer"]["name"], "Acme");
    assert_eq!(payload["reference"], "INV-000001");
    assert_eq!(rows[0].status, "pending");

    // Once the dispatcher hands it off, the queue drains.
    outbox::mark_delivered(&*core.db, rows[0].id, test_epoch())
        .await
        .unwrap();
    assert!(outbox::pending(&*core.db, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn rejected_drafts_never_reach_the_ledger() {
    let core = setup_core().await;
    let customer = seed_counterparty(&core, CounterpartyKind::Customer, "Acme").await;

    assert_matches!(
        core.posting
            .create_draft_invoice(CreateDraftInvoice {
                customer_id: customer,
                currency_code: "USD".to_string(),
                total_amount: dec!(0),
            })
            .await,
        Err(ServiceError::ValidationError(_))
    );
    assert_matches!(
        core.posting
            .create_draft_invoice(CreateDraftInvoice {
                customer_id: customer,
                currency_code: "US".to_string(),
                total_amount: dec!(10),
            })
            .await,
        Err(ServiceError::ValidationError(_))
    );
}
