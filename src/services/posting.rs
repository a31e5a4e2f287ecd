use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::clock::Clock;
use crate::entities::inventory_movement::MovementType;
use crate::entities::item::Entity as ItemEntity;
use crate::entities::ledger_entry::LedgerEntryKind;
use crate::entities::sales_invoice::{self, Entity as SalesInvoiceEntity, InvoiceStatus};
use crate::errors::ServiceError;
use crate::events::{outbox, Event, EventSender};
use crate::queries;
use crate::reference::{document_type, reference_type};
use crate::services::inventory::{InventoryService, RecordMovement};
use crate::services::ledger::{CreateEntry, LedgerService};
use crate::services::sequence::SequenceService;

/// Command to create a draft sales invoice. Drafts carry no invoice
/// number; the gap-free sequence is only spent at posting time.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDraftInvoice {
    pub customer_id: Uuid,
    #[validate(length(equal = 3))]
    pub currency_code: String,
    pub total_amount: Decimal,
}

/// One line of a goods receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoodsReceiptLine {
    pub item_id: Uuid,
    pub quantity: Decimal,
    /// Overrides the item's default unit cost when set.
    pub unit_cost: Option<Decimal>,
    pub batch_number: Option<String>,
    #[serde(default)]
    pub serial_numbers: Vec<String>,
    pub reference_line_id: Option<Uuid>,
}

/// Command to post a goods receipt: every line becomes a receipt movement
/// and the line total becomes the supplier's payable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostGoodsReceipt {
    pub receipt_id: Uuid,
    pub supplier_id: Uuid,
    pub warehouse_id: Uuid,
    pub received_at: DateTime<Utc>,
    pub lines: Vec<GoodsReceiptLine>,
}

/// Result of posting a goods receipt.
#[derive(Debug, Clone)]
pub struct GoodsReceiptPosted {
    pub reference: String,
    /// Absent for a zero-value receipt, which raises no payable.
    pub payable_entry_id: Option<Uuid>,
    pub total_amount: Decimal,
}

/// Document posting workflows composing the sequence generator, the
/// inventory ledger and the entry store into single units of work.
#[derive(Clone)]
pub struct PostingService {
    db: Arc<DatabaseConnection>,
    sequences: SequenceService,
    inventory: InventoryService,
    ledger: LedgerService,
    event_sender: EventSender,
    clock: Arc<dyn Clock>,
}

impl PostingService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        sequences: SequenceService,
        inventory: InventoryService,
        ledger: LedgerService,
        event_sender: EventSender,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            db,
            sequences,
            inventory,
            ledger,
            event_sender,
            clock,
        }
    }

    /// Creates a draft sales invoice.
    #[instrument(skip(self))]
    pub async fn create_draft_invoice(
        &self,
        command: CreateDraftInvoice,
    ) -> Result<sales_invoice::Model, ServiceError> {
        command.validate()?;
        if command.total_amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Invoice total must be positive, got {}",
                command.total_amount
            )));
        }

        let now = self.clock.now();
        let invoice = sales_invoice::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_number: Set(None),
            customer_id: Set(command.customer_id),
            currency_code: Set(command.currency_code),
            total_amount: Set(command.total_amount),
            status: Set(InvoiceStatus::Draft),
            posted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };
        invoice
            .insert(&*self.db)
            .await
            .map_err(ServiceError::db_error)
    }

    /// Posts a draft invoice: mints its `INV` reference, opens the
    /// customer's receivable and stages the posted-notification in one
    /// transaction, all or nothing.
    #[instrument(skip(self))]
    pub async fn post_sales_invoice(
        &self,
        invoice_id: Uuid,
        posted_at: DateTime<Utc>,
    ) -> Result<sales_invoice::Model, ServiceError> {
        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        // An early return drops the transaction, which rolls it back.
        let invoice = SalesInvoiceEntity::find_by_id(invoice_id)
            .one(&txn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Sales invoice {} not found", invoice_id))
            })?;
        if !invoice.status.can_transition_to(InvoiceStatus::Posted) {
            return Err(ServiceError::ValidationError(format!(
                "Invoice {} cannot be posted from status {}",
                invoice.id, invoice.status
            )));
        }

        let reference = self
            .sequences
            .next_reference_in(&txn, document_type::SALES_INVOICE, document_type::SALES_INVOICE)
            .await?;

        let now = self.clock.now();
        let mut active: sales_invoice::ActiveModel = invoice.into();
        active.invoice_number = Set(Some(reference.clone()));
        active.status = Set(InvoiceStatus::Posted);
        active.posted_at = Set(Some(posted_at));
        active.updated_at = Set(now);
        let invoice = active.update(&txn).await.map_err(ServiceError::db_error)?;

        self.ledger
            .create_entry_in(
                &txn,
                &CreateEntry {
                    kind: LedgerEntryKind::Receivable,
                    counterparty_id: invoice.customer_id,
                    reference_type: reference_type::SALES_INVOICE.to_string(),
                    reference_id: invoice.id,
                    amount: invoice.total_amount,
                    posted_at,
                },
            )
            .await?;

        let customer = match queries::counterparty_contact(&txn, invoice.customer_id).await {
            Ok(contact) => Some(contact),
            Err(ServiceError::NotFound(_)) => None,
            Err(err) => return Err(err),
        };
        outbox::stage(
            &txn,
            now,
            "sales_invoice",
            Some(invoice.id),
            "invoice_posted",
            json!({
                "invoice_id": invoice.id,
                "reference": reference,
                "total_amount": invoice.total_amount,
                "currency_code": invoice.currency_code,
                "customer": customer,
            }),
        )
        .await?;

        txn.commit().await.map_err(ServiceError::conflict_or_db)?;

        self.event_sender
            .send_or_log(Event::InvoicePosted {
                invoice_id: invoice.id,
                reference: reference.clone(),
            })
            .await;

        info!("Posted sales invoice {} as {}", invoice.id, reference);
        Ok(invoice)
    }

    /// Posts a goods receipt: one receipt movement per line plus the
    /// supplier's payable, in one transaction. A failure on any line
    /// discards every line.
    #[instrument(skip(self, command))]
    pub async fn post_goods_receipt(
        &self,
        command: PostGoodsReceipt,
    ) -> Result<GoodsReceiptPosted, ServiceError> {
        if command.lines.is_empty() {
            return Err(ServiceError::ValidationError(
                "A goods receipt needs at least one line".to_string(),
            ));
        }

        let txn = self.db.begin().await.map_err(ServiceError::db_error)?;

        let reference = self
            .sequences
            .next_reference_in(&txn, document_type::GOODS_RECEIPT, document_type::GOODS_RECEIPT)
            .await?;

        let mut total_amount = Decimal::ZERO;
        for line in &command.lines {
            let unit_cost = match line.unit_cost {
                Some(cost) => cost,
                None => {
                    ItemEntity::find_by_id(line.item_id)
                        .one(&txn)
                        .await
                        .map_err(ServiceError::db_error)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Item {} not found", line.item_id))
                        })?
                        .default_unit_cost
                }
            };

            let movement = RecordMovement {
                occurred_at: command.received_at,
                warehouse_id: command.warehouse_id,
                item_id: line.item_id,
                quantity: line.quantity,
                unit_cost: Some(unit_cost),
                reference_type: reference_type::GOODS_RECEIPT.to_string(),
                reference_id: command.receipt_id,
                reference_line_id: line.reference_line_id,
                batch_number: line.batch_number.clone(),
                serial_numbers: line.serial_numbers.clone(),
            };
            self.inventory
                .record_movement_in(&txn, MovementType::Receipt, &movement)
                .await?;

            total_amount += unit_cost * line.quantity;
        }

        let payable_entry_id = if total_amount > Decimal::ZERO {
            let entry = self
                .ledger
                .create_entry_in(
                    &txn,
                    &CreateEntry {
                        kind: LedgerEntryKind::Payable,
                        counterparty_id: command.supplier_id,
                        reference_type: reference_type::GOODS_RECEIPT.to_string(),
                        reference_id: command.receipt_id,
                        amount: total_amount,
                        posted_at: command.received_at,
                    },
                )
                .await?;
            Some(entry.id)
        } else {
            None
        };

        let supplier = match queries::counterparty_contact(&txn, command.supplier_id).await {
            Ok(contact) => Some(contact),
            Err(ServiceError::NotFound(_)) => None,
            Err(err) => return Err(err),
        };
        let now = self.clock.now();
        outbox::stage(
            &txn,
            now,
            "goods_receipt",
            Some(command.receipt_id),
            "goods_receipt_posted",
            json!({
                "receipt_id": command.receipt_id,
                "reference": reference,
                "total_amount": total_amount,
                "supplier": supplier,
            }),
        )
        .await?;

        txn.commit().await.map_err(ServiceError::conflict_or_db)?;

        self.event_sender
            .send_or_log(Event::GoodsReceiptPosted {
                receipt_id: command.receipt_id,
                reference: reference.clone(),
                line_count: command.lines.len(),
            })
            .await;

        info!(
            "Posted goods receipt {} as {} ({} lines, total {})",
            command.receipt_id,
            reference,
            command.lines.len(),
            total_amount
        );
        Ok(GoodsReceiptPosted {
            reference,
            payable_entry_id,
            total_amount,
        })
    }
}
