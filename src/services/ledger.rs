use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DbBackend, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::clock::Clock;
use crate::db;
use crate::entities::allocation::{self, Entity as AllocationEntity};
use crate::entities::counterparty::CounterpartyKind;
use crate::entities::credit_note::{self, Entity as CreditNoteEntity};
use crate::entities::ledger_entry::{self, Entity as LedgerEntryEntity, LedgerEntryKind};
use crate::entities::payment::{self, Entity as PaymentEntity, PaymentDirection};
use crate::entities::sales_invoice::{self, Entity as SalesInvoiceEntity, InvoiceStatus};
use crate::errors::ServiceError;
use crate::events::{outbox, Event, EventSender};
use crate::reference::{document_type, reference_type};
use crate::services::sequence::SequenceService;

/// Command to open a receivable or payable obligation.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEntry {
    pub kind: LedgerEntryKind,
    pub counterparty_id: Uuid,
    #[validate(length(min = 1))]
    pub reference_type: String,
    pub reference_id: Uuid,
    pub amount: Decimal,
    pub posted_at: DateTime<Utc>,
}

/// Command to record a received or issued payment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordPayment {
    pub direction: PaymentDirection,
    pub counterparty_kind: CounterpartyKind,
    pub counterparty_id: Uuid,
    #[validate(length(equal = 3))]
    pub currency_code: String,
    pub exchange_rate: Decimal,
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
}

/// Command to issue a credit note.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IssueCreditNote {
    pub counterparty_kind: CounterpartyKind,
    pub counterparty_id: Uuid,
    pub amount: Decimal,
    pub issued_at: DateTime<Utc>,
    pub source_reference_type: Option<String>,
    pub source_reference_id: Option<Uuid>,
}

/// Command to issue a debit note. Issuance posts the matching ledger entry
/// in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct IssueDebitNote {
    pub counterparty_kind: CounterpartyKind,
    pub counterparty_id: Uuid,
    pub amount: Decimal,
    pub issued_at: DateTime<Utc>,
    pub source_reference_type: Option<String>,
    pub source_reference_id: Option<Uuid>,
}

/// Command to apportion part of a payment against one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocatePayment {
    pub payment_id: Uuid,
    pub entry_id: Uuid,
    pub amount: Decimal,
}

/// Command to apportion part of a credit note against one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocateCreditNote {
    pub credit_note_id: Uuid,
    pub entry_id: Uuid,
    pub amount: Decimal,
}

/// What one allocation did, including whether it settled a sales invoice.
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub allocation: allocation::Model,
    pub settled_invoice_id: Option<Uuid>,
}

/// Receivable/payable store and allocation engine.
///
/// Entries are mutated only by allocations, allocations are append-only,
/// and every conditional write runs under a row lock (or SQLite's single
/// writer) so outstanding amounts cannot be lost to concurrent updates.
#[derive(Clone)]
pub struct LedgerService {
    db: Arc<DatabaseConnection>,
    sequences: SequenceService,
    event_sender: EventSender,
    clock: Arc<dyn Clock>,
}

impl LedgerService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        sequences: SequenceService,
        event_sender: EventSender,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            db,
            sequences,
            event_sender,
            clock,
        }
    }

    /// Opens an obligation with `outstanding = amount`.
    #[instrument(skip(self))]
    pub async fn create_entry(
        &self,
        command: CreateEntry,
    ) -> Result<ledger_entry::Model, ServiceError> {
        let svc = self.clone();
        db::with_transaction(&self.db, move |txn| {
            Box::pin(async move { svc.create_entry_in(txn, &command).await })
        })
        .await
    }

    /// `create_entry` against the caller's unit of work.
    pub async fn create_entry_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        command: &CreateEntry,
    ) -> Result<ledger_entry::Model, ServiceError> {
        command.validate()?;
        if command.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Entry amount must be positive, got {}",
                command.amount
            )));
        }

        let now = self.clock.now();
        let entry = ledger_entry::ActiveModel {
            id: Set(Uuid::new_v4()),
            kind: Set(command.kind),
            counterparty_id: Set(command.counterparty_id),
            reference_type: Set(command.reference_type.clone()),
            reference_id: Set(command.reference_id),
            amount: Set(command.amount),
            outstanding: Set(command.amount),
            posted_at: Set(command.posted_at),
            created_at: Set(now),
            updated_at: Set(now),
        };
        entry.insert(conn).await.map_err(ServiceError::db_error)
    }

    /// Records a payment, minting its reference in the same transaction.
    #[instrument(skip(self))]
    pub async fn record_payment(
        &self,
        command: RecordPayment,
    ) -> Result<payment::Model, ServiceError> {
        let svc = self.clone();
        let payment = db::with_transaction(&self.db, move |txn| {
            Box::pin(async move { svc.record_payment_in(txn, &command).await })
        })
        .await?;

        self.event_sender
            .send_or_log(Event::PaymentRecorded {
                payment_id: payment.id,
                reference: payment.reference_number.clone(),
            })
            .await;
        Ok(payment)
    }

    /// `record_payment` against the caller's unit of work.
    pub async fn record_payment_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        command: &RecordPayment,
    ) -> Result<payment::Model, ServiceError> {
        command.validate()?;
        if command.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Payment amount must be positive, got {}",
                command.amount
            )));
        }
        if command.exchange_rate <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Exchange rate must be positive, got {}",
                command.exchange_rate
            )));
        }

        let reference = self
            .sequences
            .next_reference_in(conn, document_type::PAYMENT, document_type::PAYMENT)
            .await?;
        let payment = payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            reference_number: Set(reference),
            direction: Set(command.direction),
            counterparty_kind: Set(command.counterparty_kind),
            counterparty_id: Set(command.counterparty_id),
            currency_code: Set(command.currency_code.clone()),
            exchange_rate: Set(command.exchange_rate),
            amount: Set(command.amount),
            paid_at: Set(command.paid_at),
            created_at: Set(self.clock.now()),
        };
        payment.insert(conn).await.map_err(ServiceError::db_error)
    }

    /// Issues a credit note with `remaining_amount = amount`.
    #[instrument(skip(self))]
    pub async fn issue_credit_note(
        &self,
        command: IssueCreditNote,
    ) -> Result<credit_note::Model, ServiceError> {
        let svc = self.clone();
        let note = db::with_transaction(&self.db, move |txn| {
            Box::pin(async move { svc.issue_credit_note_in(txn, &command).await })
        })
        .await?;

        self.event_sender
            .send_or_log(Event::CreditNoteIssued {
                credit_note_id: note.id,
                reference: note.reference_number.clone(),
            })
            .await;
        Ok(note)
    }

    /// `issue_credit_note` against the caller's unit of work.
    pub async fn issue_credit_note_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        command: &IssueCreditNote,
    ) -> Result<credit_note::Model, ServiceError> {
        command.validate()?;
        if command.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Credit note amount must be positive, got {}",
                command.amount
            )));
        }

        let reference = self
            .sequences
            .next_reference_in(conn, document_type::CREDIT_NOTE, document_type::CREDIT_NOTE)
            .await?;
        let now = self.clock.now();
        let note = credit_note::ActiveModel {
            id: Set(Uuid::new_v4()),
            reference_number: Set(reference),
            counterparty_kind: Set(command.counterparty_kind),
            counterparty_id: Set(command.counterparty_id),
            amount: Set(command.amount),
            remaining_amount: Set(command.amount),
            issued_at: Set(command.issued_at),
            source_reference_type: Set(command.source_reference_type.clone()),
            source_reference_id: Set(command.source_reference_id),
            created_at: Set(now),
            updated_at: Set(now),
        };
        note.insert(conn).await.map_err(ServiceError::db_error)
    }

    /// Issues a debit note and posts its ledger entry atomically. The entry
    /// kind follows the counterparty: customers owe us more (receivable),
    /// we owe suppliers more (payable).
    #[instrument(skip(self))]
    pub async fn issue_debit_note(
        &self,
        command: IssueDebitNote,
    ) -> Result<(crate::entities::debit_note::Model, ledger_entry::Model), ServiceError> {
        let svc = self.clone();
        let (note, entry) = db::with_transaction(&self.db, move |txn| {
            Box::pin(async move { svc.issue_debit_note_in(txn, &command).await })
        })
        .await?;

        self.event_sender
            .send_or_log(Event::DebitNoteIssued {
                debit_note_id: note.id,
                reference: note.reference_number.clone(),
            })
            .await;
        Ok((note, entry))
    }

    /// `issue_debit_note` against the caller's unit of work.
    pub async fn issue_debit_note_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        command: &IssueDebitNote,
    ) -> Result<(crate::entities::debit_note::Model, ledger_entry::Model), ServiceError> {
        use crate::entities::debit_note;

        command.validate()?;
        if command.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Debit note amount must be positive, got {}",
                command.amount
            )));
        }

        let reference = self
            .sequences
            .next_reference_in(conn, document_type::DEBIT_NOTE, document_type::DEBIT_NOTE)
            .await?;
        let note = debit_note::ActiveModel {
            id: Set(Uuid::new_v4()),
            reference_number: Set(reference),
            counterparty_kind: Set(command.counterparty_kind),
            counterparty_id: Set(command.counterparty_id),
            amount: Set(command.amount),
            remaining_amount: Set(command.amount),
            issued_at: Set(command.issued_at),
            source_reference_type: Set(command.source_reference_type.clone()),
            source_reference_id: Set(command.source_reference_id),
            created_at: Set(self.clock.now()),
        };
        let note = note.insert(conn).await.map_err(ServiceError::db_error)?;

        let entry = self
            .create_entry_in(
                conn,
                &CreateEntry {
                    kind: entry_kind_for(command.counterparty_kind),
                    counterparty_id: command.counterparty_id,
                    reference_type: reference_type::DEBIT_NOTE.to_string(),
                    reference_id: note.id,
                    amount: command.amount,
                    posted_at: command.issued_at,
                },
            )
            .await?;

        Ok((note, entry))
    }

    /// Un-allocated remainder of a payment, derived from its allocations.
    pub async fn unallocated_amount<C: ConnectionTrait>(
        &self,
        conn: &C,
        payment: &payment::Model,
    ) -> Result<Decimal, ServiceError> {
        let allocated: Option<Decimal> = AllocationEntity::find()
            .select_only()
            .column_as(allocation::Column::Amount.sum(), "total")
            .filter(allocation::Column::PaymentId.eq(payment.id))
            .into_tuple()
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
            .flatten();
        Ok(payment.amount - allocated.unwrap_or(Decimal::ZERO))
    }

    /// Applies part of a payment against one entry.
    #[instrument(skip(self))]
    pub async fn allocate_payment(
        &self,
        command: AllocatePayment,
    ) -> Result<AllocationOutcome, ServiceError> {
        let svc = self.clone();
        let cmd = command.clone();
        let outcome = db::with_transaction(&self.db, move |txn| {
            Box::pin(async move { svc.allocate_payment_in(txn, &cmd).await })
        })
        .await?;

        self.event_sender
            .send_or_log(Event::PaymentAllocated {
                payment_id: command.payment_id,
                entry_id: command.entry_id,
                amount: outcome.allocation.amount,
            })
            .await;
        if let Some(invoice_id) = outcome.settled_invoice_id {
            self.event_sender
                .send_or_log(Event::InvoicePaid { invoice_id })
                .await;
        }
        Ok(outcome)
    }

    /// `allocate_payment` against the caller's unit of work.
    pub async fn allocate_payment_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        command: &AllocatePayment,
    ) -> Result<AllocationOutcome, ServiceError> {
        if command.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Allocation amount must be positive, got {}",
                command.amount
            )));
        }

        let payment = load_payment_for_update(conn, command.payment_id).await?;
        let entry = load_entry_for_update(conn, command.entry_id).await?;
        check_allocation_rules(payment.counterparty_kind, payment.counterparty_id, &entry)?;

        if command.amount > entry.outstanding {
            return Err(ServiceError::ValidationError(format!(
                "Allocation {} exceeds outstanding {} on entry {}",
                command.amount, entry.outstanding, entry.id
            )));
        }
        let remaining = self.unallocated_amount(conn, &payment).await?;
        if command.amount > remaining {
            return Err(ServiceError::ValidationError(format!(
                "Allocation {} exceeds un-allocated amount {} of payment {}",
                command.amount, remaining, payment.reference_number
            )));
        }

        let now = self.clock.now();
        let allocation =
            insert_allocation(conn, now, Some(payment.id), None, &entry, command.amount).await?;
        let settled_invoice_id = self.apply_payment_in(conn, entry, command.amount).await?;

        Ok(AllocationOutcome {
            allocation,
            settled_invoice_id,
        })
    }

    /// Applies part of a credit note against one entry.
    #[instrument(skip(self))]
    pub async fn allocate_credit_note(
        &self,
        command: AllocateCreditNote,
    ) -> Result<AllocationOutcome, ServiceError> {
        let svc = self.clone();
        let cmd = command.clone();
        let outcome = db::with_transaction(&self.db, move |txn| {
            Box::pin(async move { svc.allocate_credit_note_in(txn, &cmd).await })
        })
        .await?;

        self.event_sender
            .send_or_log(Event::CreditNoteAllocated {
                credit_note_id: command.credit_note_id,
                entry_id: command.entry_id,
                amount: outcome.allocation.amount,
            })
            .await;
        if let Some(invoice_id) = outcome.settled_invoice_id {
            self.event_sender
                .send_or_log(Event::InvoicePaid { invoice_id })
                .await;
        }
        Ok(outcome)
    }

    /// `allocate_credit_note` against the caller's unit of work.
    pub async fn allocate_credit_note_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        command: &AllocateCreditNote,
    ) -> Result<AllocationOutcome, ServiceError> {
        if command.amount <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Allocation amount must be positive, got {}",
                command.amount
            )));
        }

        let note = load_credit_note_for_update(conn, command.credit_note_id).await?;
        let entry = load_entry_for_update(conn, command.entry_id).await?;
        check_allocation_rules(note.counterparty_kind, note.counterparty_id, &entry)?;

        if command.amount > entry.outstanding {
            return Err(ServiceError::ValidationError(format!(
                "Allocation {} exceeds outstanding {} on entry {}",
                command.amount, entry.outstanding, entry.id
            )));
        }
        if command.amount > note.remaining_amount {
            return Err(ServiceError::ValidationError(format!(
                "Allocation {} exceeds remaining amount {} of credit note {}",
                command.amount, note.remaining_amount, note.reference_number
            )));
        }

        let now = self.clock.now();
        let allocation =
            insert_allocation(conn, now, None, Some(note.id), &entry, command.amount).await?;

        let new_remaining = note.remaining_amount - command.amount;
        let mut active: credit_note::ActiveModel = note.into();
        active.remaining_amount = Set(new_remaining);
        active.updated_at = Set(now);
        active
            .update(conn)
            .await
            .map_err(ServiceError::conflict_or_db)?;

        let settled_invoice_id = self.apply_payment_in(conn, entry, command.amount).await?;

        Ok(AllocationOutcome {
            allocation,
            settled_invoice_id,
        })
    }

    /// Spends a credit note against its counterparty's outstanding entries,
    /// oldest first, until the note or the entries run out.
    ///
    /// A greedy single pass: deterministic and auditable, not globally
    /// optimal in any sense.
    #[instrument(skip(self))]
    pub async fn auto_allocate(
        &self,
        credit_note_id: Uuid,
    ) -> Result<Vec<AllocationOutcome>, ServiceError> {
        let svc = self.clone();
        let outcomes = db::with_transaction(&self.db, move |txn| {
            Box::pin(async move { svc.auto_allocate_in(txn, credit_note_id).await })
        })
        .await?;

        for outcome in &outcomes {
            self.event_sender
                .send_or_log(Event::CreditNoteAllocated {
                    credit_note_id,
                    entry_id: outcome.allocation.entry_id().unwrap_or_default(),
                    amount: outcome.allocation.amount,
                })
                .await;
            if let Some(invoice_id) = outcome.settled_invoice_id {
                self.event_sender
                    .send_or_log(Event::InvoicePaid { invoice_id })
                    .await;
            }
        }
        Ok(outcomes)
    }

    /// `auto_allocate` against the caller's unit of work.
    pub async fn auto_allocate_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        credit_note_id: Uuid,
    ) -> Result<Vec<AllocationOutcome>, ServiceError> {
        let note = load_credit_note_for_update(conn, credit_note_id).await?;

        let mut query = LedgerEntryEntity::find()
            .filter(ledger_entry::Column::Kind.eq(entry_kind_for(note.counterparty_kind)))
            .filter(ledger_entry::Column::CounterpartyId.eq(note.counterparty_id))
            .filter(ledger_entry::Column::Outstanding.gt(Decimal::ZERO))
            .order_by_asc(ledger_entry::Column::PostedAt)
            .order_by_asc(ledger_entry::Column::CreatedAt);
        if conn.get_database_backend() != DbBackend::Sqlite {
            query = query.lock_exclusive();
        }
        let open_entries = query.all(conn).await.map_err(ServiceError::db_error)?;

        let now = self.clock.now();
        let mut remaining = note.remaining_amount;
        let mut outcomes = Vec::new();

        for entry in open_entries {
            if remaining.is_zero() {
                break;
            }
            let slice = entry.outstanding.min(remaining);
            let allocation =
                insert_allocation(conn, now, None, Some(note.id), &entry, slice).await?;
            let settled_invoice_id = self.apply_payment_in(conn, entry, slice).await?;
            remaining -= slice;
            outcomes.push(AllocationOutcome {
                allocation,
                settled_invoice_id,
            });
        }

        let note_reference = note.reference_number.clone();
        let mut active: credit_note::ActiveModel = note.into();
        active.remaining_amount = Set(remaining);
        active.updated_at = Set(now);
        active
            .update(conn)
            .await
            .map_err(ServiceError::conflict_or_db)?;

        info!(
            "Auto-allocated credit note {} across {} entries, {} left",
            note_reference,
            outcomes.len(),
            remaining
        );
        Ok(outcomes)
    }

    /// Decrements an entry's outstanding amount.
    ///
    /// Bounds were validated by the allocation path that calls this; a
    /// breach here is a bug, not caller input, hence `InternalError`.
    /// Zeroing a receivable that references a sales invoice flips the
    /// invoice to Paid and stages the notification, all on this same
    /// connection so the transition cannot outlive a rollback.
    async fn apply_payment_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        entry: ledger_entry::Model,
        amount: Decimal,
    ) -> Result<Option<Uuid>, ServiceError> {
        if amount <= Decimal::ZERO || amount > entry.outstanding {
            return Err(ServiceError::InternalError(format!(
                "apply_payment out of bounds: amount {}, outstanding {} on entry {}",
                amount, entry.outstanding, entry.id
            )));
        }

        let now = self.clock.now();
        let new_outstanding = entry.outstanding - amount;
        let entry_kind = entry.kind;
        let entry_reference_type = entry.reference_type.clone();
        let entry_reference_id = entry.reference_id;

        let mut active: ledger_entry::ActiveModel = entry.into();
        active.outstanding = Set(new_outstanding);
        active.updated_at = Set(now);
        active
            .update(conn)
            .await
            .map_err(ServiceError::conflict_or_db)?;

        let settles_invoice = new_outstanding.is_zero()
            && entry_kind == LedgerEntryKind::Receivable
            && entry_reference_type == reference_type::SALES_INVOICE;
        if !settles_invoice {
            return Ok(None);
        }

        let invoice = SalesInvoiceEntity::find_by_id(entry_reference_id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Sales invoice {} not found", entry_reference_id))
            })?;
        if !invoice.status.can_transition_to(InvoiceStatus::Paid) {
            return Err(ServiceError::InvalidOperation(format!(
                "Invoice {} cannot move from {} to Paid",
                invoice.id, invoice.status
            )));
        }

        let invoice_id = invoice.id;
        let customer_id = invoice.customer_id;
        let mut active: sales_invoice::ActiveModel = invoice.into();
        active.status = Set(InvoiceStatus::Paid);
        active.updated_at = Set(now);
        active.update(conn).await.map_err(ServiceError::db_error)?;

        outbox::stage(
            conn,
            now,
            "sales_invoice",
            Some(invoice_id),
            "invoice_paid",
            json!({ "invoice_id": invoice_id, "customer_id": customer_id }),
        )
        .await?;

        info!("Invoice {} settled and marked paid", invoice_id);
        Ok(Some(invoice_id))
    }

    /// Fetches one entry by id.
    pub async fn get_entry(&self, entry_id: Uuid) -> Result<ledger_entry::Model, ServiceError> {
        LedgerEntryEntity::find_by_id(entry_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Ledger entry {} not found", entry_id)))
    }

    /// Fetches one credit note by id.
    pub async fn get_credit_note(
        &self,
        credit_note_id: Uuid,
    ) -> Result<credit_note::Model, ServiceError> {
        CreditNoteEntity::find_by_id(credit_note_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Credit note {} not found", credit_note_id))
            })
    }

    /// Fetches one payment by id.
    pub async fn get_payment(&self, payment_id: Uuid) -> Result<payment::Model, ServiceError> {
        PaymentEntity::find_by_id(payment_id)
            .one(&*self.db)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Payment {} not found", payment_id)))
    }
}

/// Which entry side a counterparty's payments and credit notes may settle.
fn entry_kind_for(kind: CounterpartyKind) -> LedgerEntryKind {
    match kind {
        CounterpartyKind::Customer => LedgerEntryKind::Receivable,
        CounterpartyKind::Supplier => LedgerEntryKind::Payable,
    }
}

/// Cross-type allocation rules: customer money settles that customer's
/// receivables, supplier money that supplier's payables.
fn check_allocation_rules(
    payer_kind: CounterpartyKind,
    payer_counterparty_id: Uuid,
    entry: &ledger_entry::Model,
) -> Result<(), ServiceError> {
    let expected = entry_kind_for(payer_kind);
    if entry.kind != expected {
        return Err(ServiceError::ValidationError(format!(
            "A {:?} payer settles {:?} entries; entry {} is {:?}",
            payer_kind, expected, entry.id, entry.kind
        )));
    }
    if entry.counterparty_id != payer_counterparty_id {
        return Err(ServiceError::ValidationError(format!(
            "Entry {} belongs to a different counterparty",
            entry.id
        )));
    }
    Ok(())
}

async fn insert_allocation<C: ConnectionTrait>(
    conn: &C,
    now: DateTime<Utc>,
    payment_id: Option<Uuid>,
    credit_note_id: Option<Uuid>,
    entry: &ledger_entry::Model,
    amount: Decimal,
) -> Result<allocation::Model, ServiceError> {
    let (receivable_entry_id, payable_entry_id) = match entry.kind {
        LedgerEntryKind::Receivable => (Some(entry.id), None),
        LedgerEntryKind::Payable => (None, Some(entry.id)),
    };
    let row = allocation::ActiveModel {
        id: Set(Uuid::new_v4()),
        payment_id: Set(payment_id),
        credit_note_id: Set(credit_note_id),
        receivable_entry_id: Set(receivable_entry_id),
        payable_entry_id: Set(payable_entry_id),
        amount: Set(amount),
        created_at: Set(now),
    };
    row.insert(conn).await.map_err(ServiceError::db_error)
}

async fn load_entry_for_update<C: ConnectionTrait>(
    conn: &C,
    entry_id: Uuid,
) -> Result<ledger_entry::Model, ServiceError> {
    let mut query = LedgerEntryEntity::find_by_id(entry_id);
    if conn.get_database_backend() != DbBackend::Sqlite {
        query = query.lock_exclusive();
    }
    query
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Ledger entry {} not found", entry_id)))
}

async fn load_payment_for_update<C: ConnectionTrait>(
    conn: &C,
    payment_id: Uuid,
) -> Result<payment::Model, ServiceError> {
    let mut query = PaymentEntity::find_by_id(payment_id);
    if conn.get_database_backend() != DbBackend::Sqlite {
        query = query.lock_exclusive();
    }
    query
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Payment {} not found", payment_id)))
}

async fn load_credit_note_for_update<C: ConnectionTrait>(
    conn: &C,
    credit_note_id: Uuid,
) -> Result<credit_note::Model, ServiceError> {
    let mut query = CreditNoteEntity::find_by_id(credit_note_id);
    if conn.get_database_backend() != DbBackend::Sqlite {
        query = query.lock_exclusive();
    }
    query
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Credit note {} not found", credit_note_id)))
}
