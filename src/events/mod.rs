use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entities::inventory_movement::MovementType;

pub mod outbox;

/// In-process domain events emitted after a posting transaction commits.
///
/// These are observational; durable side effects ride the transactional
/// outbox instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    InvoicePosted {
        invoice_id: Uuid,
        reference: String,
    },
    InvoicePaid {
        invoice_id: Uuid,
    },
    GoodsReceiptPosted {
        receipt_id: Uuid,
        reference: String,
        line_count: usize,
    },
    PaymentRecorded {
        payment_id: Uuid,
        reference: String,
    },
    PaymentAllocated {
        payment_id: Uuid,
        entry_id: Uuid,
        amount: Decimal,
    },
    CreditNoteIssued {
        credit_note_id: Uuid,
        reference: String,
    },
    DebitNoteIssued {
        debit_note_id: Uuid,
        reference: String,
    },
    CreditNoteAllocated {
        credit_note_id: Uuid,
        entry_id: Uuid,
        amount: Decimal,
    },
    StockMovementRecorded {
        movement_type: MovementType,
        warehouse_id: Uuid,
        item_id: Uuid,
        quantity: Decimal,
        occurred_at: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when nobody is listening.
    ///
    /// Used after a transaction has already committed: the write must not be
    /// reported as failed just because the in-process bus is gone.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event.clone()).await {
            warn!("Dropped event {:?}: {}", event, e);
        }
    }
}

/// Consumes events off the channel and logs them. A real deployment hangs
/// projections and cache invalidation off this loop.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::InvoicePosted {
                invoice_id,
                reference,
            } => {
                info!("Invoice {} posted as {}", invoice_id, reference);
            }
            Event::InvoicePaid { invoice_id } => {
                info!("Invoice {} fully settled", invoice_id);
            }
            Event::GoodsReceiptPosted {
                receipt_id,
                reference,
                line_count,
            } => {
                info!(
                    "Goods receipt {} posted as {} ({} lines)",
                    receipt_id, reference, line_count
                );
            }
            Event::PaymentAllocated {
                payment_id,
                entry_id,
                amount,
            } => {
                info!(
                    "Payment {} allocated {} against entry {}",
                    payment_id, amount, entry_id
                );
            }
            Event::CreditNoteAllocated {
                credit_note_id,
                entry_id,
                amount,
            } => {
                info!(
                    "Credit note {} allocated {} against entry {}",
                    credit_note_id, amount, entry_id
                );
            }
            other => {
                info!("Event: {:?}", other);
            }
        }
    }

    warn!("Event processing loop has ended");
}
