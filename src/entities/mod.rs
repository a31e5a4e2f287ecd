//! SeaORM entity definitions for the ledger core.
//!
//! `inventory_movement` and `allocation` rows are append-only: they are
//! inserted inside a posting transaction and never updated or deleted.

pub mod allocation;
pub mod counterparty;
pub mod credit_note;
pub mod debit_note;
pub mod document_sequence;
pub mod inventory_movement;
pub mod item;
pub mod ledger_entry;
pub mod outbox_notification;
pub mod payment;
pub mod sales_invoice;
