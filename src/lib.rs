//! ledgercore
//!
//! Transactional ledger core for ERP document posting: a gap-free document
//! sequence generator, an append-only inventory movement ledger with
//! tracking-mode validation, and a receivable/payable store with a payment
//! and credit-note allocation engine.
//!
//! The crate is a library consumed by document-posting workflows. It
//! exposes no network surface; every mutating operation runs inside an
//! explicit unit of work and relies on the storage layer's transactional
//! guarantees rather than in-process locking, so it is safe to call from
//! any number of concurrent request handlers or server processes.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod clock;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod logging;
pub mod migrator;
pub mod queries;
pub mod reference;
pub mod services;

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use clock::{Clock, SystemClock};
use crate::config::AppConfig;
use events::EventSender;
use services::inventory::InventoryService;
use services::ledger::LedgerService;
use services::posting::PostingService;
use services::sequence::SequenceService;

pub use errors::ServiceError;

/// Bundle of the core services over one database handle.
#[derive(Clone)]
pub struct LedgerCore {
    pub db: Arc<DatabaseConnection>,
    pub sequences: SequenceService,
    pub inventory: InventoryService,
    pub ledger: LedgerService,
    pub posting: PostingService,
    pub event_sender: EventSender,
}

impl LedgerCore {
    /// Wires the services up against the wall clock.
    pub fn new(db: DatabaseConnection, event_sender: EventSender) -> Self {
        Self::with_clock(db, event_sender, Arc::new(SystemClock))
    }

    /// Wires the services up with settings from the application config.
    pub fn from_config(
        db: DatabaseConnection,
        event_sender: EventSender,
        config: &AppConfig,
    ) -> Self {
        let db = Arc::new(db);
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let sequences = SequenceService::new(db.clone(), clock.clone())
            .with_pad_width(config.sequence_pad_width);
        Self::assemble(db, sequences, event_sender, clock)
    }

    /// Wires the services up with an injected clock, for deterministic
    /// timestamps in tests.
    pub fn with_clock(
        db: DatabaseConnection,
        event_sender: EventSender,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let db = Arc::new(db);
        let sequences = SequenceService::new(db.clone(), clock.clone());
        Self::assemble(db, sequences, event_sender, clock)
    }

    fn assemble(
        db: Arc<DatabaseConnection>,
        sequences: SequenceService,
        event_sender: EventSender,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let inventory = InventoryService::new(db.clone(), event_sender.clone(), clock.clone());
        let ledger = LedgerService::new(
            db.clone(),
            sequences.clone(),
            event_sender.clone(),
            clock.clone(),
        );
        let posting = PostingService::new(
            db.clone(),
            sequences.clone(),
            inventory.clone(),
            ledger.clone(),
            event_sender.clone(),
            clock,
        );

        Self {
            db,
            sequences,
            inventory,
            ledger,
            posting,
            event_sender,
        }
    }
}
