//! Test harness backed by an in-memory SQLite database.
//!
//! The pool is pinned to a single connection: every pooled connection to
//! `sqlite::memory:` would otherwise get its own private database.
#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use tokio::sync::mpsc;
use uuid::Uuid;

use ledgercore::clock::FixedClock;
use ledgercore::entities::counterparty::{self, CounterpartyKind};
use ledgercore::entities::item::{self, TrackingType};
use ledgercore::events::{process_events, EventSender};
use ledgercore::migrator::Migrator;
use ledgercore::LedgerCore;

/// A fixed instant used as the deterministic bookkeeping clock.
pub fn test_epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

/// An instant `minutes` after [`test_epoch`], for ordering posted-at values.
pub fn minutes_after(minutes: i64) -> DateTime<Utc> {
    test_epoch() + chrono::Duration::minutes(minutes)
}

pub async fn setup_core() -> LedgerCore {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await.expect("db connect");
    Migrator::up(&db, None).await.expect("migrations");

    let (tx, rx) = mpsc::channel(256);
    let sender = EventSender::new(tx);
    tokio::spawn(process_events(rx));

    LedgerCore::with_clock(db, sender, Arc::new(FixedClock::at(test_epoch())))
}

pub async fn seed_item(core: &LedgerCore, sku: &str, tracking_type: TrackingType) -> Uuid {
    seed_item_with_cost(core, sku, tracking_type, Decimal::new(10, 0)).await
}

pub async fn seed_item_with_cost(
    core: &LedgerCore,
    sku: &str,
    tracking_type: TrackingType,
    default_unit_cost: Decimal,
) -> Uuid {
    let id = Uuid::new_v4();
    let row = item::ActiveModel {
        id: Set(id),
        sku: Set(sku.to_string()),
        name: Set(format!("Test item {}", sku)),
        tracking_type: Set(tracking_type),
        default_unit_cost: Set(default_unit_cost),
        created_at: Set(test_epoch()),
    };
    row.insert(&*core.db).await.expect("seed item");
    id
}

pub async fn seed_counterparty(core: &LedgerCore, kind: CounterpartyKind, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    let row = counterparty::ActiveModel {
        id: Set(id),
        kind: Set(kind),
        name: Set(name.to_string()),
        email: Set(Some(format!(
            "{}@example.test",
            name.to_lowercase().replace(' ', ".")
        ))),
        phone: Set(None),
        created_at: Set(test_epoch()),
    };
    row.insert(&*core.db).await.expect("seed counterparty");
    id
}
