//! Flat read models.
//!
//! Queries return plain DTOs (or entity models) keyed by identifiers; no
//! object graphs are materialized and nothing here mutates state.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::Serialize;
use uuid::Uuid;

use crate::entities::counterparty::{CounterpartyKind, Entity as CounterpartyEntity};
use crate::entities::inventory_movement::{self, Entity as MovementEntity};
use crate::entities::ledger_entry::{self, Entity as LedgerEntryEntity, LedgerEntryKind};
use crate::errors::ServiceError;

/// On-hand total for one (warehouse, item[, batch]) key.
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct StockOnHandRow {
    pub warehouse_id: Uuid,
    pub item_id: Uuid,
    pub batch_number: Option<String>,
    pub on_hand: Decimal,
}

/// Current stock in a warehouse, grouped per item and batch.
pub async fn stock_summary<C: ConnectionTrait>(
    conn: &C,
    warehouse_id: Uuid,
) -> Result<Vec<StockOnHandRow>, ServiceError> {
    MovementEntity::find()
        .select_only()
        .column(inventory_movement::Column::WarehouseId)
        .column(inventory_movement::Column::ItemId)
        .column(inventory_movement::Column::BatchNumber)
        .column_as(inventory_movement::Column::Quantity.sum(), "on_hand")
        .filter(inventory_movement::Column::WarehouseId.eq(warehouse_id))
        .group_by(inventory_movement::Column::WarehouseId)
        .group_by(inventory_movement::Column::ItemId)
        .group_by(inventory_movement::Column::BatchNumber)
        .into_model::<StockOnHandRow>()
        .all(conn)
        .await
        .map_err(ServiceError::db_error)
}

/// Movement history for an item, oldest first, optionally restricted to
/// one warehouse. Filtering on `occurred_at` reconstructs any historical
/// stock state.
pub async fn movement_history<C: ConnectionTrait>(
    conn: &C,
    item_id: Uuid,
    warehouse_id: Option<Uuid>,
) -> Result<Vec<inventory_movement::Model>, ServiceError> {
    let mut query = MovementEntity::find()
        .filter(inventory_movement::Column::ItemId.eq(item_id))
        .order_by_asc(inventory_movement::Column::OccurredAt)
        .order_by_asc(inventory_movement::Column::CreatedAt);
    if let Some(warehouse_id) = warehouse_id {
        query = query.filter(inventory_movement::Column::WarehouseId.eq(warehouse_id));
    }
    query.all(conn).await.map_err(ServiceError::db_error)
}

/// One open obligation.
#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct OpenEntryRow {
    pub id: Uuid,
    pub reference_type: String,
    pub reference_id: Uuid,
    pub amount: Decimal,
    pub outstanding: Decimal,
    pub posted_at: DateTime<Utc>,
}

/// Outstanding entries of one kind for a counterparty, oldest first, in
/// the same order the auto-allocation pass consumes them.
pub async fn open_entries<C: ConnectionTrait>(
    conn: &C,
    kind: LedgerEntryKind,
    counterparty_id: Uuid,
) -> Result<Vec<OpenEntryRow>, ServiceError> {
    LedgerEntryEntity::find()
        .select_only()
        .column(ledger_entry::Column::Id)
        .column(ledger_entry::Column::ReferenceType)
        .column(ledger_entry::Column::ReferenceId)
        .column(ledger_entry::Column::Amount)
        .column(ledger_entry::Column::Outstanding)
        .column(ledger_entry::Column::PostedAt)
        .filter(ledger_entry::Column::Kind.eq(kind))
        .filter(ledger_entry::Column::CounterpartyId.eq(counterparty_id))
        .filter(ledger_entry::Column::Outstanding.gt(Decimal::ZERO))
        .order_by_asc(ledger_entry::Column::PostedAt)
        .order_by_asc(ledger_entry::Column::CreatedAt)
        .into_model::<OpenEntryRow>()
        .all(conn)
        .await
        .map_err(ServiceError::db_error)
}

/// Contact details a notification workflow needs about a counterparty.
#[derive(Debug, Clone, Serialize)]
pub struct CounterpartyContact {
    pub id: Uuid,
    pub kind: CounterpartyKind,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

pub async fn counterparty_contact<C: ConnectionTrait>(
    conn: &C,
    counterparty_id: Uuid,
) -> Result<CounterpartyContact, ServiceError> {
    let counterparty = CounterpartyEntity::find_by_id(counterparty_id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("Counterparty {} not found", counterparty_id))
        })?;

    Ok(CounterpartyContact {
        id: counterparty.id,
        kind: counterparty.kind,
        name: counterparty.name,
        email: counterparty.email,
        phone: counterparty.phone,
    })
}
