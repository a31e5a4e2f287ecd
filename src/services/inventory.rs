use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::clock::Clock;
use crate::db;
use crate::entities::inventory_movement::{self, Entity as MovementEntity, MovementType};
use crate::entities::item::{self, Entity as ItemEntity, TrackingType};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Command describing one stock movement.
///
/// `quantity` is the moved amount for receipts, issues, consumption and
/// transfers; for adjustments it is the signed delta. Serial-tracked items
/// carry the affected serials; batch-tracked items carry the batch.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordMovement {
    pub occurred_at: DateTime<Utc>,
    pub warehouse_id: Uuid,
    pub item_id: Uuid,
    pub quantity: Decimal,
    /// Overrides the item's default unit cost when set.
    pub unit_cost: Option<Decimal>,
    #[validate(length(min = 1))]
    pub reference_type: String,
    pub reference_id: Uuid,
    pub reference_line_id: Option<Uuid>,
    pub batch_number: Option<String>,
    #[serde(default)]
    pub serial_numbers: Vec<String>,
}

/// Command for a warehouse-to-warehouse transfer, recorded as a
/// transfer-out/transfer-in pair in one unit of work.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransferStock {
    pub occurred_at: DateTime<Utc>,
    pub from_warehouse_id: Uuid,
    pub to_warehouse_id: Uuid,
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Option<Decimal>,
    #[validate(length(min = 1))]
    pub reference_type: String,
    pub reference_id: Uuid,
    pub reference_line_id: Option<Uuid>,
    pub batch_number: Option<String>,
    #[serde(default)]
    pub serial_numbers: Vec<String>,
}

/// Append-only inventory movement ledger.
///
/// Every mutation validates tracking rules and stock sufficiency inside the
/// same transaction as its writes, then appends movement rows; nothing is
/// ever updated or deleted. On-hand is derived by summing the history.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    clock: Arc<dyn Clock>,
}

impl InventoryService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            db,
            event_sender,
            clock,
        }
    }

    /// Records received stock. Always permitted.
    #[instrument(skip(self))]
    pub async fn record_receipt(&self, command: RecordMovement) -> Result<(), ServiceError> {
        self.record(MovementType::Receipt, command).await
    }

    /// Records stock issued out of a warehouse, rejecting the call when it
    /// would drive on-hand negative.
    #[instrument(skip(self))]
    pub async fn record_issue(&self, command: RecordMovement) -> Result<(), ServiceError> {
        self.record(MovementType::Issue, command).await
    }

    /// Records stock consumed internally, e.g. by a service job.
    #[instrument(skip(self))]
    pub async fn record_consumption(&self, command: RecordMovement) -> Result<(), ServiceError> {
        self.record(MovementType::Consumption, command).await
    }

    /// Records stock leaving a warehouse for another warehouse.
    #[instrument(skip(self))]
    pub async fn record_transfer_out(&self, command: RecordMovement) -> Result<(), ServiceError> {
        self.record(MovementType::TransferOut, command).await
    }

    /// Records stock arriving from another warehouse.
    #[instrument(skip(self))]
    pub async fn record_transfer_in(&self, command: RecordMovement) -> Result<(), ServiceError> {
        self.record(MovementType::TransferIn, command).await
    }

    /// Records a stock correction. The quantity is a signed delta; a
    /// negative delta is validated exactly like an issue.
    #[instrument(skip(self))]
    pub async fn record_adjustment(&self, command: RecordMovement) -> Result<(), ServiceError> {
        self.record(MovementType::Adjustment, command).await
    }

    /// Records a full transfer: out of the source warehouse and into the
    /// destination, atomically.
    #[instrument(skip(self))]
    pub async fn record_transfer(&self, command: TransferStock) -> Result<(), ServiceError> {
        command.validate()?;
        let svc = self.clone();
        let cmd = command.clone();
        db::with_serializable_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let out_leg = RecordMovement {
                    occurred_at: cmd.occurred_at,
                    warehouse_id: cmd.from_warehouse_id,
                    item_id: cmd.item_id,
                    quantity: cmd.quantity,
                    unit_cost: cmd.unit_cost,
                    reference_type: cmd.reference_type.clone(),
                    reference_id: cmd.reference_id,
                    reference_line_id: cmd.reference_line_id,
                    batch_number: cmd.batch_number.clone(),
                    serial_numbers: cmd.serial_numbers.clone(),
                };
                svc.record_movement_in(txn, MovementType::TransferOut, &out_leg)
                    .await?;

                let in_leg = RecordMovement {
                    warehouse_id: cmd.to_warehouse_id,
                    ..out_leg
                };
                svc.record_movement_in(txn, MovementType::TransferIn, &in_leg)
                    .await
            })
        })
        .await?;

        for (movement_type, warehouse_id) in [
            (MovementType::TransferOut, command.from_warehouse_id),
            (MovementType::TransferIn, command.to_warehouse_id),
        ] {
            self.event_sender
                .send_or_log(Event::StockMovementRecorded {
                    movement_type,
                    warehouse_id,
                    item_id: command.item_id,
                    quantity: command.quantity,
                    occurred_at: command.occurred_at,
                })
                .await;
        }
        Ok(())
    }

    async fn record(
        &self,
        movement_type: MovementType,
        command: RecordMovement,
    ) -> Result<(), ServiceError> {
        let svc = self.clone();
        let cmd = command.clone();
        db::with_serializable_transaction(&self.db, move |txn| {
            Box::pin(async move { svc.record_movement_in(txn, movement_type, &cmd).await })
        })
        .await?;

        self.event_sender
            .send_or_log(Event::StockMovementRecorded {
                movement_type,
                warehouse_id: command.warehouse_id,
                item_id: command.item_id,
                quantity: command.quantity,
                occurred_at: command.occurred_at,
            })
            .await;
        Ok(())
    }

    /// Validates and appends one movement inside the caller's unit of work.
    ///
    /// Multi-line postings call this once per line on a shared transaction
    /// so a failure on any line discards all of them. No row is written
    /// when validation fails.
    #[instrument(skip(self, conn, command))]
    pub async fn record_movement_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        movement_type: MovementType,
        command: &RecordMovement,
    ) -> Result<(), ServiceError> {
        command.validate()?;

        let item = ItemEntity::find_by_id(command.item_id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Item {} not found", command.item_id)))?;

        let (magnitude, negative) = match movement_type {
            MovementType::Adjustment => {
                if command.quantity.is_zero() {
                    return Err(ServiceError::ValidationError(
                        "Adjustment delta must not be zero".to_string(),
                    ));
                }
                (command.quantity.abs(), command.quantity.is_sign_negative())
            }
            kind if kind.is_inbound() => (command.quantity, false),
            _ => (command.quantity, true),
        };

        validate_tracking(
            &item,
            magnitude,
            &command.batch_number,
            &command.serial_numbers,
        )?;

        if negative {
            self.ensure_stock_available(conn, &item, command, magnitude)
                .await?;
        }

        let unit_cost = command.unit_cost.unwrap_or(item.default_unit_cost);
        let now = self.clock.now();

        if item.tracking_type == TrackingType::Serial {
            // One row per serial so each unit's whereabouts stays derivable.
            let per_unit = if negative {
                Decimal::NEGATIVE_ONE
            } else {
                Decimal::ONE
            };
            for serial in &command.serial_numbers {
                let row = inventory_movement::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    occurred_at: Set(command.occurred_at),
                    movement_type: Set(movement_type),
                    warehouse_id: Set(command.warehouse_id),
                    item_id: Set(command.item_id),
                    quantity: Set(per_unit),
                    unit_cost: Set(unit_cost),
                    reference_type: Set(command.reference_type.clone()),
                    reference_id: Set(command.reference_id),
                    reference_line_id: Set(command.reference_line_id),
                    batch_number: Set(None),
                    serial_number: Set(Some(serial.clone())),
                    created_at: Set(now),
                };
                row.insert(conn).await.map_err(ServiceError::db_error)?;
            }
        } else {
            let signed = if negative { -magnitude } else { magnitude };
            let row = inventory_movement::ActiveModel {
                id: Set(Uuid::new_v4()),
                occurred_at: Set(command.occurred_at),
                movement_type: Set(movement_type),
                warehouse_id: Set(command.warehouse_id),
                item_id: Set(command.item_id),
                quantity: Set(signed),
                unit_cost: Set(unit_cost),
                reference_type: Set(command.reference_type.clone()),
                reference_id: Set(command.reference_id),
                reference_line_id: Set(command.reference_line_id),
                batch_number: Set(command.batch_number.clone()),
                serial_number: Set(None),
                created_at: Set(now),
            };
            row.insert(conn).await.map_err(ServiceError::db_error)?;
        }

        info!(
            "Recorded {} of {} x item {} at warehouse {}",
            movement_type, magnitude, item.sku, command.warehouse_id
        );
        Ok(())
    }

    /// Checks sufficiency for an outbound movement. The read runs on the
    /// same connection as the pending write so the check and the append
    /// commit or roll back together.
    async fn ensure_stock_available<C: ConnectionTrait>(
        &self,
        conn: &C,
        item: &item::Model,
        command: &RecordMovement,
        magnitude: Decimal,
    ) -> Result<(), ServiceError> {
        if item.tracking_type == TrackingType::Serial {
            for serial in &command.serial_numbers {
                let net = serial_on_hand(conn, command.warehouse_id, item.id, serial).await?;
                if net <= Decimal::ZERO {
                    return Err(ServiceError::ValidationError(format!(
                        "Serial number {} of item {} is not in stock at warehouse {}",
                        serial, item.sku, command.warehouse_id
                    )));
                }
            }
            return Ok(());
        }

        let available = on_hand(
            conn,
            command.warehouse_id,
            item.id,
            command.batch_number.as_deref(),
        )
        .await?;
        if available - magnitude < Decimal::ZERO {
            return Err(ServiceError::InsufficientStock(format!(
                "Item {}: on hand {}, requested {}",
                item.sku, available, magnitude
            )));
        }
        Ok(())
    }
}

/// Current on-hand quantity for a (warehouse, item[, batch]) key: the sum
/// of all signed movement quantities. A derived read over the history, not
/// a maintained balance.
pub async fn on_hand<C: ConnectionTrait>(
    conn: &C,
    warehouse_id: Uuid,
    item_id: Uuid,
    batch_number: Option<&str>,
) -> Result<Decimal, ServiceError> {
    let mut query = MovementEntity::find()
        .select_only()
        .column_as(inventory_movement::Column::Quantity.sum(), "total")
        .filter(inventory_movement::Column::WarehouseId.eq(warehouse_id))
        .filter(inventory_movement::Column::ItemId.eq(item_id));
    if let Some(batch) = batch_number {
        query = query.filter(inventory_movement::Column::BatchNumber.eq(batch));
    }

    let total: Option<Decimal> = query
        .into_tuple()
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .flatten();
    Ok(total.unwrap_or(Decimal::ZERO))
}

/// Net signed quantity for one serial at one warehouse. Positive means the
/// unit is in stock there. The check is per-warehouse: recording movements
/// inconsistently can leave a serial looking present at two sites, which is
/// the caller's data problem, not a constraint this ledger enforces.
pub async fn serial_on_hand<C: ConnectionTrait>(
    conn: &C,
    warehouse_id: Uuid,
    item_id: Uuid,
    serial_number: &str,
) -> Result<Decimal, ServiceError> {
    let total: Option<Decimal> = MovementEntity::find()
        .select_only()
        .column_as(inventory_movement::Column::Quantity.sum(), "total")
        .filter(inventory_movement::Column::WarehouseId.eq(warehouse_id))
        .filter(inventory_movement::Column::ItemId.eq(item_id))
        .filter(inventory_movement::Column::SerialNumber.eq(serial_number))
        .into_tuple()
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .flatten();
    Ok(total.unwrap_or(Decimal::ZERO))
}

/// Shared tracking-mode validation, applied before any write.
///
/// `quantity` is the movement magnitude (the absolute delta for
/// adjustments) and must be strictly positive.
fn validate_tracking(
    item: &item::Model,
    quantity: Decimal,
    batch_number: &Option<String>,
    serial_numbers: &[String],
) -> Result<(), ServiceError> {
    if quantity <= Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "Quantity must be positive, got {}",
            quantity
        )));
    }

    match item.tracking_type {
        TrackingType::Serial => {
            if !quantity.fract().is_zero() {
                return Err(ServiceError::ValidationError(format!(
                    "Serial-tracked item {} requires a whole-number quantity, got {}",
                    item.sku, quantity
                )));
            }
            if batch_number.as_deref().is_some_and(|b| !b.trim().is_empty()) {
                return Err(ServiceError::ValidationError(format!(
                    "Serial-tracked item {} does not take a batch number",
                    item.sku
                )));
            }
            if Decimal::from(serial_numbers.len()) != quantity {
                return Err(ServiceError::ValidationError(format!(
                    "Item {} moves {} units but {} serial numbers were supplied",
                    item.sku,
                    quantity,
                    serial_numbers.len()
                )));
            }
            let mut seen = HashSet::new();
            for serial in serial_numbers {
                if serial.trim().is_empty() {
                    return Err(ServiceError::ValidationError(format!(
                        "Item {}: serial numbers must not be blank",
                        item.sku
                    )));
                }
                if !seen.insert(serial.trim().to_lowercase()) {
                    return Err(ServiceError::ValidationError(format!(
                        "Item {}: duplicate serial number {}",
                        item.sku, serial
                    )));
                }
            }
        }
        TrackingType::Batch => {
            if batch_number.as_deref().map_or(true, |b| b.trim().is_empty()) {
                return Err(ServiceError::ValidationError(format!(
                    "Batch-tracked item {} requires a batch number",
                    item.sku
                )));
            }
            if !serial_numbers.is_empty() {
                return Err(ServiceError::ValidationError(format!(
                    "Item {} is not serial-tracked and does not take serial numbers",
                    item.sku
                )));
            }
        }
        TrackingType::None => {
            if !serial_numbers.is_empty() {
                return Err(ServiceError::ValidationError(format!(
                    "Item {} is not serial-tracked and does not take serial numbers",
                    item.sku
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn item_with(tracking_type: TrackingType) -> item::Model {
        item::Model {
            id: Uuid::new_v4(),
            sku: "WIDGET-1".to_string(),
            name: "Widget".to_string(),
            tracking_type,
            default_unit_cost: dec!(10),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn quantity_must_be_positive() {
        let item = item_with(TrackingType::None);
        assert_matches!(
            validate_tracking(&item, dec!(0), &None, &[]),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            validate_tracking(&item, dec!(-3), &None, &[]),
            Err(ServiceError::ValidationError(_))
        );
        assert!(validate_tracking(&item, dec!(0.5), &None, &[]).is_ok());
    }

    #[test]
    fn serial_items_require_whole_quantities() {
        let item = item_with(TrackingType::Serial);
        assert_matches!(
            validate_tracking(&item, dec!(1.5), &None, &["SN1".into(), "SN2".into()]),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn serial_count_must_match_quantity() {
        let item = item_with(TrackingType::Serial);
        assert!(validate_tracking(&item, dec!(2), &None, &["SN1".into(), "SN2".into()]).is_ok());
        assert_matches!(
            validate_tracking(&item, dec!(2), &None, &["SN1".into()]),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn serials_are_unique_case_insensitively() {
        let item = item_with(TrackingType::Serial);
        assert_matches!(
            validate_tracking(&item, dec!(2), &None, &["sn1".into(), "SN1".into()]),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn serial_items_reject_batch_numbers() {
        let item = item_with(TrackingType::Serial);
        assert_matches!(
            validate_tracking(&item, dec!(1), &Some("B-7".into()), &["SN1".into()]),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn batch_items_require_a_batch_number() {
        let item = item_with(TrackingType::Batch);
        assert_matches!(
            validate_tracking(&item, dec!(5), &None, &[]),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            validate_tracking(&item, dec!(5), &Some("  ".into()), &[]),
            Err(ServiceError::ValidationError(_))
        );
        assert!(validate_tracking(&item, dec!(5.25), &Some("B-7".into()), &[]).is_ok());
    }

    #[test]
    fn untracked_items_reject_serials_but_allow_batches() {
        let item = item_with(TrackingType::None);
        assert_matches!(
            validate_tracking(&item, dec!(1), &None, &["SN1".into()]),
            Err(ServiceError::ValidationError(_))
        );
        assert!(validate_tracking(&item, dec!(1), &Some("B-7".into()), &[]).is_ok());
    }
}
