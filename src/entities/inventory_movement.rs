use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Kind of stock movement. The sign of the recorded quantity follows the
/// kind: receipts and transfers-in are positive, issues, consumption and
/// transfers-out negative, adjustments carry the caller's signed delta.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum MovementType {
    #[sea_orm(string_value = "Receipt")]
    Receipt,
    #[sea_orm(string_value = "Issue")]
    Issue,
    #[sea_orm(string_value = "Adjustment")]
    Adjustment,
    #[sea_orm(string_value = "TransferOut")]
    TransferOut,
    #[sea_orm(string_value = "TransferIn")]
    TransferIn,
    #[sea_orm(string_value = "Consumption")]
    Consumption,
}

impl MovementType {
    /// Whether movements of this kind add stock.
    pub fn is_inbound(self) -> bool {
        matches!(self, MovementType::Receipt | MovementType::TransferIn)
    }

    /// Whether movements of this kind remove stock.
    pub fn is_outbound(self) -> bool {
        matches!(
            self,
            MovementType::Issue | MovementType::Consumption | MovementType::TransferOut
        )
    }
}

/// One signed stock movement. Immutable once written; on-hand is derived by
/// summing quantities, never maintained as a running balance.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_movements")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub movement_type: MovementType,
    pub warehouse_id: Uuid,
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    pub reference_type: String,
    pub reference_id: Uuid,
    pub reference_line_id: Option<Uuid>,
    pub batch_number: Option<String>,
    pub serial_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
