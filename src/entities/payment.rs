use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::counterparty::CounterpartyKind;

/// Direction of the cash flow relative to us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PaymentDirection {
    #[sea_orm(string_value = "Incoming")]
    Incoming,
    #[sea_orm(string_value = "Outgoing")]
    Outgoing,
}

/// A received or issued payment.
///
/// The un-allocated remainder is derived from the allocation rows, never
/// stored here.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reference_number: String,
    pub direction: PaymentDirection,
    pub counterparty_kind: CounterpartyKind,
    pub counterparty_id: Uuid,
    pub currency_code: String,
    pub exchange_rate: Decimal,
    pub amount: Decimal,
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
