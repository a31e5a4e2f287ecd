use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::counterparty::CounterpartyKind;

/// Credit issued to a counterparty, spendable against their open entries.
///
/// `remaining_amount = amount - sum(allocations)`, never negative; it is
/// maintained under the same transaction as each allocation.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "credit_notes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reference_number: String,
    pub counterparty_kind: CounterpartyKind,
    pub counterparty_id: Uuid,
    pub amount: Decimal,
    pub remaining_amount: Decimal,
    pub issued_at: DateTime<Utc>,
    pub source_reference_type: Option<String>,
    pub source_reference_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_exhausted(&self) -> bool {
        self.remaining_amount == Decimal::ZERO
    }
}
