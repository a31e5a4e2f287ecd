use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::counterparty::CounterpartyKind;

/// Additional charge raised against a counterparty. Issuing one posts the
/// matching ledger entry in the same transaction; debit notes never
/// allocate, so `remaining_amount` stays at `amount` until the entry is
/// settled by payments or credit notes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "debit_notes")]
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
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
