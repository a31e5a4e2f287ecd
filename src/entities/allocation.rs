use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One apportionment of a payment's or credit note's value against a single
/// ledger entry. Exactly one payer column and exactly one entry column are
/// set; rows are append-only, and corrections use new debit/credit notes
/// rather than allocation rollbacks.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub payment_id: Option<Uuid>,
    pub credit_note_id: Option<Uuid>,
    pub receivable_entry_id: Option<Uuid>,
    pub payable_entry_id: Option<Uuid>,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// The ledger entry this allocation settled, whichever side it sits on.
    pub fn entry_id(&self) -> Option<Uuid> {
        self.receivable_entry_id.or(self.payable_entry_id)
    }
}
