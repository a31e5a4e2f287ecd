use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which side of the book an obligation sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum LedgerEntryKind {
    #[sea_orm(string_value = "Receivable")]
    Receivable,
    #[sea_orm(string_value = "Payable")]
    Payable,
}

/// A receivable or payable obligation.
///
/// `outstanding` starts at `amount` and is only ever decreased by the
/// allocation engine; `amount - outstanding` always equals the sum of the
/// allocations applied against this entry. Entries are never deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: LedgerEntryKind,
    pub counterparty_id: Uuid,
    pub reference_type: String,
    pub reference_id: Uuid,
    pub amount: Decimal,
    pub outstanding: Decimal,
    pub posted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Fully settled: nothing left to allocate against.
    pub fn is_settled(&self) -> bool {
        self.outstanding == Decimal::ZERO
    }

    /// Portion already covered by allocations.
    pub fn settled_amount(&self) -> Decimal {
        self.amount - self.outstanding
    }
}
