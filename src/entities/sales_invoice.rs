use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Sales invoice lifecycle. One-directional: a draft posts, a posted
/// invoice is paid when its receivable entry reaches zero outstanding.
/// There is no re-opening.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "Posted")]
    Posted,
    #[sea_orm(string_value = "Paid")]
    Paid,
}

impl InvoiceStatus {
    pub fn can_transition_to(self, next: InvoiceStatus) -> bool {
        matches!(
            (self, next),
            (InvoiceStatus::Draft, InvoiceStatus::Posted)
                | (InvoiceStatus::Posted, InvoiceStatus::Paid)
        )
    }
}

/// Sales invoice aggregate. The invoice number is minted at posting time so
/// the gap-free sequence only spends counters on documents that post.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sales_invoices")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub invoice_number: Option<String>,
    pub customer_id: Uuid,
    pub currency_code: String,
    pub total_amount: Decimal,
    pub status: InvoiceStatus,
    pub posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_is_one_directional() {
        assert!(InvoiceStatus::Draft.can_transition_to(InvoiceStatus::Posted));
        assert!(InvoiceStatus::Posted.can_transition_to(InvoiceStatus::Paid));

        assert!(!InvoiceStatus::Draft.can_transition_to(InvoiceStatus::Paid));
        assert!(!InvoiceStatus::Posted.can_transition_to(InvoiceStatus::Draft));
        assert!(!InvoiceStatus::Paid.can_transition_to(InvoiceStatus::Posted));
        assert!(!InvoiceStatus::Paid.can_transition_to(InvoiceStatus::Draft));
    }
}
