use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseConnection, DbBackend,
    EntityTrait, IsolationLevel, QuerySelect, TransactionTrait,
};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::clock::Clock;
use crate::entities::document_sequence::{self, Entity as SequenceEntity};
use crate::errors::ServiceError;

const DEFAULT_PAD_WIDTH: usize = 6;

/// Hands out gap-free, collision-free document references per document
/// type, e.g. `PO-000001`.
///
/// Correctness rests entirely on the storage layer: the standalone variant
/// runs under the strictest isolation the backend offers, the in-transaction
/// variant row-locks the counter, and any race surfaces as a
/// `ConcurrencyConflict` for the caller to retry. Multiple server processes
/// may call this concurrently; there is no in-process locking to lean on.
#[derive(Clone)]
pub struct SequenceService {
    db: Arc<DatabaseConnection>,
    clock: Arc<dyn Clock>,
    pad_width: usize,
}

impl SequenceService {
    pub fn new(db: Arc<DatabaseConnection>, clock: Arc<dyn Clock>) -> Self {
        Self {
            db,
            clock,
            pad_width: DEFAULT_PAD_WIDTH,
        }
    }

    /// Overrides the zero-padding width of generated references.
    pub fn with_pad_width(mut self, pad_width: usize) -> Self {
        self.pad_width = pad_width;
        self
    }

    /// Mints the next reference in its own transaction.
    ///
    /// Uses serializable isolation where the backend supports choosing one;
    /// SQLite's single writer is already serializable.
    #[instrument(skip(self))]
    pub async fn next_reference(
        &self,
        document_type: &str,
        prefix: &str,
    ) -> Result<String, ServiceError> {
        let txn = match self.db.get_database_backend() {
            DbBackend::Sqlite => self.db.begin().await.map_err(ServiceError::db_error)?,
            _ => self
                .db
                .begin_with_config(Some(IsolationLevel::Serializable), None)
                .await
                .map_err(ServiceError::db_error)?,
        };

        // An error drops the transaction, which rolls it back.
        let reference = self.next_reference_in(&txn, document_type, prefix).await?;
        txn.commit().await.map_err(ServiceError::conflict_or_db)?;

        Ok(reference)
    }

    /// Mints the next reference inside the caller's unit of work.
    ///
    /// The sequence row is read under `FOR UPDATE` on backends that support
    /// row locks. When the enclosing transaction fails, the counter
    /// increment rolls back with everything else; the sequence call is not
    /// independently retryable once other writes have been staged.
    #[instrument(skip(self, conn))]
    pub async fn next_reference_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        document_type: &str,
        prefix: &str,
    ) -> Result<String, ServiceError> {
        let now = self.clock.now();

        let mut query = SequenceEntity::find_by_id(document_type.to_string());
        if conn.get_database_backend() != DbBackend::Sqlite {
            query = query.lock_exclusive();
        }
        let existing = query.one(conn).await.map_err(ServiceError::db_error)?;

        let number = match existing {
            Some(row) => {
                let number = row.next_number;
                let mut active: document_sequence::ActiveModel = row.into();
                active.next_number = Set(number + 1);
                active.updated_at = Set(now);
                active
                    .update(conn)
                    .await
                    .map_err(ServiceError::conflict_or_db)?;
                number
            }
            None => {
                // Two first-callers can race on the insert; the primary key
                // turns the loser into a retryable conflict.
                let row = document_sequence::ActiveModel {
                    document_type: Set(document_type.to_string()),
                    prefix: Set(prefix.to_string()),
                    next_number: Set(2),
                    updated_at: Set(now),
                };
                row.insert(conn)
                    .await
                    .map_err(ServiceError::conflict_or_db)?;
                1
            }
        };

        let reference = format_reference(prefix, number, self.pad_width);
        info!(
            "Minted reference {} for document type {}",
            reference, document_type
        );
        Ok(reference)
    }
}

fn format_reference(prefix: &str, number: i64, pad_width: usize) -> String {
    format!("{}-{:0width$}", prefix, number, width = pad_width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn references_are_zero_padded() {
        assert_eq!(format_reference("PO", 1, 6), "PO-000001");
        assert_eq!(format_reference("INV", 42, 6), "INV-000042");
        assert_eq!(format_reference("GR", 123456, 6), "GR-123456");
    }

    #[test]
    fn counter_overflowing_the_pad_width_keeps_all_digits() {
        assert_eq!(format_reference("PO", 1234567, 6), "PO-1234567");
    }

    #[test]
    fn pad_width_is_configurable() {
        assert_eq!(format_reference("CN", 7, 4), "CN-0007");
    }
}
