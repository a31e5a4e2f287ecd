use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use crate::entities::outbox_notification::{self, Entity as OutboxEntity};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Copy)]
pub enum OutboxStatus {
    Pending,
    Delivered,
    Failed,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "pending",
            OutboxStatus::Delivered => "delivered",
            OutboxStatus::Failed => "failed",
        }
    }
}

/// Stages a notification row inside the caller's transaction.
///
/// A rolled-back posting takes its notifications with it; the external
/// dispatcher only ever sees rows whose business writes committed.
pub async fn stage<C: ConnectionTrait>(
    conn: &C,
    now: DateTime<Utc>,
    aggregate_type: &str,
    aggregate_id: Option<Uuid>,
    event_type: &str,
    payload: Value,
) -> Result<Uuid, ServiceError> {
    let id = Uuid::new_v4();
    let row = outbox_notification::ActiveModel {
        id: Set(id),
        aggregate_type: Set(aggregate_type.to_string()),
        aggregate_id: Set(aggregate_id),
        event_type: Set(event_type.to_string()),
        payload: Set(payload),
        status: Set(OutboxStatus::Pending.as_str().to_string()),
        attempts: Set(0),
        available_at: Set(now),
        created_at: Set(now),
        updated_at: Set(now),
    };
    row.insert(conn).await.map_err(ServiceError::db_error)?;

    debug!(
        "staged outbox notification {} type={} aggregate={}",
        id, event_type, aggregate_type
    );
    Ok(id)
}

/// Oldest pending notifications, for the external dispatcher to drain.
pub async fn pending<C: ConnectionTrait>(
    conn: &C,
    limit: u64,
) -> Result<Vec<outbox_notification::Model>, ServiceError> {
    OutboxEntity::find()
        .filter(outbox_notification::Column::Status.eq(OutboxStatus::Pending.as_str()))
        .order_by_asc(outbox_notification::Column::CreatedAt)
        .limit(limit)
        .all(conn)
        .await
        .map_err(ServiceError::db_error)
}

/// Marks a notification as handed off.
pub async fn mark_delivered<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    now: DateTime<Utc>,
) -> Result<(), ServiceError> {
    let row = OutboxEntity::find_by_id(id)
        .one(conn)
        .await
        .map_err(ServiceError::db_error)?
        .ok_or_else(|| ServiceError::NotFound(format!("Outbox notification {} not found", id)))?;

    let attempts = row.attempts;
    let mut active: outbox_notification::ActiveModel = row.into();
    active.status = Set(OutboxStatus::Delivered.as_str().to_string());
    active.attempts = Set(attempts + 1);
    active.updated_at = Set(now);
    active.update(conn).await.map_err(ServiceError::db_error)?;
    Ok(())
}
