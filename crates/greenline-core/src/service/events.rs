//! Platform event logger
//!
//! Thin insert helper for the event stream dashboard widgets read.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Serialize;

use greenline_persistence::entity::platform_events;

pub use greenline_persistence::entity::platform_events::event_type;

pub async fn record(
    db: &DatabaseConnection,
    event_type: &str,
    business_id: Option<&str>,
    actor: &str,
    payload: Option<&impl Serialize>,
) -> anyhow::Result<u64> {
    let active = platform_events::ActiveModel {
        event_type: Set(event_type.to_string()),
        business_id: Set(business_id.map(|s| s.to_string())),
        actor: Set(actor.to_string()),
        payload: Set(payload.and_then(|p| serde_json::to_string(p).ok())),
        gmt_create: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    let inserted = active.insert(db).await?;
    Ok(inserted.id)
}

/// Record an event, swallowing failures
pub async fn record_best_effort(
    db: &DatabaseConnection,
    event_type: &str,
    business_id: Option<&str>,
    actor: &str,
    payload: Option<&impl Serialize>,
) {
    if let Err(e) = record(db, event_type, business_id, actor, payload).await {
        tracing::warn!(event_type, "Failed to record platform event: {}", e);
    }
}

/// Most recent events for a business, newest first
pub async fn recent(
    db: &DatabaseConnection,
    business_id: &str,
    limit: u64,
) -> anyhow::Result<Vec<platform_events::Model>> {
    let events = platform_events::Entity::find()
        .filter(platform_events::Column::BusinessId.eq(business_id))
        .order_by(platform_events::Column::GmtCreate, Order::Desc)
        .limit(limit)
        .all(db)
        .await?;

    Ok(events)
}
