//! Platform event entity
//!
//! Fire-and-forget event stream consumed by dashboard widgets.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "platform_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    /// Event type: lead_captured, chat_completed, call_logged,
    /// weather_alert, coupon_activated, poll_voted, tier_changed
    pub event_type: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub business_id: Option<String>,
    pub actor: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub payload: Option<String>,
    pub gmt_create: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Event type values
pub mod event_type {
    pub const LEAD_CAPTURED: &str = "lead_captured";
    pub const CHAT_COMPLETED: &str = "chat_completed";
    pub const CALL_LOGGED: &str = "call_logged";
    pub const WEATHER_ALERT: &str = "weather_alert";
    pub const COUPON_ACTIVATED: &str = "coupon_activated";
    pub const POLL_VOTED: &str = "poll_voted";
    pub const TIER_CHANGED: &str = "tier_changed";
}
