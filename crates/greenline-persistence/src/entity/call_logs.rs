//! Voice AI call log entity
//!
//! One row per Retell call, keyed by the provider call id so webhook
//! deliveries upsert idempotently. The outcome column holds the
//! post-hoc classification of the AI-produced summary; transitions are
//! inferred from text, not modeled as a state machine.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "call_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub business_id: String,
    /// Retell call id, unique
    pub provider_call_id: String,
    pub caller_number: Option<String>,
    pub callee_number: Option<String>,
    pub duration_seconds: Option<i32>,
    #[sea_orm(column_type = "Text", nullable)]
    pub transcript: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,
    /// Classified outcome: booked, callback_requested, not_interested,
    /// voicemail, no_answer, unclassified
    pub outcome: String,
    /// SMS follow-ups sent for this call
    pub nudge_count: i32,
    pub last_nudge_at: Option<DateTime>,
    pub gmt_create: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Call outcome values
pub mod outcome {
    pub const BOOKED: &str = "booked";
    pub const CALLBACK_REQUESTED: &str = "callback_requested";
    pub const NOT_INTERESTED: &str = "not_interested";
    pub const VOICEMAIL: &str = "voicemail";
    pub const NO_ANSWER: &str = "no_answer";
    pub const UNCLASSIFIED: &str = "unclassified";
}
