//! Storage usage event entity
//!
//! Append-only deltas; current usage is the per-business sum.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "storage_usage_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub business_id: String,
    /// What the bytes belong to: photo, document, transcript
    pub object_kind: String,
    /// Positive on upload, negative on delete
    pub bytes_delta: i64,
    pub gmt_create: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
