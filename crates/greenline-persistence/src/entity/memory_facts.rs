//! Memory bucket: pinned business facts
//!
//! Highest-priority context source for AI chat. Rows are read in
//! priority order and concatenated into the prompt.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "memory_facts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub business_id: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    /// Higher priority rows are read first
    pub priority: i32,
    pub gmt_create: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
