//! Memory bucket: recent chat turns
//!
//! Appended after every chat exchange and trimmed to the most recent
//! rows per business.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "memory_conversations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub business_id: String,
    /// Chat role: user, assistant
    pub role: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub gmt_create: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
