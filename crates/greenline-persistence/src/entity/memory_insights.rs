//! Memory bucket: AI-derived insights

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "memory_insights")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub business_id: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    /// Relevance score assigned when the insight was extracted
    pub score: f64,
    pub gmt_create: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
