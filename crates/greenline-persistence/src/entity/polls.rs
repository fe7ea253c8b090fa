//! Poll entity
//!
//! Options and vote counts live in a single JSON blob mutated by
//! read-modify-write keyed on the primary id.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "polls")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub business_id: String,
    pub question: String,
    /// JSON array of {id, label, votes}
    #[sea_orm(column_type = "Text")]
    pub options: String,
    /// open or closed
    pub status: String,
    pub gmt_create: DateTime,
    pub gmt_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Poll status values
pub mod status {
    pub const OPEN: &str = "open";
    pub const CLOSED: &str = "closed";
}
