//! Directory listing entity
//!
//! Public-facing business profile rows. Photos are stored as a JSON
//! array of URLs; tier gating slices that array elsewhere.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "directory_listings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub business_id: String,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,
    pub category: Option<String>,
    /// JSON array of photo URLs
    #[sea_orm(column_type = "Text", nullable)]
    pub photos: Option<String>,
    pub website: Option<String>,
    pub published: i8,
    /// Featured placement, tier2+ only
    pub featured: i8,
    /// Soft delete flag
    pub deleted: i8,
    pub gmt_create: DateTime,
    pub gmt_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
