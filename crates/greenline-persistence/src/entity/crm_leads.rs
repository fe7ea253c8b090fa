//! CRM lead entity
//!
//! Sales prospects captured from the public site or entered manually.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "crm_leads")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub business_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Capture source: web_form, voice_ai, manual, import
    pub source: Option<String>,
    /// Pipeline status: new, contacted, qualified, won, lost
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub metadata: Option<String>,
    pub deleted: i8,
    pub gmt_create: DateTime,
    pub gmt_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Lead pipeline status values
pub mod status {
    pub const NEW: &str = "new";
    pub const CONTACTED: &str = "contacted";
    pub const QUALIFIED: &str = "qualified";
    pub const WON: &str = "won";
    pub const LOST: &str = "lost";

    pub const ALL: &[&str] = &[NEW, CONTACTED, QUALIFIED, WON, LOST];
}
