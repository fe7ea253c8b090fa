//! Coupon entity

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "coupons")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub business_id: String,
    /// Redemption code, unique per business
    pub code: String,
    pub title: String,
    pub discount_percent: i32,
    /// Lifecycle status: draft, active, archived (expired is computed)
    pub status: String,
    pub starts_at: Option<DateTime>,
    pub expires_at: Option<DateTime>,
    #[sea_orm(column_type = "Text", nullable)]
    pub metadata: Option<String>,
    pub gmt_create: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Coupon lifecycle status values
pub mod status {
    pub const DRAFT: &str = "draft";
    pub const ACTIVE: &str = "active";
    pub const EXPIRED: &str = "expired";
    pub const ARCHIVED: &str = "archived";
}
