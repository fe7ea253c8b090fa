//! Business (tenant) entity
//!
//! One row per subscribed local business. The `tier` column gates
//! feature access everywhere else in the system.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "businesses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    /// URL slug, unique across the platform
    pub slug: String,
    /// Subscription tier: tier1, tier2, tier3
    pub tier: String,
    pub industry: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub phone: Option<String>,
    pub contact_email: Option<String>,
    /// Lifecycle status: active, suspended
    pub status: String,
    /// Stripe customer backing this subscription, if billed
    pub stripe_customer_id: Option<String>,
    /// Weather alert thresholds; a null disables that alert type
    pub wind_threshold_kph: Option<f64>,
    pub rain_threshold_mm: Option<f64>,
    pub temp_low_threshold_c: Option<f64>,
    pub temp_high_threshold_c: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub metadata: Option<String>,
    pub gmt_create: DateTime,
    pub gmt_modified: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Business lifecycle status values
pub mod status {
    pub const ACTIVE: &str = "active";
    pub const SUSPENDED: &str = "suspended";
}
