//! Weather alert entity
//!
//! Written by the weather watcher when a business threshold is crossed.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "weather_alerts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: u64,
    pub business_id: String,
    /// Alert type: high_wind, heavy_rain, freeze, heat
    pub alert_type: String,
    /// Severity: advisory, warning
    pub severity: String,
    pub headline: String,
    pub observed_value: f64,
    pub threshold_value: f64,
    pub acknowledged: i8,
    pub gmt_create: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Alert type values
pub mod alert_type {
    pub const HIGH_WIND: &str = "high_wind";
    pub const HEAVY_RAIN: &str = "heavy_rain";
    pub const FREEZE: &str = "freeze";
    pub const HEAT: &str = "heat";
}

/// Severity values
pub mod severity {
    pub const ADVISORY: &str = "advisory";
    pub const WARNING: &str = "warning";
}
