//! Dashboard metrics aggregation
//!
//! Aggregate counts backing the admin dashboard widgets. Each figure is
//! one grouped query; nothing here is cached.

use std::collections::HashMap;

use greenline_persistence::entity::{
    businesses, call_logs, coupons, crm_leads, weather_alerts,
};
use sea_orm::sea_query::Asterisk;
use sea_orm::*;
use serde::Serialize;

use super::storage;

/// Aggregates for the platform dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub businesses_by_tier: HashMap<String, u64>,
    pub businesses_by_status: HashMap<String, u64>,
    pub leads_last_30_days: u64,
    pub calls_by_outcome: HashMap<String, u64>,
    pub open_weather_alerts: u64,
    pub active_coupons: u64,
    pub top_storage_businesses: Vec<StorageUsage>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUsage {
    pub business_id: String,
    pub bytes: i64,
}

async fn grouped_count<E, C>(
    db: &DatabaseConnection,
    column: C,
) -> anyhow::Result<HashMap<String, u64>>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    let rows: Vec<(String, i64)> = E::find()
        .select_only()
        .column(column)
        .column_as(prelude::Expr::col(Asterisk).count(), "count")
        .group_by(column)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rows.into_iter().map(|(k, v)| (k, v as u64)).collect())
}

pub async fn gather(db: &DatabaseConnection) -> anyhow::Result<DashboardMetrics> {
    let businesses_by_tier =
        grouped_count::<businesses::Entity, _>(db, businesses::Column::Tier).await?;
    let businesses_by_status =
        grouped_count::<businesses::Entity, _>(db, businesses::Column::Status).await?;
    let calls_by_outcome =
        grouped_count::<call_logs::Entity, _>(db, call_logs::Column::Outcome).await?;

    let leads_last_30_days = super::crm::count_recent(db, None, 30).await?;

    let open_weather_alerts = weather_alerts::Entity::find()
        .filter(weather_alerts::Column::Acknowledged.eq(0))
        .count(db)
        .await?;

    let active_coupons = coupons::Entity::find()
        .filter(coupons::Column::Status.eq(coupons::status::ACTIVE))
        .count(db)
        .await?;

    let top_storage_businesses = storage::usage_by_business(db, 10)
        .await?
        .into_iter()
        .map(|(business_id, bytes)| StorageUsage { business_id, bytes })
        .collect();

    Ok(DashboardMetrics {
        businesses_by_tier,
        businesses_by_status,
        leads_last_30_days,
        calls_by_outcome,
        open_weather_alerts,
        active_coupons,
        top_storage_businesses,
    })
}

/// Per-business snapshot for the tenant dashboard
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessMetrics {
    pub leads_last_30_days: u64,
    pub leads_by_status: HashMap<String, u64>,
    pub calls_by_outcome: HashMap<String, u64>,
    pub open_weather_alerts: u64,
    pub storage_bytes: i64,
}

pub async fn gather_for_business(
    db: &DatabaseConnection,
    business_id: &str,
) -> anyhow::Result<BusinessMetrics> {
    let leads_by_status: HashMap<String, u64> = crm_leads::Entity::find()
        .select_only()
        .column(crm_leads::Column::Status)
        .column_as(prelude::Expr::col(Asterisk).count(), "count")
        .filter(crm_leads::Column::BusinessId.eq(business_id))
        .filter(crm_leads::Column::Deleted.eq(0))
        .group_by(crm_leads::Column::Status)
        .into_tuple::<(String, i64)>()
        .all(db)
        .await?
        .into_iter()
        .map(|(k, v)| (k, v as u64))
        .collect();

    let calls_by_outcome: HashMap<String, u64> = call_logs::Entity::find()
        .select_only()
        .column(call_logs::Column::Outcome)
        .column_as(prelude::Expr::col(Asterisk).count(), "count")
        .filter(call_logs::Column::BusinessId.eq(business_id))
        .group_by(call_logs::Column::Outcome)
        .into_tuple::<(String, i64)>()
        .all(db)
        .await?
        .into_iter()
        .map(|(k, v)| (k, v as u64))
        .collect();

    let leads_last_30_days = super::crm::count_recent(db, Some(business_id), 30).await?;

    let open_weather_alerts = weather_alerts::Entity::find()
        .filter(weather_alerts::Column::BusinessId.eq(business_id))
        .filter(weather_alerts::Column::Acknowledged.eq(0))
        .count(db)
        .await?;

    let storage_bytes = storage::current_usage(db, business_id).await?;

    Ok(BusinessMetrics {
        leads_last_30_days,
        leads_by_status,
        calls_by_outcome,
        open_weather_alerts,
        storage_bytes,
    })
}
