//! Storage usage tracking and quota checks
//!
//! Usage is an append-only event stream of byte deltas; the current
//! figure is the per-business sum.

use greenline_common::Tier;
use greenline_common::error::GreenLineError;
use greenline_persistence::entity::storage_usage_events;
use sea_orm::*;

/// Nominal size charged per photo URL
///
/// Photos live in external object storage and are referenced by URL, so
/// quota accounting uses a flat per-photo estimate.
pub const ESTIMATED_PHOTO_BYTES: i64 = 2 * 1024 * 1024;

pub async fn record_usage(
    db: &DatabaseConnection,
    business_id: &str,
    object_kind: &str,
    bytes_delta: i64,
) -> anyhow::Result<()> {
    let entity = storage_usage_events::ActiveModel {
        business_id: Set(business_id.to_string()),
        object_kind: Set(object_kind.to_string()),
        bytes_delta: Set(bytes_delta),
        gmt_create: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    entity.insert(db).await?;
    Ok(())
}

/// Current usage in bytes (sum of deltas, floored at zero)
pub async fn current_usage(db: &DatabaseConnection, business_id: &str) -> anyhow::Result<i64> {
    let sum: Option<i64> = storage_usage_events::Entity::find()
        .select_only()
        .column_as(
            storage_usage_events::Column::BytesDelta.sum(),
            "total_bytes",
        )
        .filter(storage_usage_events::Column::BusinessId.eq(business_id))
        .into_tuple()
        .one(db)
        .await?
        .flatten();

    Ok(sum.unwrap_or(0).max(0))
}

/// Pure quota check used by write paths
pub fn within_quota(current_bytes: i64, additional_bytes: i64, tier: Tier) -> bool {
    current_bytes.saturating_add(additional_bytes) <= tier.storage_quota_bytes()
}

/// Reject a write that would exceed the tier's storage quota
pub async fn check_quota(
    db: &DatabaseConnection,
    business_id: &str,
    tier: Tier,
    additional_bytes: i64,
) -> anyhow::Result<()> {
    let current = current_usage(db, business_id).await?;

    if within_quota(current, additional_bytes, tier) {
        Ok(())
    } else {
        Err(GreenLineError::QuotaExceeded(business_id.to_string()).into())
    }
}

/// Per-business usage totals, largest first
pub async fn usage_by_business(
    db: &DatabaseConnection,
    limit: u64,
) -> anyhow::Result<Vec<(String, i64)>> {
    let mut totals: Vec<(String, i64)> = storage_usage_events::Entity::find()
        .select_only()
        .column(storage_usage_events::Column::BusinessId)
        .column_as(
            storage_usage_events::Column::BytesDelta.sum(),
            "total_bytes",
        )
        .group_by(storage_usage_events::Column::BusinessId)
        .into_tuple::<(String, Option<i64>)>()
        .all(db)
        .await?
        .into_iter()
        .map(|(id, total)| (id, total.unwrap_or(0)))
        .collect();

    totals.sort_by(|a, b| b.1.cmp(&a.1));
    totals.truncate(limit as usize);

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_quota() {
        let quota = Tier::Tier1.storage_quota_bytes();
        assert!(within_quota(0, quota, Tier::Tier1));
        assert!(!within_quota(0, quota + 1, Tier::Tier1));
        assert!(within_quota(quota - 10, 10, Tier::Tier1));
        assert!(!within_quota(quota, 1, Tier::Tier1));
    }

    #[test]
    fn test_within_quota_saturates() {
        assert!(!within_quota(i64::MAX, 1, Tier::Tier3));
    }

    #[test]
    fn test_tier_quota_monotonic() {
        assert!(Tier::Tier1.storage_quota_bytes() < Tier::Tier2.storage_quota_bytes());
        assert!(Tier::Tier2.storage_quota_bytes() < Tier::Tier3.storage_quota_bytes());
    }
}
