//! Coupon service
//!
//! CRUD over rows with a JSON metadata column. Activation enforces the
//! per-tier active-coupon limit; expiry is computed on read.

use greenline_common::Tier;
use greenline_common::error::GreenLineError;
use greenline_persistence::entity::coupons::{self, status};
use rand::Rng;
use sea_orm::*;
use serde::{Deserialize, Serialize};

/// Fields accepted when creating a coupon
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCoupon {
    pub title: String,
    pub code: Option<String>,
    pub discount_percent: i32,
    pub starts_at: Option<chrono::NaiveDateTime>,
    pub expires_at: Option<chrono::NaiveDateTime>,
    pub metadata: Option<serde_json::Value>,
}

/// Coupon shape returned by the API, with computed status
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CouponView {
    pub id: String,
    pub business_id: String,
    pub code: String,
    pub title: String,
    pub discount_percent: i32,
    pub status: String,
    pub starts_at: Option<chrono::NaiveDateTime>,
    pub expires_at: Option<chrono::NaiveDateTime>,
    pub metadata: Option<serde_json::Value>,
}

/// Status as reported to clients: active coupons past expiry read as
/// expired without a write
pub fn effective_status(model: &coupons::Model, now: chrono::NaiveDateTime) -> String {
    if model.status == status::ACTIVE
        && let Some(expires) = model.expires_at
        && expires < now
    {
        return status::EXPIRED.to_string();
    }
    model.status.clone()
}

fn to_view(model: coupons::Model, now: chrono::NaiveDateTime) -> CouponView {
    let status = effective_status(&model, now);
    CouponView {
        id: model.id,
        business_id: model.business_id,
        code: model.code,
        title: model.title,
        discount_percent: model.discount_percent,
        status,
        starts_at: model.starts_at,
        expires_at: model.expires_at,
        metadata: model
            .metadata
            .as_deref()
            .and_then(|m| serde_json::from_str(m).ok()),
    }
}

/// Generate a random 8-character redemption code
pub fn generate_code() -> String {
    const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
    let mut rng = rand::rng();
    (0..8)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

pub async fn create(
    db: &DatabaseConnection,
    business_id: &str,
    params: CreateCoupon,
) -> anyhow::Result<CouponView> {
    if params.title.trim().is_empty() {
        return Err(GreenLineError::IllegalArgument("title cannot be empty".to_string()).into());
    }
    if !(1..=100).contains(&params.discount_percent) {
        return Err(GreenLineError::IllegalArgument(
            "discount must be between 1 and 100 percent".to_string(),
        )
        .into());
    }

    let code = params
        .code
        .map(|c| c.trim().to_uppercase())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(generate_code);

    if !greenline_common::is_valid_identifier(&code) {
        return Err(
            GreenLineError::IllegalArgument(format!("invalid coupon code '{}'", code)).into(),
        );
    }

    let existing = coupons::Entity::find()
        .filter(coupons::Column::BusinessId.eq(business_id))
        .filter(coupons::Column::Code.eq(&code))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(GreenLineError::Conflict(format!("coupon code '{}' already exists", code)).into());
    }

    let entity = coupons::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        business_id: Set(business_id.to_string()),
        code: Set(code),
        title: Set(params.title.trim().to_string()),
        discount_percent: Set(params.discount_percent),
        status: Set(status::DRAFT.to_string()),
        starts_at: Set(params.starts_at),
        expires_at: Set(params.expires_at),
        metadata: Set(params.metadata.map(|m| m.to_string())),
        gmt_create: Set(chrono::Utc::now().naive_utc()),
    };

    let inserted = entity.insert(db).await?;
    Ok(to_view(inserted, chrono::Utc::now().naive_utc()))
}

async fn find_owned(
    db: &DatabaseConnection,
    business_id: &str,
    coupon_id: &str,
) -> anyhow::Result<coupons::Model> {
    coupons::Entity::find_by_id(coupon_id)
        .filter(coupons::Column::BusinessId.eq(business_id))
        .one(db)
        .await?
        .ok_or_else(|| GreenLineError::NotFound(format!("coupon '{}'", coupon_id)).into())
}

pub async fn get(
    db: &DatabaseConnection,
    business_id: &str,
    coupon_id: &str,
) -> anyhow::Result<CouponView> {
    let model = find_owned(db, business_id, coupon_id).await?;
    Ok(to_view(model, chrono::Utc::now().naive_utc()))
}

/// Fields accepted when updating a coupon
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCoupon {
    pub title: Option<String>,
    pub discount_percent: Option<i32>,
    pub starts_at: Option<chrono::NaiveDateTime>,
    pub expires_at: Option<chrono::NaiveDateTime>,
    pub metadata: Option<serde_json::Value>,
}

pub async fn update(
    db: &DatabaseConnection,
    business_id: &str,
    coupon_id: &str,
    params: UpdateCoupon,
) -> anyhow::Result<CouponView> {
    if let Some(discount) = params.discount_percent
        && !(1..=100).contains(&discount)
    {
        return Err(GreenLineError::IllegalArgument(
            "discount must be between 1 and 100 percent".to_string(),
        )
        .into());
    }

    let model = find_owned(db, business_id, coupon_id).await?;
    let mut coupon: coupons::ActiveModel = model.into();

    if let Some(title) = params.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(
                GreenLineError::IllegalArgument("title cannot be empty".to_string()).into(),
            );
        }
        coupon.title = Set(title);
    }
    if let Some(discount) = params.discount_percent {
        coupon.discount_percent = Set(discount);
    }
    if let Some(starts_at) = params.starts_at {
        coupon.starts_at = Set(Some(starts_at));
    }
    if let Some(expires_at) = params.expires_at {
        coupon.expires_at = Set(Some(expires_at));
    }
    if let Some(metadata) = params.metadata {
        coupon.metadata = Set(Some(metadata.to_string()));
    }

    let updated = coupon.update(db).await?;
    Ok(to_view(updated, chrono::Utc::now().naive_utc()))
}

/// Count coupons currently in active status and not past expiry
async fn count_active(db: &DatabaseConnection, business_id: &str) -> anyhow::Result<usize> {
    let now = chrono::Utc::now().naive_utc();
    let active = coupons::Entity::find()
        .filter(coupons::Column::BusinessId.eq(business_id))
        .filter(coupons::Column::Status.eq(status::ACTIVE))
        .all(db)
        .await?;

    Ok(active
        .iter()
        .filter(|c| effective_status(c, now) == status::ACTIVE)
        .count())
}

/// Activate a draft coupon, enforcing the tier's active-coupon limit
pub async fn activate(
    db: &DatabaseConnection,
    business_id: &str,
    coupon_id: &str,
    tier: Tier,
) -> anyhow::Result<CouponView> {
    let model = find_owned(db, business_id, coupon_id).await?;

    if model.status == status::ACTIVE {
        return Ok(to_view(model, chrono::Utc::now().naive_utc()));
    }
    if model.status == status::ARCHIVED {
        return Err(
            GreenLineError::IllegalArgument("archived coupons cannot be activated".to_string())
                .into(),
        );
    }

    let active = count_active(db, business_id).await?;
    if active >= tier.active_coupon_limit() {
        return Err(GreenLineError::TierDenied(
            tier.as_str().to_string(),
            format!("more than {} active coupons", tier.active_coupon_limit()),
        )
        .into());
    }

    let mut coupon: coupons::ActiveModel = model.into();
    coupon.status = Set(status::ACTIVE.to_string());
    let updated = coupon.update(db).await?;

    Ok(to_view(updated, chrono::Utc::now().naive_utc()))
}

pub async fn archive(
    db: &DatabaseConnection,
    business_id: &str,
    coupon_id: &str,
) -> anyhow::Result<()> {
    let model = find_owned(db, business_id, coupon_id).await?;
    let mut coupon: coupons::ActiveModel = model.into();
    coupon.status = Set(status::ARCHIVED.to_string());
    coupon.update(db).await?;
    Ok(())
}

pub async fn list_by_business(
    db: &DatabaseConnection,
    business_id: &str,
) -> anyhow::Result<Vec<CouponView>> {
    let now = chrono::Utc::now().naive_utc();
    let models = coupons::Entity::find()
        .filter(coupons::Column::BusinessId.eq(business_id))
        .order_by(coupons::Column::GmtCreate, Order::Desc)
        .all(db)
        .await?;

    Ok(models.into_iter().map(|m| to_view(m, now)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coupon(status_str: &str, expires_in_hours: Option<i64>) -> coupons::Model {
        let now = chrono::DateTime::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .naive_utc();
        coupons::Model {
            id: "c-1".to_string(),
            business_id: "biz-1".to_string(),
            code: "SPRING20".to_string(),
            title: "Spring special".to_string(),
            discount_percent: 20,
            status: status_str.to_string(),
            starts_at: None,
            expires_at: expires_in_hours.map(|h| now + chrono::Duration::hours(h)),
            metadata: None,
            gmt_create: now,
        }
    }

    fn now() -> chrono::NaiveDateTime {
        chrono::DateTime::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .naive_utc()
    }

    #[test]
    fn test_effective_status_active_unexpired() {
        assert_eq!(effective_status(&coupon(status::ACTIVE, Some(24)), now()), status::ACTIVE);
        assert_eq!(effective_status(&coupon(status::ACTIVE, None), now()), status::ACTIVE);
    }

    #[test]
    fn test_effective_status_expired() {
        assert_eq!(effective_status(&coupon(status::ACTIVE, Some(-1)), now()), status::EXPIRED);
    }

    #[test]
    fn test_effective_status_draft_past_expiry_stays_draft() {
        assert_eq!(effective_status(&coupon(status::DRAFT, Some(-1)), now()), status::DRAFT);
    }

    #[test]
    fn test_generate_code_shape() {
        let code = generate_code();
        assert_eq!(code.len(), 8);
        assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
        // ambiguous characters are excluded from the alphabet
        assert!(!code.contains('O') && !code.contains('0') && !code.contains('I'));
    }
}
