//! Business (tenant) service

use greenline_common::error::GreenLineError;
use greenline_common::{Tier, slugify};
use greenline_persistence::Page;
use greenline_persistence::entity::businesses;
use sea_orm::sea_query::Asterisk;
use sea_orm::*;
use serde::Deserialize;

/// Fields accepted when creating a business
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBusiness {
    pub name: String,
    pub industry: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub phone: Option<String>,
    pub contact_email: Option<String>,
}

/// Fields accepted when updating a business profile
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBusiness {
    pub name: Option<String>,
    pub industry: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    pub phone: Option<String>,
    pub contact_email: Option<String>,
    pub wind_threshold_kph: Option<f64>,
    pub rain_threshold_mm: Option<f64>,
    pub temp_low_threshold_c: Option<f64>,
    pub temp_high_threshold_c: Option<f64>,
    pub metadata: Option<serde_json::Value>,
}

pub async fn find_by_id(
    db: &DatabaseConnection,
    id: &str,
) -> anyhow::Result<Option<businesses::Model>> {
    let business = businesses::Entity::find_by_id(id).one(db).await?;
    Ok(business)
}

pub async fn get(db: &DatabaseConnection, id: &str) -> anyhow::Result<businesses::Model> {
    find_by_id(db, id)
        .await?
        .ok_or_else(|| GreenLineError::BusinessNotExist(id.to_string()).into())
}

/// Resolve the subscription tier for a business
pub async fn find_tier(db: &DatabaseConnection, id: &str) -> anyhow::Result<Tier> {
    let business = get(db, id).await?;
    Ok(business.tier.parse().unwrap_or_default())
}

pub async fn create(
    db: &DatabaseConnection,
    params: CreateBusiness,
) -> anyhow::Result<businesses::Model> {
    if params.name.trim().is_empty() {
        return Err(GreenLineError::IllegalArgument("name cannot be empty".to_string()).into());
    }

    let slug = slugify(&params.name);
    if slug.is_empty() {
        return Err(
            GreenLineError::IllegalArgument("name yields an empty slug".to_string()).into(),
        );
    }

    let existing = businesses::Entity::find()
        .filter(businesses::Column::Slug.eq(&slug))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(GreenLineError::Conflict(format!("slug '{}' already taken", slug)).into());
    }

    let now = chrono::Utc::now().naive_utc();
    let entity = businesses::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        name: Set(params.name.trim().to_string()),
        slug: Set(slug),
        tier: Set(Tier::Tier1.as_str().to_string()),
        industry: Set(params.industry),
        city: Set(params.city),
        latitude: Set(params.latitude),
        longitude: Set(params.longitude),
        timezone: Set(params.timezone),
        phone: Set(params.phone),
        contact_email: Set(params.contact_email),
        status: Set(businesses::status::ACTIVE.to_string()),
        stripe_customer_id: Set(None),
        wind_threshold_kph: Set(None),
        rain_threshold_mm: Set(None),
        temp_low_threshold_c: Set(None),
        temp_high_threshold_c: Set(None),
        metadata: Set(None),
        gmt_create: Set(now),
        gmt_modified: Set(now),
    };

    let inserted = entity.insert(db).await?;
    Ok(inserted)
}

pub async fn update(
    db: &DatabaseConnection,
    id: &str,
    params: UpdateBusiness,
) -> anyhow::Result<businesses::Model> {
    let entity = get(db, id).await?;
    let mut business: businesses::ActiveModel = entity.into();

    if let Some(name) = params.name {
        business.name = Set(name);
    }
    if let Some(industry) = params.industry {
        business.industry = Set(Some(industry));
    }
    if let Some(city) = params.city {
        business.city = Set(Some(city));
    }
    if let Some(latitude) = params.latitude {
        business.latitude = Set(Some(latitude));
    }
    if let Some(longitude) = params.longitude {
        business.longitude = Set(Some(longitude));
    }
    if let Some(timezone) = params.timezone {
        business.timezone = Set(Some(timezone));
    }
    if let Some(phone) = params.phone {
        business.phone = Set(Some(phone));
    }
    if let Some(email) = params.contact_email {
        business.contact_email = Set(Some(email));
    }
    if let Some(v) = params.wind_threshold_kph {
        business.wind_threshold_kph = Set(Some(v));
    }
    if let Some(v) = params.rain_threshold_mm {
        business.rain_threshold_mm = Set(Some(v));
    }
    if let Some(v) = params.temp_low_threshold_c {
        business.temp_low_threshold_c = Set(Some(v));
    }
    if let Some(v) = params.temp_high_threshold_c {
        business.temp_high_threshold_c = Set(Some(v));
    }
    if let Some(metadata) = params.metadata {
        business.metadata = Set(Some(metadata.to_string()));
    }
    business.gmt_modified = Set(chrono::Utc::now().naive_utc());

    let updated = business.update(db).await?;
    Ok(updated)
}

/// Change lifecycle status (active/suspended)
pub async fn set_status(db: &DatabaseConnection, id: &str, status: &str) -> anyhow::Result<()> {
    if status != businesses::status::ACTIVE && status != businesses::status::SUSPENDED {
        return Err(
            GreenLineError::IllegalArgument(format!("invalid status '{}'", status)).into(),
        );
    }

    let entity = get(db, id).await?;
    let mut business: businesses::ActiveModel = entity.into();
    business.status = Set(status.to_string());
    business.gmt_modified = Set(chrono::Utc::now().naive_utc());
    business.update(db).await?;

    Ok(())
}

/// Change the subscription tier
///
/// Only the Stripe webhook and platform admins reach this.
pub async fn set_tier(db: &DatabaseConnection, id: &str, tier: Tier) -> anyhow::Result<()> {
    let entity = get(db, id).await?;
    let mut business: businesses::ActiveModel = entity.into();
    business.tier = Set(tier.as_str().to_string());
    business.gmt_modified = Set(chrono::Utc::now().naive_utc());
    business.update(db).await?;

    Ok(())
}

pub async fn find_by_stripe_customer(
    db: &DatabaseConnection,
    customer_id: &str,
) -> anyhow::Result<Option<businesses::Model>> {
    let business = businesses::Entity::find()
        .filter(businesses::Column::StripeCustomerId.eq(customer_id))
        .one(db)
        .await?;
    Ok(business)
}

/// Businesses the weather watcher should cover this cycle
///
/// Active, located, tier2+, and at least one threshold configured.
pub async fn find_weather_watchable(
    db: &DatabaseConnection,
) -> anyhow::Result<Vec<businesses::Model>> {
    let candidates = businesses::Entity::find()
        .filter(businesses::Column::Status.eq(businesses::status::ACTIVE))
        .filter(businesses::Column::Latitude.is_not_null())
        .filter(businesses::Column::Longitude.is_not_null())
        .all(db)
        .await?;

    Ok(candidates
        .into_iter()
        .filter(|b| {
            let tier: greenline_common::Tier = b.tier.parse().unwrap_or_default();
            tier.weather_watch_enabled()
                && (b.wind_threshold_kph.is_some()
                    || b.rain_threshold_mm.is_some()
                    || b.temp_low_threshold_c.is_some()
                    || b.temp_high_threshold_c.is_some())
        })
        .collect())
}

pub async fn search_page(
    db: &DatabaseConnection,
    keyword: &str,
    page_no: u64,
    page_size: u64,
) -> anyhow::Result<Page<businesses::Model>> {
    let mut count_select = businesses::Entity::find();
    let mut query_select = businesses::Entity::find();

    if !keyword.is_empty() {
        count_select = count_select.filter(businesses::Column::Name.contains(keyword));
        query_select = query_select.filter(businesses::Column::Name.contains(keyword));
    }

    let total_count = count_select
        .select_only()
        .column_as(prelude::Expr::col(Asterisk).count(), "count")
        .into_tuple::<i64>()
        .one(db)
        .await?
        .unwrap_or_default() as u64;

    if total_count > 0 {
        let offset = (page_no - 1) * page_size;
        let page_items = query_select
            .order_by(businesses::Column::GmtCreate, Order::Desc)
            .offset(offset)
            .limit(page_size)
            .all(db)
            .await?;

        return Ok(Page::new(total_count, page_no, page_size, page_items));
    }

    Ok(Page::default())
}
