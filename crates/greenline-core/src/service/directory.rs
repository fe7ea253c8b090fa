//! Directory listing service
//!
//! Photo gating is pure conditional logic selecting array slices based
//! on the business tier; it is applied on write and defensively on
//! public reads.

use greenline_common::Tier;
use greenline_common::error::GreenLineError;
use greenline_persistence::Page;
use greenline_persistence::entity::{businesses, directory_listings};
use sea_orm::sea_query::Asterisk;
use sea_orm::*;
use serde::{Deserialize, Serialize};

/// Listing shape returned by the API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    pub id: String,
    pub business_id: String,
    pub title: String,
    pub summary: Option<String>,
    pub category: Option<String>,
    pub photos: Vec<String>,
    pub website: Option<String>,
    pub published: bool,
    pub featured: bool,
}

impl ListingView {
    fn from_model(m: directory_listings::Model) -> Self {
        let photos = parse_photos(m.photos.as_deref());
        Self {
            id: m.id,
            business_id: m.business_id,
            title: m.title,
            summary: m.summary,
            category: m.category,
            photos,
            website: m.website,
            published: m.published != 0,
            featured: m.featured != 0,
        }
    }
}

/// Fields accepted when creating or updating a listing
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub category: Option<String>,
    pub photos: Option<Vec<String>>,
    pub website: Option<String>,
}

/// Parse the stored JSON photo array; malformed data reads as empty
pub fn parse_photos(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
        .unwrap_or_default()
}

/// Select the photo slice a tier is entitled to
pub fn gate_photos(photos: &[String], tier: Tier) -> Vec<String> {
    let limit = tier.photo_limit();
    photos.iter().take(limit).cloned().collect()
}

pub async fn create(
    db: &DatabaseConnection,
    business_id: &str,
    tier: Tier,
    params: ListingParams,
) -> anyhow::Result<ListingView> {
    let title = params
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GreenLineError::IllegalArgument("title cannot be empty".to_string()))?;

    let photos = params.photos.unwrap_or_default();
    if photos.len() > tier.photo_limit() {
        return Err(GreenLineError::TierDenied(
            tier.as_str().to_string(),
            format!("more than {} photos", tier.photo_limit()),
        )
        .into());
    }

    let now = chrono::Utc::now().naive_utc();
    let entity = directory_listings::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        business_id: Set(business_id.to_string()),
        title: Set(title.to_string()),
        summary: Set(params.summary),
        category: Set(params.category),
        photos: Set(Some(serde_json::to_string(&photos)?)),
        website: Set(params.website),
        published: Set(0),
        featured: Set(0),
        deleted: Set(0),
        gmt_create: Set(now),
        gmt_modified: Set(now),
    };

    let inserted = entity.insert(db).await?;
    Ok(ListingView::from_model(inserted))
}

async fn find_owned(
    db: &DatabaseConnection,
    business_id: &str,
    listing_id: &str,
) -> anyhow::Result<directory_listings::Model> {
    directory_listings::Entity::find_by_id(listing_id)
        .filter(directory_listings::Column::BusinessId.eq(business_id))
        .filter(directory_listings::Column::Deleted.eq(0))
        .one(db)
        .await?
        .ok_or_else(|| GreenLineError::NotFound(format!("listing '{}'", listing_id)).into())
}

pub async fn get(
    db: &DatabaseConnection,
    business_id: &str,
    listing_id: &str,
) -> anyhow::Result<ListingView> {
    let model = find_owned(db, business_id, listing_id).await?;
    Ok(ListingView::from_model(model))
}

pub async fn update(
    db: &DatabaseConnection,
    business_id: &str,
    listing_id: &str,
    tier: Tier,
    params: ListingParams,
) -> anyhow::Result<ListingView> {
    let entity = find_owned(db, business_id, listing_id).await?;
    let mut listing: directory_listings::ActiveModel = entity.into();

    if let Some(title) = params.title {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(
                GreenLineError::IllegalArgument("title cannot be empty".to_string()).into(),
            );
        }
        listing.title = Set(title);
    }
    if let Some(summary) = params.summary {
        listing.summary = Set(Some(summary));
    }
    if let Some(category) = params.category {
        listing.category = Set(Some(category));
    }
    if let Some(photos) = params.photos {
        if photos.len() > tier.photo_limit() {
            return Err(GreenLineError::TierDenied(
                tier.as_str().to_string(),
                format!("more than {} photos", tier.photo_limit()),
            )
            .into());
        }
        listing.photos = Set(Some(serde_json::to_string(&photos)?));
    }
    if let Some(website) = params.website {
        listing.website = Set(Some(website));
    }
    listing.gmt_modified = Set(chrono::Utc::now().naive_utc());

    let updated = listing.update(db).await?;
    Ok(ListingView::from_model(updated))
}

pub async fn set_published(
    db: &DatabaseConnection,
    business_id: &str,
    listing_id: &str,
    published: bool,
) -> anyhow::Result<()> {
    let entity = find_owned(db, business_id, listing_id).await?;
    let mut listing: directory_listings::ActiveModel = entity.into();
    listing.published = Set(if published { 1 } else { 0 });
    listing.gmt_modified = Set(chrono::Utc::now().naive_utc());
    listing.update(db).await?;
    Ok(())
}

/// Featured placement is a tier2+ feature
pub async fn set_featured(
    db: &DatabaseConnection,
    business_id: &str,
    listing_id: &str,
    tier: Tier,
    featured: bool,
) -> anyhow::Result<()> {
    if featured && tier < Tier::Tier2 {
        return Err(GreenLineError::TierDenied(
            tier.as_str().to_string(),
            "featured placement".to_string(),
        )
        .into());
    }

    let entity = find_owned(db, business_id, listing_id).await?;
    let mut listing: directory_listings::ActiveModel = entity.into();
    listing.featured = Set(if featured { 1 } else { 0 });
    listing.gmt_modified = Set(chrono::Utc::now().naive_utc());
    listing.update(db).await?;
    Ok(())
}

/// Soft delete
pub async fn delete(
    db: &DatabaseConnection,
    business_id: &str,
    listing_id: &str,
) -> anyhow::Result<()> {
    let entity = find_owned(db, business_id, listing_id).await?;
    let mut listing: directory_listings::ActiveModel = entity.into();
    listing.deleted = Set(1);
    listing.gmt_modified = Set(chrono::Utc::now().naive_utc());
    listing.update(db).await?;
    Ok(())
}

pub async fn list_by_business(
    db: &DatabaseConnection,
    business_id: &str,
) -> anyhow::Result<Vec<ListingView>> {
    let listings = directory_listings::Entity::find()
        .filter(directory_listings::Column::BusinessId.eq(business_id))
        .filter(directory_listings::Column::Deleted.eq(0))
        .order_by(directory_listings::Column::GmtCreate, Order::Desc)
        .all(db)
        .await?;

    Ok(listings.into_iter().map(ListingView::from_model).collect())
}

/// Public directory search: published, non-deleted listings
///
/// Photos in the response are defensively re-gated by the owning
/// business's current tier.
pub async fn public_search(
    db: &DatabaseConnection,
    category: Option<&str>,
    city: Option<&str>,
    page_no: u64,
    page_size: u64,
) -> anyhow::Result<Page<ListingView>> {
    let mut query = directory_listings::Entity::find()
        .filter(directory_listings::Column::Published.eq(1))
        .filter(directory_listings::Column::Deleted.eq(0));

    if let Some(category) = category {
        query = query.filter(directory_listings::Column::Category.eq(category));
    }

    if let Some(city) = city {
        let business_ids: Vec<String> = businesses::Entity::find()
            .select_only()
            .column(businesses::Column::Id)
            .filter(businesses::Column::City.eq(city))
            .into_tuple::<String>()
            .all(db)
            .await?;

        if business_ids.is_empty() {
            return Ok(Page::default());
        }
        query = query.filter(directory_listings::Column::BusinessId.is_in(business_ids));
    }

    let total_count = query
        .clone()
        .select_only()
        .column_as(prelude::Expr::col(Asterisk).count(), "count")
        .into_tuple::<i64>()
        .one(db)
        .await?
        .unwrap_or_default() as u64;

    if total_count == 0 {
        return Ok(Page::default());
    }

    let offset = (page_no.saturating_sub(1)) * page_size;
    let models = query
        // featured listings float to the top
        .order_by(directory_listings::Column::Featured, Order::Desc)
        .order_by(directory_listings::Column::GmtModified, Order::Desc)
        .offset(offset)
        .limit(page_size)
        .all(db)
        .await?;

    let mut items = Vec::with_capacity(models.len());
    for m in models {
        let tier = businesses::Entity::find_by_id(&m.business_id)
            .one(db)
            .await?
            .map(|b| b.tier.parse().unwrap_or_default())
            .unwrap_or_default();

        let mut view = ListingView::from_model(m);
        view.photos = gate_photos(&view.photos, tier);
        items.push(view);
    }

    Ok(Page::new(total_count, page_no, page_size, items))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photos(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://cdn/p{}.jpg", i)).collect()
    }

    #[test]
    fn test_gate_photos_tier1() {
        let gated = gate_photos(&photos(8), Tier::Tier1);
        assert_eq!(gated.len(), 3);
        assert_eq!(gated[0], "https://cdn/p0.jpg");
    }

    #[test]
    fn test_gate_photos_tier2() {
        assert_eq!(gate_photos(&photos(8), Tier::Tier2).len(), 8);
        assert_eq!(gate_photos(&photos(15), Tier::Tier2).len(), 10);
    }

    #[test]
    fn test_gate_photos_tier3_unlimited() {
        assert_eq!(gate_photos(&photos(40), Tier::Tier3).len(), 40);
    }

    #[test]
    fn test_parse_photos_malformed() {
        assert!(parse_photos(None).is_empty());
        assert!(parse_photos(Some("not-json")).is_empty());
        assert_eq!(parse_photos(Some(r#"["a","b"]"#)), vec!["a", "b"]);
    }
}
