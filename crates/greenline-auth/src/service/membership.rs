//! Membership service
//!
//! Role lookups back every business-scoped authorization check, so
//! reads go through a short-lived cache keyed by username.

use std::sync::LazyLock;
use std::time::Duration;

use greenline_common::error::GreenLineError;
use greenline_persistence::entity::user_businesses;
use greenline_persistence::sea_orm::*;
use moka::sync::Cache;

use crate::model::{MembershipInfo, Role};

// Cache for user memberships with 5-minute TTL
static MEMBERSHIP_CACHE: LazyLock<Cache<String, Vec<MembershipInfo>>> = LazyLock::new(|| {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_live(Duration::from_secs(300))
        .build()
});

pub async fn find_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> anyhow::Result<Vec<MembershipInfo>> {
    if let Some(cached) = MEMBERSHIP_CACHE.get(username) {
        return Ok(cached);
    }

    let memberships: Vec<MembershipInfo> = user_businesses::Entity::find()
        .filter(user_businesses::Column::Username.eq(username))
        .all(db)
        .await?
        .iter()
        .map(MembershipInfo::from)
        .collect();

    MEMBERSHIP_CACHE.insert(username.to_owned(), memberships.clone());

    Ok(memberships)
}

/// Resolve the role a user holds within a business, if any
pub async fn find_role(
    db: &DatabaseConnection,
    username: &str,
    business_id: &str,
) -> anyhow::Result<Option<Role>> {
    let memberships = find_by_username(db, username).await?;

    Ok(memberships
        .iter()
        .find(|m| m.business_id == business_id)
        .map(|m| m.parsed_role()))
}

pub async fn find_by_business(
    db: &DatabaseConnection,
    business_id: &str,
) -> anyhow::Result<Vec<MembershipInfo>> {
    let memberships = user_businesses::Entity::find()
        .filter(user_businesses::Column::BusinessId.eq(business_id))
        .all(db)
        .await?
        .iter()
        .map(MembershipInfo::from)
        .collect();

    Ok(memberships)
}

pub async fn add(
    db: &DatabaseConnection,
    username: &str,
    business_id: &str,
    role: Role,
) -> anyhow::Result<()> {
    let existing = user_businesses::Entity::find()
        .filter(user_businesses::Column::Username.eq(username))
        .filter(user_businesses::Column::BusinessId.eq(business_id))
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(GreenLineError::Conflict(format!(
            "user '{}' is already a member of business '{}'",
            username, business_id
        ))
        .into());
    }

    let entity = user_businesses::ActiveModel {
        username: Set(username.to_string()),
        business_id: Set(business_id.to_string()),
        role: Set(role.as_str().to_string()),
        gmt_create: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    user_businesses::Entity::insert(entity).exec(db).await?;
    invalidate_membership_cache(username);

    Ok(())
}

/// Change a member's role
///
/// Demoting the last remaining owner is rejected.
pub async fn change_role(
    db: &DatabaseConnection,
    username: &str,
    business_id: &str,
    new_role: Role,
) -> anyhow::Result<()> {
    let Some(entity) = user_businesses::Entity::find()
        .filter(user_businesses::Column::Username.eq(username))
        .filter(user_businesses::Column::BusinessId.eq(business_id))
        .one(db)
        .await?
    else {
        return Err(GreenLineError::MembershipNotFound(
            username.to_string(),
            business_id.to_string(),
        )
        .into());
    };

    if entity.role == Role::Owner.as_str() && new_role < Role::Owner {
        let owners = count_owners(db, business_id).await?;
        if owners <= 1 {
            return Err(GreenLineError::Conflict(
                "business must keep at least one owner".to_string(),
            )
            .into());
        }
    }

    let mut membership: user_businesses::ActiveModel = entity.into();
    membership.role = Set(new_role.as_str().to_string());
    membership.update(db).await?;

    invalidate_membership_cache(username);

    Ok(())
}

/// Remove a membership
///
/// Removing the last remaining owner is rejected.
pub async fn remove(
    db: &DatabaseConnection,
    username: &str,
    business_id: &str,
) -> anyhow::Result<()> {
    let Some(entity) = user_businesses::Entity::find()
        .filter(user_businesses::Column::Username.eq(username))
        .filter(user_businesses::Column::BusinessId.eq(business_id))
        .one(db)
        .await?
    else {
        return Err(GreenLineError::MembershipNotFound(
            username.to_string(),
            business_id.to_string(),
        )
        .into());
    };

    if entity.role == Role::Owner.as_str() {
        let owners = count_owners(db, business_id).await?;
        if owners <= 1 {
            return Err(GreenLineError::Conflict(
                "business must keep at least one owner".to_string(),
            )
            .into());
        }
    }

    entity.delete(db).await?;
    invalidate_membership_cache(username);

    Ok(())
}

async fn count_owners(db: &DatabaseConnection, business_id: &str) -> anyhow::Result<u64> {
    let count = user_businesses::Entity::find()
        .filter(user_businesses::Column::BusinessId.eq(business_id))
        .filter(user_businesses::Column::Role.eq(Role::Owner.as_str()))
        .count(db)
        .await?;

    Ok(count)
}

/// Invalidate cache for a specific user
pub fn invalidate_membership_cache(username: &str) {
    MEMBERSHIP_CACHE.invalidate(username);
}

/// Invalidate all membership cache entries
pub fn invalidate_all_membership_cache() {
    MEMBERSHIP_CACHE.invalidate_all();
}
