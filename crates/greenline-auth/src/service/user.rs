//! User service

use greenline_common::error::GreenLineError;
use greenline_persistence::Page;
use greenline_persistence::entity::profiles;
use greenline_persistence::sea_orm::sea_query::Asterisk;
use greenline_persistence::sea_orm::*;

use crate::model::User;

pub async fn find_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> anyhow::Result<Option<profiles::Model>> {
    let user = profiles::Entity::find()
        .filter(profiles::Column::Username.eq(username))
        .one(db)
        .await?;

    Ok(user)
}

/// Verify a username/password pair against the stored bcrypt hash
pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> anyhow::Result<Option<User>> {
    let Some(profile) = find_by_username(db, username).await? else {
        return Ok(None);
    };

    if profile.enabled == 0 {
        return Ok(None);
    }

    let matched = bcrypt::verify(password, &profile.password).unwrap_or(false);
    if matched {
        Ok(Some(User::from(profile)))
    } else {
        Ok(None)
    }
}

pub async fn search_page(
    db: &DatabaseConnection,
    username: &str,
    page_no: u64,
    page_size: u64,
    accurate: bool,
) -> anyhow::Result<Page<User>> {
    let mut count_select = profiles::Entity::find();
    let mut query_select = profiles::Entity::find();

    if !username.is_empty() {
        if accurate {
            count_select = count_select.filter(profiles::Column::Username.eq(username));
            query_select = query_select.filter(profiles::Column::Username.eq(username));
        } else {
            count_select = count_select.filter(profiles::Column::Username.contains(username));
            query_select = query_select.filter(profiles::Column::Username.contains(username));
        }
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
            .offset(offset)
            .limit(page_size)
            .all(db)
            .await?
            .into_iter()
            .map(User::from)
            .collect();

        return Ok(Page::<User>::new(
            total_count,
            page_no,
            page_size,
            page_items,
        ));
    }

    Ok(Page::<User>::default())
}

pub async fn create(
    db: &DatabaseConnection,
    username: &str,
    email: &str,
    password: &str,
    display_name: Option<String>,
) -> anyhow::Result<()> {
    let hashed_password = bcrypt::hash(password, 10u32)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    let entity = profiles::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password: Set(hashed_password),
        display_name: Set(display_name),
        global_admin: Set(0),
        enabled: Set(1),
        gmt_create: Set(chrono::Utc::now().naive_utc()),
    };

    profiles::Entity::insert(entity).exec(db).await?;

    Ok(())
}

pub async fn update_password(
    db: &DatabaseConnection,
    username: &str,
    new_password: &str,
) -> anyhow::Result<()> {
    match profiles::Entity::find_by_id(username).one(db).await? {
        Some(entity) => {
            let mut user: profiles::ActiveModel = entity.into();

            let hashed_password = bcrypt::hash(new_password, 10u32)
                .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
            user.password = Set(hashed_password);

            user.update(db).await?;

            Ok(())
        }
        None => Err(GreenLineError::UserNotExist(username.to_string()).into()),
    }
}

pub async fn delete(db: &DatabaseConnection, username: &str) -> anyhow::Result<()> {
    match profiles::Entity::find_by_id(username).one(db).await? {
        Some(entity) => {
            entity.delete(db).await?;
            Ok(())
        }
        None => Err(GreenLineError::UserNotExist(username.to_string()).into()),
    }
}
