//! CRM lead service
//!
//! Status transitions are free-form among the five pipeline states;
//! no state machine is enforced.

use greenline_common::error::GreenLineError;
use greenline_persistence::Page;
use greenline_persistence::entity::crm_leads;
use sea_orm::sea_query::Asterisk;
use sea_orm::*;
use serde::Deserialize;

/// Fields accepted when creating a lead
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLead {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Fields accepted when updating a lead
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLead {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

/// Search filters for the lead list endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadSearch {
    pub status: Option<String>,
    pub keyword: Option<String>,
}

fn validate_status(status: &str) -> anyhow::Result<()> {
    if crm_leads::status::ALL.contains(&status) {
        Ok(())
    } else {
        Err(GreenLineError::IllegalArgument(format!("invalid lead status '{}'", status)).into())
    }
}

pub async fn create(
    db: &DatabaseConnection,
    business_id: &str,
    params: CreateLead,
) -> anyhow::Result<crm_leads::Model> {
    if params.name.trim().is_empty() {
        return Err(GreenLineError::IllegalArgument("name cannot be empty".to_string()).into());
    }

    let now = chrono::Utc::now().naive_utc();
    let entity = crm_leads::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        business_id: Set(business_id.to_string()),
        name: Set(params.name.trim().to_string()),
        email: Set(params.email),
        phone: Set(params.phone),
        source: Set(params.source),
        status: Set(crm_leads::status::NEW.to_string()),
        notes: Set(params.notes),
        metadata: Set(params.metadata.map(|m| m.to_string())),
        deleted: Set(0),
        gmt_create: Set(now),
        gmt_modified: Set(now),
    };

    let inserted = entity.insert(db).await?;
    Ok(inserted)
}

async fn find_owned(
    db: &DatabaseConnection,
    business_id: &str,
    lead_id: &str,
) -> anyhow::Result<crm_leads::Model> {
    crm_leads::Entity::find_by_id(lead_id)
        .filter(crm_leads::Column::BusinessId.eq(business_id))
        .filter(crm_leads::Column::Deleted.eq(0))
        .one(db)
        .await?
        .ok_or_else(|| GreenLineError::NotFound(format!("lead '{}'", lead_id)).into())
}

pub async fn get(
    db: &DatabaseConnection,
    business_id: &str,
    lead_id: &str,
) -> anyhow::Result<crm_leads::Model> {
    find_owned(db, business_id, lead_id).await
}

pub async fn update(
    db: &DatabaseConnection,
    business_id: &str,
    lead_id: &str,
    params: UpdateLead,
) -> anyhow::Result<crm_leads::Model> {
    if let Some(ref status) = params.status {
        validate_status(status)?;
    }

    let entity = find_owned(db, business_id, lead_id).await?;
    let mut lead: crm_leads::ActiveModel = entity.into();

    if let Some(name) = params.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(
                GreenLineError::IllegalArgument("name cannot be empty".to_string()).into(),
            );
        }
        lead.name = Set(name);
    }
    if let Some(email) = params.email {
        lead.email = Set(Some(email));
    }
    if let Some(phone) = params.phone {
        lead.phone = Set(Some(phone));
    }
    if let Some(status) = params.status {
        lead.status = Set(status);
    }
    if let Some(notes) = params.notes {
        lead.notes = Set(Some(notes));
    }
    if let Some(metadata) = params.metadata {
        lead.metadata = Set(Some(metadata.to_string()));
    }
    lead.gmt_modified = Set(chrono::Utc::now().naive_utc());

    let updated = lead.update(db).await?;
    Ok(updated)
}

/// Soft delete
pub async fn delete(
    db: &DatabaseConnection,
    business_id: &str,
    lead_id: &str,
) -> anyhow::Result<()> {
    let entity = find_owned(db, business_id, lead_id).await?;
    let mut lead: crm_leads::ActiveModel = entity.into();
    lead.deleted = Set(1);
    lead.gmt_modified = Set(chrono::Utc::now().naive_utc());
    lead.update(db).await?;
    Ok(())
}

pub async fn search_page(
    db: &DatabaseConnection,
    business_id: &str,
    search: &LeadSearch,
    page_no: u64,
    page_size: u64,
) -> anyhow::Result<Page<crm_leads::Model>> {
    let mut query = crm_leads::Entity::find()
        .filter(crm_leads::Column::BusinessId.eq(business_id))
        .filter(crm_leads::Column::Deleted.eq(0));

    if let Some(ref status) = search.status {
        validate_status(status)?;
        query = query.filter(crm_leads::Column::Status.eq(status));
    }
    if let Some(ref keyword) = search.keyword
        && !keyword.is_empty()
    {
        query = query.filter(
            Condition::any()
                .add(crm_leads::Column::Name.contains(keyword))
                .add(crm_leads::Column::Email.contains(keyword))
                .add(crm_leads::Column::Phone.contains(keyword)),
        );
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
    let page_items = query
        .order_by(crm_leads::Column::GmtCreate, Order::Desc)
        .offset(offset)
        .limit(page_size)
        .all(db)
        .await?;

    Ok(Page::new(total_count, page_no, page_size, page_items))
}

/// Leads created in the trailing window, for dashboard widgets
pub async fn count_recent(
    db: &DatabaseConnection,
    business_id: Option<&str>,
    days: i64,
) -> anyhow::Result<u64> {
    let cutoff = chrono::Utc::now().naive_utc() - chrono::Duration::days(days);

    let mut query = crm_leads::Entity::find()
        .filter(crm_leads::Column::Deleted.eq(0))
        .filter(crm_leads::Column::GmtCreate.gte(cutoff));

    if let Some(business) = business_id {
        query = query.filter(crm_leads::Column::BusinessId.eq(business));
    }

    Ok(query.count(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_status() {
        for status in crm_leads::status::ALL {
            assert!(validate_status(status).is_ok());
        }
        assert!(validate_status("pending").is_err());
        assert!(validate_status("").is_err());
    }
}
