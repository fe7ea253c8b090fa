//! Poll service
//!
//! Options and vote counts live in the row's JSON blob; votes are a
//! read-modify-write keyed by primary id.

use greenline_common::error::GreenLineError;
use greenline_persistence::entity::polls::{self, status};
use sea_orm::*;
use serde::{Deserialize, Serialize};

/// Maximum options per poll
pub const MAX_OPTIONS: usize = 10;

/// One poll option inside the JSON blob
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    pub id: String,
    pub label: String,
    pub votes: u64,
}

/// Poll shape returned by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollView {
    pub id: String,
    pub business_id: String,
    pub question: String,
    pub options: Vec<PollOption>,
    pub status: String,
    pub total_votes: u64,
}

fn parse_options(raw: &str) -> anyhow::Result<Vec<PollOption>> {
    serde_json::from_str(raw)
        .map_err(|e| GreenLineError::InternalError(format!("corrupt poll options: {}", e)).into())
}

fn to_view(model: polls::Model) -> anyhow::Result<PollView> {
    let options = parse_options(&model.options)?;
    let total_votes = options.iter().map(|o| o.votes).sum();
    Ok(PollView {
        id: model.id,
        business_id: model.business_id,
        question: model.question,
        options,
        status: model.status,
        total_votes,
    })
}

pub async fn create(
    db: &DatabaseConnection,
    business_id: &str,
    question: &str,
    labels: Vec<String>,
) -> anyhow::Result<PollView> {
    if question.trim().is_empty() {
        return Err(GreenLineError::IllegalArgument("question cannot be empty".to_string()).into());
    }

    let labels: Vec<String> = labels
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    if labels.len() < 2 {
        return Err(
            GreenLineError::IllegalArgument("a poll needs at least two options".to_string()).into(),
        );
    }
    if labels.len() > MAX_OPTIONS {
        return Err(GreenLineError::IllegalArgument(format!(
            "a poll supports at most {} options",
            MAX_OPTIONS
        ))
        .into());
    }

    let options: Vec<PollOption> = labels
        .into_iter()
        .map(|label| PollOption {
            id: uuid::Uuid::new_v4().to_string(),
            label,
            votes: 0,
        })
        .collect();

    let now = chrono::Utc::now().naive_utc();
    let entity = polls::ActiveModel {
        id: Set(uuid::Uuid::new_v4().to_string()),
        business_id: Set(business_id.to_string()),
        question: Set(question.trim().to_string()),
        options: Set(serde_json::to_string(&options)?),
        status: Set(status::OPEN.to_string()),
        gmt_create: Set(now),
        gmt_modified: Set(now),
    };

    to_view(entity.insert(db).await?)
}

async fn find_owned(
    db: &DatabaseConnection,
    business_id: &str,
    poll_id: &str,
) -> anyhow::Result<polls::Model> {
    polls::Entity::find_by_id(poll_id)
        .filter(polls::Column::BusinessId.eq(business_id))
        .one(db)
        .await?
        .ok_or_else(|| GreenLineError::NotFound(format!("poll '{}'", poll_id)).into())
}

pub async fn get(
    db: &DatabaseConnection,
    business_id: &str,
    poll_id: &str,
) -> anyhow::Result<PollView> {
    to_view(find_owned(db, business_id, poll_id).await?)
}

pub async fn list_by_business(
    db: &DatabaseConnection,
    business_id: &str,
) -> anyhow::Result<Vec<PollView>> {
    let models = polls::Entity::find()
        .filter(polls::Column::BusinessId.eq(business_id))
        .order_by(polls::Column::GmtCreate, Order::Desc)
        .all(db)
        .await?;

    models.into_iter().map(to_view).collect()
}

/// Record one public vote
///
/// Read-modify-write of the options blob: the poll must be open and the
/// option must exist.
pub async fn vote(db: &DatabaseConnection, poll_id: &str, option_id: &str) -> anyhow::Result<PollView> {
    let Some(model) = polls::Entity::find_by_id(poll_id).one(db).await? else {
        return Err(GreenLineError::NotFound(format!("poll '{}'", poll_id)).into());
    };

    if model.status != status::OPEN {
        return Err(GreenLineError::IllegalArgument("poll is closed".to_string()).into());
    }

    let mut options = parse_options(&model.options)?;
    let Some(option) = options.iter_mut().find(|o| o.id == option_id) else {
        return Err(GreenLineError::NotFound(format!("poll option '{}'", option_id)).into());
    };
    option.votes += 1;

    let serialized = serde_json::to_string(&options)?;
    let mut poll: polls::ActiveModel = model.into();
    poll.options = Set(serialized);
    poll.gmt_modified = Set(chrono::Utc::now().naive_utc());

    to_view(poll.update(db).await?)
}

pub async fn set_status(
    db: &DatabaseConnection,
    business_id: &str,
    poll_id: &str,
    new_status: &str,
) -> anyhow::Result<()> {
    if new_status != status::OPEN && new_status != status::CLOSED {
        return Err(
            GreenLineError::IllegalArgument(format!("invalid poll status '{}'", new_status)).into(),
        );
    }

    let model = find_owned(db, business_id, poll_id).await?;
    let mut poll: polls::ActiveModel = model.into();
    poll.status = Set(new_status.to_string());
    poll.gmt_modified = Set(chrono::Utc::now().naive_utc());
    poll.update(db).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_roundtrip() {
        let options = vec![
            PollOption {
                id: "a".to_string(),
                label: "Mornings".to_string(),
                votes: 3,
            },
            PollOption {
                id: "b".to_string(),
                label: "Evenings".to_string(),
                votes: 5,
            },
        ];
        let raw = serde_json::to_string(&options).unwrap();
        assert_eq!(parse_options(&raw).unwrap(), options);
    }

    #[test]
    fn test_parse_options_corrupt() {
        assert!(parse_options("{not json").is_err());
    }

    #[test]
    fn test_view_totals() {
        let now = chrono::DateTime::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .naive_utc();
        let model = polls::Model {
            id: "p1".to_string(),
            business_id: "biz-1".to_string(),
            question: "Best time?".to_string(),
            options: r#"[{"id":"a","label":"AM","votes":2},{"id":"b","label":"PM","votes":7}]"#
                .to_string(),
            status: status::OPEN.to_string(),
            gmt_create: now,
            gmt_modified: now,
        };
        let view = to_view(model).unwrap();
        assert_eq!(view.total_votes, 9);
        assert_eq!(view.options.len(), 2);
    }
}
