//! Memory bucket context assembly
//!
//! Fetches a handful of rows from the four memory tables and
//! concatenates them into a prompt string. Prioritized reads only: no
//! consistency guarantees, no concurrency control, no eviction.

use greenline_common::error::GreenLineError;
use sea_orm::*;

use greenline_persistence::entity::{
    memory_conversations, memory_facts, memory_insights, memory_preferences,
};

/// Default character budget for an assembled context
pub const DEFAULT_BUDGET_CHARS: usize = 4000;

/// Rows kept per business in memory_conversations
pub const CONVERSATION_RETENTION: u64 = 50;

// Per-section row caps for assembly
const MAX_FACTS: u64 = 10;
const MAX_PREFERENCES: u64 = 5;
const MAX_INSIGHTS: u64 = 5;
const MAX_CONVERSATION_TURNS: u64 = 10;

/// One labeled context section in priority order
#[derive(Debug, Clone, PartialEq)]
pub struct ContextSection {
    pub label: &'static str,
    pub entries: Vec<String>,
}

/// Concatenate sections into a prompt, respecting the character budget
///
/// Sections are appended in the order given; an entry that would push
/// the prompt past the budget is dropped along with everything after it
/// in that section. Entries are never split.
pub fn compose(sections: &[ContextSection], budget_chars: usize) -> String {
    let mut prompt = String::new();
    let mut remaining = budget_chars;

    for section in sections {
        if section.entries.is_empty() {
            continue;
        }

        let header = format!("## {}\n", section.label);
        if header.len() > remaining {
            break;
        }

        let mut body = String::new();
        let mut used = header.len();
        for entry in &section.entries {
            let line = format!("- {}\n", entry);
            if used + line.len() > remaining {
                break;
            }
            used += line.len();
            body.push_str(&line);
        }

        // A header with no surviving entries is dropped entirely
        if body.is_empty() {
            break;
        }

        prompt.push_str(&header);
        prompt.push_str(&body);
        prompt.push('\n');
        remaining = remaining.saturating_sub(used + 1);
    }

    prompt
}

/// Fetch the four memory sections for a business in priority order
pub async fn fetch_sections(
    db: &DatabaseConnection,
    business_id: &str,
) -> anyhow::Result<Vec<ContextSection>> {
    let facts: Vec<String> = memory_facts::Entity::find()
        .filter(memory_facts::Column::BusinessId.eq(business_id))
        .order_by(memory_facts::Column::Priority, Order::Desc)
        .limit(MAX_FACTS)
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.content)
        .collect();

    let preferences: Vec<String> = memory_preferences::Entity::find()
        .filter(memory_preferences::Column::BusinessId.eq(business_id))
        .order_by(memory_preferences::Column::PrefKey, Order::Asc)
        .limit(MAX_PREFERENCES)
        .all(db)
        .await?
        .into_iter()
        .map(|m| format!("{}: {}", m.pref_key, m.pref_value))
        .collect();

    let insights: Vec<String> = memory_insights::Entity::find()
        .filter(memory_insights::Column::BusinessId.eq(business_id))
        .order_by(memory_insights::Column::Score, Order::Desc)
        .limit(MAX_INSIGHTS)
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.content)
        .collect();

    // Most recent turns, rendered oldest first
    let mut conversations: Vec<String> = memory_conversations::Entity::find()
        .filter(memory_conversations::Column::BusinessId.eq(business_id))
        .order_by(memory_conversations::Column::GmtCreate, Order::Desc)
        .limit(MAX_CONVERSATION_TURNS)
        .all(db)
        .await?
        .into_iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect();
    conversations.reverse();

    Ok(vec![
        ContextSection {
            label: "Business facts",
            entries: facts,
        },
        ContextSection {
            label: "Preferences",
            entries: preferences,
        },
        ContextSection {
            label: "Insights",
            entries: insights,
        },
        ContextSection {
            label: "Recent conversation",
            entries: conversations,
        },
    ])
}

/// Assemble the full context prompt for a business
pub async fn assemble_context(
    db: &DatabaseConnection,
    business_id: &str,
    budget_chars: usize,
) -> anyhow::Result<String> {
    let sections = fetch_sections(db, business_id).await?;
    Ok(compose(&sections, budget_chars))
}

// ---------------------------------------------------------------------------
// Write paths
// ---------------------------------------------------------------------------

pub async fn add_fact(
    db: &DatabaseConnection,
    business_id: &str,
    content: &str,
    priority: i32,
) -> anyhow::Result<memory_facts::Model> {
    if content.trim().is_empty() {
        return Err(GreenLineError::IllegalArgument("fact cannot be empty".to_string()).into());
    }

    let entity = memory_facts::ActiveModel {
        business_id: Set(business_id.to_string()),
        content: Set(content.trim().to_string()),
        priority: Set(priority),
        gmt_create: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    Ok(entity.insert(db).await?)
}

pub async fn delete_fact(db: &DatabaseConnection, business_id: &str, id: u64) -> anyhow::Result<()> {
    let Some(entity) = memory_facts::Entity::find_by_id(id)
        .filter(memory_facts::Column::BusinessId.eq(business_id))
        .one(db)
        .await?
    else {
        return Err(GreenLineError::NotFound(format!("memory fact '{}'", id)).into());
    };

    entity.delete(db).await?;
    Ok(())
}

pub async fn list_facts(
    db: &DatabaseConnection,
    business_id: &str,
) -> anyhow::Result<Vec<memory_facts::Model>> {
    let facts = memory_facts::Entity::find()
        .filter(memory_facts::Column::BusinessId.eq(business_id))
        .order_by(memory_facts::Column::Priority, Order::Desc)
        .all(db)
        .await?;
    Ok(facts)
}

/// Insert or replace a preference by key
pub async fn set_preference(
    db: &DatabaseConnection,
    business_id: &str,
    key: &str,
    value: &str,
) -> anyhow::Result<()> {
    if key.trim().is_empty() {
        return Err(
            GreenLineError::IllegalArgument("preference key cannot be empty".to_string()).into(),
        );
    }

    let existing = memory_preferences::Entity::find()
        .filter(memory_preferences::Column::BusinessId.eq(business_id))
        .filter(memory_preferences::Column::PrefKey.eq(key))
        .one(db)
        .await?;

    match existing {
        Some(entity) => {
            let mut pref: memory_preferences::ActiveModel = entity.into();
            pref.pref_value = Set(value.to_string());
            pref.update(db).await?;
        }
        None => {
            let entity = memory_preferences::ActiveModel {
                business_id: Set(business_id.to_string()),
                pref_key: Set(key.to_string()),
                pref_value: Set(value.to_string()),
                gmt_create: Set(chrono::Utc::now().naive_utc()),
                ..Default::default()
            };
            entity.insert(db).await?;
        }
    }

    Ok(())
}

pub async fn delete_preference(
    db: &DatabaseConnection,
    business_id: &str,
    key: &str,
) -> anyhow::Result<()> {
    let Some(entity) = memory_preferences::Entity::find()
        .filter(memory_preferences::Column::BusinessId.eq(business_id))
        .filter(memory_preferences::Column::PrefKey.eq(key))
        .one(db)
        .await?
    else {
        return Err(GreenLineError::NotFound(format!("preference '{}'", key)).into());
    };

    entity.delete(db).await?;
    Ok(())
}

pub async fn list_preferences(
    db: &DatabaseConnection,
    business_id: &str,
) -> anyhow::Result<Vec<memory_preferences::Model>> {
    let preferences = memory_preferences::Entity::find()
        .filter(memory_preferences::Column::BusinessId.eq(business_id))
        .order_by(memory_preferences::Column::PrefKey, Order::Asc)
        .all(db)
        .await?;
    Ok(preferences)
}

pub async fn add_insight(
    db: &DatabaseConnection,
    business_id: &str,
    content: &str,
    score: f64,
) -> anyhow::Result<()> {
    let entity = memory_insights::ActiveModel {
        business_id: Set(business_id.to_string()),
        content: Set(content.to_string()),
        score: Set(score),
        gmt_create: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };

    entity.insert(db).await?;
    Ok(())
}

/// Append a conversation turn and trim the per-business history
pub async fn append_conversation(
    db: &DatabaseConnection,
    business_id: &str,
    role: &str,
    content: &str,
) -> anyhow::Result<()> {
    let entity = memory_conversations::ActiveModel {
        business_id: Set(business_id.to_string()),
        role: Set(role.to_string()),
        content: Set(content.to_string()),
        gmt_create: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    };
    entity.insert(db).await?;

    // Trim: drop everything older than the newest CONVERSATION_RETENTION rows
    let keep_ids: Vec<u64> = memory_conversations::Entity::find()
        .select_only()
        .column(memory_conversations::Column::Id)
        .filter(memory_conversations::Column::BusinessId.eq(business_id))
        .order_by(memory_conversations::Column::Id, Order::Desc)
        .limit(CONVERSATION_RETENTION)
        .into_tuple::<u64>()
        .all(db)
        .await?;

    if keep_ids.len() as u64 == CONVERSATION_RETENTION {
        memory_conversations::Entity::delete_many()
            .filter(memory_conversations::Column::BusinessId.eq(business_id))
            .filter(memory_conversations::Column::Id.is_not_in(keep_ids))
            .exec(db)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(label: &'static str, entries: &[&str]) -> ContextSection {
        ContextSection {
            label,
            entries: entries.iter().map(|s| ToString::to_string(&s)).collect(),
        }
    }

    #[test]
    fn test_compose_orders_sections() {
        let sections = vec![
            section("Business facts", &["open 9-5", "family owned"]),
            section("Preferences", &["tone: friendly"]),
        ];
        let prompt = compose(&sections, DEFAULT_BUDGET_CHARS);

        let facts_pos = prompt.find("## Business facts").unwrap();
        let prefs_pos = prompt.find("## Preferences").unwrap();
        assert!(facts_pos < prefs_pos);
        assert!(prompt.contains("- open 9-5\n"));
        assert!(prompt.contains("- tone: friendly\n"));
    }

    #[test]
    fn test_compose_skips_empty_sections() {
        let sections = vec![
            section("Business facts", &[]),
            section("Preferences", &["tone: direct"]),
        ];
        let prompt = compose(&sections, DEFAULT_BUDGET_CHARS);
        assert!(!prompt.contains("Business facts"));
        assert!(prompt.contains("Preferences"));
    }

    #[test]
    fn test_compose_respects_budget() {
        let long_entry = "x".repeat(100);
        let sections = vec![section(
            "Business facts",
            &[long_entry.as_str(), long_entry.as_str(), long_entry.as_str()],
        )];

        // Room for the header plus roughly one entry
        let prompt = compose(&sections, 140);
        assert_eq!(prompt.matches("- x").count(), 1);
        assert!(prompt.len() <= 140 + 1); // trailing section newline
    }

    #[test]
    fn test_compose_never_splits_entries() {
        let sections = vec![section("Business facts", &["abcdefghij"])];
        // Budget fits the header but not the entry: nothing is emitted
        let prompt = compose(&sections, 20);
        assert!(prompt.is_empty());
    }

    #[test]
    fn test_compose_zero_budget() {
        let sections = vec![section("Business facts", &["fact"])];
        assert!(compose(&sections, 0).is_empty());
    }
}
