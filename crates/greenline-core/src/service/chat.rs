//! AI chat orchestration
//!
//! Assemble memory context, layer the requested marketing skill on top,
//! delegate to the LLM, and persist both turns. No retries; an upstream
//! failure surfaces as an error for the handler to map.

use greenline_common::error::GreenLineError;
use greenline_integrations::llm::{ChatMessage, LlmClient};
use greenline_persistence::entity::platform_events;
use sea_orm::DatabaseConnection;

use super::{events, memory, skills::SkillRegistry};

/// Outcome of one chat exchange
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply: String,
    pub model: String,
    pub skill: Option<String>,
    pub context_chars: usize,
}

/// Build the system prompt from skill and memory context
pub fn build_system_prompt(skill_prompt: Option<&str>, context: &str) -> String {
    let mut prompt = String::new();

    match skill_prompt {
        Some(skill) => prompt.push_str(skill),
        None => prompt.push_str(
            "You are the AI assistant for a local business using GreenLine365. \
             Be concise and practical.",
        ),
    }

    if !context.is_empty() {
        prompt.push_str("\n\nWhat you know about this business:\n\n");
        prompt.push_str(context);
    }

    prompt
}

/// Run one chat turn for a business
pub async fn run_chat(
    db: &DatabaseConnection,
    llm: &LlmClient,
    skills: &SkillRegistry,
    business_id: &str,
    username: &str,
    skill_name: Option<&str>,
    user_message: &str,
) -> anyhow::Result<ChatReply> {
    if user_message.trim().is_empty() {
        return Err(GreenLineError::IllegalArgument("message cannot be empty".to_string()).into());
    }

    let skill_prompt = match skill_name {
        Some(name) => Some(skills.get(name)?.to_string()),
        None => None,
    };

    let context = memory::assemble_context(db, business_id, memory::DEFAULT_BUDGET_CHARS).await?;

    let messages = vec![
        ChatMessage::system(build_system_prompt(skill_prompt.as_deref(), &context)),
        ChatMessage::user(user_message),
    ];

    let reply = llm
        .chat(&messages)
        .await
        .map_err(|e| GreenLineError::UpstreamError(e.to_string()))?;

    // Persist both turns; trimming happens inside append_conversation
    memory::append_conversation(db, business_id, "user", user_message).await?;
    memory::append_conversation(db, business_id, "assistant", &reply).await?;

    events::record_best_effort(
        db,
        platform_events::event_type::CHAT_COMPLETED,
        Some(business_id),
        username,
        Some(&serde_json::json!({
            "skill": skill_name,
            "replyChars": reply.len(),
        })),
    )
    .await;

    Ok(ChatReply {
        reply,
        model: llm.model().to_string(),
        skill: skill_name.map(|s| s.to_string()),
        context_chars: context.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_system_prompt_default() {
        let prompt = build_system_prompt(None, "");
        assert!(prompt.contains("GreenLine365"));
        assert!(!prompt.contains("What you know"));
    }

    #[test]
    fn test_build_system_prompt_with_skill_and_context() {
        let prompt = build_system_prompt(Some("You write social posts."), "## Business facts\n- open 9-5\n");
        assert!(prompt.starts_with("You write social posts."));
        assert!(prompt.contains("What you know about this business:"));
        assert!(prompt.contains("- open 9-5"));
    }
}
