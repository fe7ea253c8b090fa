//! Marketing skill prompt loader
//!
//! Named system-prompt templates for the AI content tools. Embedded
//! defaults ship with the binary; an optional override directory lets
//! operators tune prompts without a rebuild.

use std::collections::HashMap;
use std::path::Path;

use greenline_common::error::GreenLineError;

const SOCIAL_POST: &str = "You are a social media copywriter for a local business. \
Write a short, energetic post for the requested platform. Keep it under 80 words, \
include one call to action, and never invent offers that were not provided.";

const REVIEW_REPLY: &str = "You are replying to a customer review on behalf of a local \
business owner. Thank the reviewer, address their specific points, and keep the tone \
professional and warm. Never offer compensation unless instructed.";

const PROMO_EMAIL: &str = "You are writing a promotional email for a local business. \
Produce a subject line and a short body with one clear offer and one call to action. \
Plain text only.";

const SEO_BLURB: &str = "You are writing a search-optimized business description. \
Produce two sentences that mention the business's services and city naturally. \
No keyword stuffing.";

/// Registry of marketing skill prompts
#[derive(Debug, Clone)]
pub struct SkillRegistry {
    skills: HashMap<String, String>,
}

impl Default for SkillRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SkillRegistry {
    /// Registry with the embedded default skills
    pub fn new() -> Self {
        let mut skills = HashMap::new();
        skills.insert("social_post".to_string(), SOCIAL_POST.to_string());
        skills.insert("review_reply".to_string(), REVIEW_REPLY.to_string());
        skills.insert("promo_email".to_string(), PROMO_EMAIL.to_string());
        skills.insert("seo_blurb".to_string(), SEO_BLURB.to_string());
        Self { skills }
    }

    /// Load `.txt` files from an override directory on top of the defaults
    ///
    /// The file stem becomes the skill name. Unreadable files are
    /// skipped with a warning.
    pub fn with_overrides(dir: &Path) -> Self {
        let mut registry = Self::new();

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Skill override directory unreadable: {}", e);
                return registry;
            }
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match std::fs::read_to_string(&path) {
                Ok(content) => {
                    let content = content.trim().to_string();
                    if !content.is_empty() {
                        registry.skills.insert(name.to_string(), content);
                    }
                }
                Err(e) => {
                    tracing::warn!(skill = name, "Failed to read skill override: {}", e);
                }
            }
        }

        registry
    }

    pub fn get(&self, name: &str) -> Result<&str, GreenLineError> {
        self.skills
            .get(name)
            .map(|s| s.as_str())
            .ok_or_else(|| GreenLineError::SkillNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.skills.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_skills_present() {
        let registry = SkillRegistry::new();
        assert!(registry.get("social_post").is_ok());
        assert!(registry.get("review_reply").is_ok());
        assert!(registry.get("promo_email").is_ok());
        assert!(registry.get("seo_blurb").is_ok());
    }

    #[test]
    fn test_unknown_skill() {
        let registry = SkillRegistry::new();
        assert!(matches!(
            registry.get("press_release"),
            Err(GreenLineError::SkillNotFound(_))
        ));
    }

    #[test]
    fn test_names_sorted() {
        let names = SkillRegistry::new().names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn test_overrides_missing_dir_falls_back() {
        let registry = SkillRegistry::with_overrides(Path::new("/nonexistent/skills"));
        assert_eq!(registry.names().len(), 4);
    }
}
