//! First-run onboarding templates.

use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{NewTopic, Topic, UserProfile};
use crate::numbering::next_topic_number;
use crate::traits::{ProfileRepository, TopicRepository};

/// Starter topic sets offered on first login.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OnboardingTemplate {
    Blank,
    Pastor,
}

impl OnboardingTemplate {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Pastor => "pastor",
        }
    }

    /// `(title, emoji)` of the root topics this template creates.
    pub fn seed_topics(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Blank => &[],
            Self::Pastor => &[
                ("Biblical Theology", "✝️"),
                ("Expository Texts", "📖"),
                ("Pastoral Care", "🤝"),
                ("Church Leadership", "⛪"),
            ],
        }
    }
}

impl std::fmt::Display for OnboardingTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OnboardingTemplate {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "blank" => Ok(Self::Blank),
            "pastor" => Ok(Self::Pastor),
            _ => Err(Error::InvalidInput(format!("Unknown template: {}", s))),
        }
    }
}

/// Plan root inserts for a template after the roots that already exist.
///
/// Seeds whose title already names a root are skipped, so repeating an
/// interrupted onboarding does not duplicate them.
pub fn plan_seed_topics(template: OnboardingTemplate, existing: &[Topic]) -> Result<Vec<NewTopic>> {
    let roots: Vec<&Topic> = existing.iter().filter(|t| t.is_root()).collect();
    let mut numbers: Vec<String> = roots.iter().map(|t| t.number.clone()).collect();

    let mut planned = Vec::with_capacity(template.seed_topics().len());
    for (title, emoji) in template.seed_topics() {
        if roots.iter().any(|t| t.title == *title) {
            continue;
        }
        let number = next_topic_number(None, numbers.iter().map(String::as_str))?;
        numbers.push(number.clone());
        planned.push(NewTopic {
            number,
            title: title.to_string(),
            emoji: emoji.to_string(),
            level: 0,
            parent_id: None,
            related_topic_ids: vec![],
        });
    }
    Ok(planned)
}

/// Seed the template's topics and mark onboarding complete.
pub async fn complete_onboarding(
    topics: &dyn TopicRepository,
    profiles: &dyn ProfileRepository,
    user_id: Uuid,
    template: OnboardingTemplate,
) -> Result<UserProfile> {
    let existing = topics.list(user_id).await?;
    let seeds = plan_seed_topics(template, &existing)?;
    let seeded = if seeds.is_empty() {
        0
    } else {
        topics.insert_many(user_id, seeds).await?.len()
    };

    let profile = UserProfile {
        user_id,
        onboarding_complete: true,
        template: Some(template.as_str().to_string()),
    };
    profiles.upsert(&profile).await?;

    info!(
        subsystem = "api",
        component = "onboarding",
        op = "complete",
        user_id = %user_id,
        template = %template,
        result_count = seeded,
        "Onboarding complete"
    );
    Ok(profile)
}
