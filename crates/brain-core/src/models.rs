//! Domain models for second-brain.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

// =============================================================================
// CARD ENUMS
// =============================================================================

/// Coarse bucket a card lives in.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
pub enum Category {
    #[default]
    Unprocessed,
    Studies,
    Rules,
    Articles,
    Courses,
    #[serde(rename = "Literature I Love")]
    LiteratureILove,
}

impl Category {
    /// All categories in display order (kanban columns, filter pills).
    pub const ALL: [Category; 6] = [
        Category::Unprocessed,
        Category::Studies,
        Category::Rules,
        Category::Articles,
        Category::Courses,
        Category::LiteratureILove,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unprocessed => "Unprocessed",
            Self::Studies => "Studies",
            Self::Rules => "Rules",
            Self::Articles => "Articles",
            Self::Courses => "Courses",
            Self::LiteratureILove => "Literature I Love",
        }
    }

    /// Status a card in this category must carry.
    pub fn implied_status(&self) -> CardStatus {
        match self {
            Self::Unprocessed => CardStatus::Unprocessed,
            _ => CardStatus::Processed,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid category: {}", s))
    }
}

/// Processing status of a card. Always derived from its category on write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum CardStatus {
    #[default]
    Unprocessed,
    Processed,
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unprocessed => "Unprocessed",
            Self::Processed => "Processed",
        }
    }
}

impl std::fmt::Display for CardStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CardStatus {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unprocessed" => Ok(Self::Unprocessed),
            "processed" => Ok(Self::Processed),
            _ => Err(format!("Invalid card status: {}", s)),
        }
    }
}

/// Where the content of a card came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub enum SourceType {
    #[default]
    Note,
    Book,
    Article,
    Podcast,
    YouTube,
    #[serde(rename = "URL")]
    Url,
    Course,
    Other,
}

impl SourceType {
    pub const ALL: [SourceType; 8] = [
        SourceType::Note,
        SourceType::Book,
        SourceType::Article,
        SourceType::Podcast,
        SourceType::YouTube,
        SourceType::Url,
        SourceType::Course,
        SourceType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Note => "Note",
            Self::Book => "Book",
            Self::Article => "Article",
            Self::Podcast => "Podcast",
            Self::YouTube => "YouTube",
            Self::Url => "URL",
            Self::Course => "Course",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SourceType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Invalid source type: {}", s))
    }
}

// =============================================================================
// CARD TYPES
// =============================================================================

/// An atomic captured note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Card {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub body: String,
    pub category: Category,
    pub status: CardStatus,
    pub source_type: SourceType,
    pub source_title: Option<String>,
    pub source_url: Option<String>,
    pub scripture: Option<String>,
    /// Topics this card is filed under (membership only).
    #[serde(default)]
    pub connected_topic_ids: Vec<Uuid>,
    pub created_at_utc: DateTime<Utc>,
}

impl Card {
    /// Whether this card is filed under the given topic.
    pub fn is_linked_to(&self, topic_id: Uuid) -> bool {
        self.connected_topic_ids.contains(&topic_id)
    }
}

/// Writable card fields, used for both create and update.
///
/// A client-supplied status is not part of the input: status is always
/// recomputed from the category when the card is written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CardInput {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub source_type: SourceType,
    #[serde(default)]
    pub source_title: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub scripture: Option<String>,
    #[serde(default)]
    pub connected_topic_ids: Vec<Uuid>,
}

impl CardInput {
    /// Status the stored card will carry.
    pub fn status(&self) -> CardStatus {
        self.category.implied_status()
    }

    /// Validate and normalize for storage.
    ///
    /// Trims the title, turns blank optional strings into `None`, and drops
    /// duplicate topic ids while keeping first occurrence order.
    pub fn normalized(mut self) -> Result<Self> {
        self.title = self.title.trim().to_string();
        if self.title.is_empty() {
            return Err(Error::InvalidInput("Card title is required".to_string()));
        }
        self.source_title = non_blank(self.source_title);
        self.source_url = non_blank(self.source_url);
        self.scripture = non_blank(self.scripture);

        let mut seen = std::collections::HashSet::new();
        self.connected_topic_ids.retain(|id| seen.insert(*id));
        Ok(self)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// TOPIC TYPES
// =============================================================================

/// A node in the user's knowledge tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Topic {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Hierarchical code, e.g. `1a2`. Assigned once at creation.
    pub number: String,
    pub title: String,
    #[serde(default)]
    pub emoji: String,
    /// Depth in the tree (root = 0).
    pub level: i32,
    /// Parent topic (None = root)
    pub parent_id: Option<Uuid>,
    /// Related topics, stored one-directionally.
    #[serde(default)]
    pub related_topic_ids: Vec<Uuid>,
    pub created_at_utc: DateTime<Utc>,
}

impl Topic {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// `"<number> <title>"`, the label used in pickers and breadcrumbs.
    pub fn label(&self) -> String {
        format!("{} {}", self.number, self.title)
    }
}

/// A fully planned topic insert. Number and level are computed server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NewTopic {
    pub number: String,
    pub title: String,
    pub emoji: String,
    pub level: i32,
    pub parent_id: Option<Uuid>,
    pub related_topic_ids: Vec<Uuid>,
}

/// Editable topic fields. Number, level and parent never change after creation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TopicChanges {
    pub title: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub related_topic_ids: Vec<Uuid>,
}

// =============================================================================
// PROFILE TYPES
// =============================================================================

/// Per-user onboarding state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub onboarding_complete: bool,
    pub template: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_display_names() {
        let json = serde_json::to_string(&Category::LiteratureILove).unwrap();
        assert_eq!(json, "\"Literature I Love\"");
        let parsed: Category = serde_json::from_str("\"Rules\"").unwrap();
        assert_eq!(parsed, Category::Rules);
    }

    #[test]
    fn test_category_implied_status() {
        assert_eq!(Category::Rules.implied_status(), CardStatus::Processed);
        assert_eq!(
            Category::Unprocessed.implied_status(),
            CardStatus::Unprocessed
        );
        for category in Category::ALL.into_iter().skip(1) {
            assert_eq!(category.implied_status(), CardStatus::Processed);
        }
    }

    #[test]
    fn test_category_from_str_is_case_insensitive() {
        assert_eq!(
            "literature i love".parse::<Category>().unwrap(),
            Category::LiteratureILove
        );
        assert!("Poetry".parse::<Category>().is_err());
    }

    #[test]
    fn test_source_type_url_wire_name() {
        assert_eq!(serde_json::to_string(&SourceType::Url).unwrap(), "\"URL\"");
        assert_eq!("youtube".parse::<SourceType>().unwrap(), SourceType::YouTube);
    }

    #[test]
    fn test_card_input_normalized_trims_and_dedupes() {
        let topic = Uuid::new_v4();
        let input = CardInput {
            title: "  Grace  ".to_string(),
            source_title: Some("   ".to_string()),
            scripture: Some(" Eph 2:8 ".to_string()),
            connected_topic_ids: vec![topic, topic],
            ..Default::default()
        }
        .normalized()
        .unwrap();

        assert_eq!(input.title, "Grace");
        assert_eq!(input.source_title, None);
        assert_eq!(input.scripture.as_deref(), Some("Eph 2:8"));
        assert_eq!(input.connected_topic_ids, vec![topic]);
    }

    #[test]
    fn test_card_input_blank_title_rejected() {
        let err = CardInput {
            title: "   ".to_string(),
            ..Default::default()
        }
        .normalized()
        .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_card_input_ignores_client_status() {
        let json = r#"{"title":"t","category":"Rules","status":"Unprocessed"}"#;
        let input: CardInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.status(), CardStatus::Processed);
    }

    #[test]
    fn test_topic_label() {
        let topic = Topic {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            number: "1a".to_string(),
            title: "Grace".to_string(),
            emoji: String::new(),
            level: 1,
            parent_id: Some(Uuid::new_v4()),
            related_topic_ids: vec![],
            created_at_utc: Utc::now(),
        };
        assert_eq!(topic.label(), "1a Grace");
        assert!(!topic.is_root());
    }
}
