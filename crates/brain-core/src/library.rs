//! Read-side views over a user's cards and topics.
//!
//! List filtering, the kanban board, topic detail and dashboard counters.
//! Everything here works on snapshots already fetched from the repositories.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Card, CardStatus, Category, Topic};
use crate::topic_tree::TopicIndex;

/// Filter for the card list. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardFilter {
    /// Category to show; absent means all.
    pub category: Option<Category>,
    /// Case-insensitive substring over title and body.
    #[serde(rename = "q")]
    pub search: Option<String>,
}

impl CardFilter {
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    pub fn matches(&self, card: &Card) -> bool {
        self.matches_with(card, self.needle().as_deref())
    }

    fn matches_with(&self, card: &Card, needle: Option<&str>) -> bool {
        if self.category.is_some_and(|c| c != card.category) {
            return false;
        }
        match needle {
            None => true,
            Some(n) => {
                card.title.to_lowercase().contains(n) || card.body.to_lowercase().contains(n)
            }
        }
    }

    /// Keep matching cards, preserving order.
    pub fn apply(&self, cards: Vec<Card>) -> Vec<Card> {
        let needle = self.needle();
        cards
            .into_iter()
            .filter(|c| self.matches_with(c, needle.as_deref()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct KanbanColumn {
    pub category: Category,
    pub cards: Vec<Card>,
}

/// Cards grouped into one column per category.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct KanbanBoard {
    pub columns: Vec<KanbanColumn>,
}

impl KanbanBoard {
    /// Group cards by category. Every category gets a column, in canonical
    /// order, even when empty.
    pub fn from_cards(cards: Vec<Card>) -> Self {
        let mut columns: Vec<KanbanColumn> = Category::ALL
            .into_iter()
            .map(|category| KanbanColumn {
                category,
                cards: Vec::new(),
            })
            .collect();
        for card in cards {
            if let Some(column) = columns.iter_mut().find(|c| c.category == card.category) {
                column.cards.push(card);
            }
        }
        Self { columns }
    }

    pub fn column(&self, category: Category) -> Option<&KanbanColumn> {
        self.columns.iter().find(|c| c.category == category)
    }
}

/// Everything the topic page shows.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct TopicDetail {
    pub topic: Topic,
    /// Root first, ending with `topic`.
    pub breadcrumb: Vec<Topic>,
    pub children: Vec<Topic>,
    pub related: Vec<Topic>,
    pub linked_cards: Vec<Card>,
    /// Linked-card counts for the topic and its children.
    pub card_counts: HashMap<Uuid, usize>,
}

impl TopicDetail {
    pub fn build(index: &TopicIndex, id: Uuid, cards: &[Card]) -> Result<Self> {
        let topic = index.require(id)?.clone();
        let children: Vec<Topic> = index.children(id).into_iter().cloned().collect();

        let all_counts = index.card_counts(cards);
        let card_counts = std::iter::once(id)
            .chain(children.iter().map(|c| c.id))
            .filter_map(|tid| all_counts.get(&tid).map(|n| (tid, *n)))
            .collect();

        Ok(Self {
            breadcrumb: index.breadcrumb(id).into_iter().cloned().collect(),
            related: index.related(id).into_iter().cloned().collect(),
            linked_cards: cards.iter().filter(|c| c.is_linked_to(id)).cloned().collect(),
            children,
            card_counts,
            topic,
        })
    }
}

/// Dashboard counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, utoipa::ToSchema)]
pub struct DashboardStats {
    pub total_cards: usize,
    pub unprocessed_cards: usize,
    /// Count per category, every category present.
    pub by_category: Vec<CategoryCount>,
    pub total_topics: usize,
    pub root_topics: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct CategoryCount {
    pub category: Category,
    pub count: usize,
}

impl DashboardStats {
    pub fn compute(cards: &[Card], topics: &[Topic]) -> Self {
        let by_category = Category::ALL
            .into_iter()
            .map(|category| CategoryCount {
                category,
                count: cards.iter().filter(|c| c.category == category).count(),
            })
            .collect();
        Self {
            total_cards: cards.len(),
            unprocessed_cards: cards
                .iter()
                .filter(|c| c.status == CardStatus::Unprocessed)
                .count(),
            by_category,
            total_topics: topics.len(),
            root_topics: topics.iter().filter(|t| t.is_root()).count(),
        }
    }
}
