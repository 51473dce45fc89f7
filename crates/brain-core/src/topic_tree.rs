//! Adjacency index over a snapshot of a user's topics.
//!
//! Built once per fetched snapshot so that children lookups, breadcrumbs
//! and cascade closures don't rescan the full topic list.

use std::collections::{HashMap, HashSet, VecDeque};

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{Card, Topic};
use crate::numbering::{next_topic_number, ParentRef};

/// Parent → children index over a topic snapshot.
#[derive(Debug, Clone, Default)]
pub struct TopicIndex {
    topics: Vec<Topic>,
    by_id: HashMap<Uuid, usize>,
    /// Children per parent, in snapshot order. `None` holds the roots.
    children: HashMap<Option<Uuid>, Vec<usize>>,
}

impl TopicIndex {
    /// Build the index. Snapshot order (number ascending from the
    /// repository) is preserved in every listing.
    pub fn new(topics: Vec<Topic>) -> Self {
        let mut by_id = HashMap::with_capacity(topics.len());
        let mut children: HashMap<Option<Uuid>, Vec<usize>> = HashMap::new();
        for (i, topic) in topics.iter().enumerate() {
            by_id.insert(topic.id, i);
            children.entry(topic.parent_id).or_default().push(i);
        }
        Self {
            topics,
            by_id,
            children,
        }
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn get(&self, id: Uuid) -> Option<&Topic> {
        self.by_id.get(&id).map(|&i| &self.topics[i])
    }

    /// Fetch a topic or fail with [`Error::TopicNotFound`].
    pub fn require(&self, id: Uuid) -> Result<&Topic> {
        self.get(id).ok_or(Error::TopicNotFound(id))
    }

    pub fn roots(&self) -> Vec<&Topic> {
        self.children_of(None)
    }

    pub fn children(&self, id: Uuid) -> Vec<&Topic> {
        self.children_of(Some(id))
    }

    fn children_of(&self, parent: Option<Uuid>) -> Vec<&Topic> {
        self.children
            .get(&parent)
            .map(|ids| ids.iter().map(|&i| &self.topics[i]).collect())
            .unwrap_or_default()
    }

    /// Path from the root down to `id`, inclusive. Empty if `id` is unknown.
    ///
    /// Stops at a missing parent or a repeated node, so inconsistent parent
    /// references cannot loop forever.
    pub fn breadcrumb(&self, id: Uuid) -> Vec<&Topic> {
        let mut path = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.get(id);
        while let Some(topic) = current {
            if !seen.insert(topic.id) {
                break;
            }
            path.push(topic);
            current = topic.parent_id.and_then(|p| self.get(p));
        }
        path.reverse();
        path
    }

    /// `id` followed by all of its descendants, breadth first.
    ///
    /// This is the set removed by a cascade delete. Unknown ids yield just
    /// `[id]` so the caller can still issue the delete.
    pub fn descendants_inclusive(&self, id: Uuid) -> Vec<Uuid> {
        let mut out = vec![id];
        let mut seen = HashSet::from([id]);
        let mut queue = VecDeque::from([id]);
        while let Some(current) = queue.pop_front() {
            for child in self.children(current) {
                if seen.insert(child.id) {
                    tracing::trace!(topic_id = %child.id, parent_id = %current, "Cascade child");
                    out.push(child.id);
                    queue.push_back(child.id);
                }
            }
        }
        out
    }

    /// Related topics that still exist, in the order they were linked.
    pub fn related(&self, id: Uuid) -> Vec<&Topic> {
        self.get(id)
            .map(|t| {
                t.related_topic_ids
                    .iter()
                    .filter_map(|r| self.get(*r))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Plan the number and level for a new topic under `parent_id`.
    pub fn plan_child(&self, parent_id: Option<Uuid>) -> Result<(String, i32)> {
        let siblings = self
            .children_of(parent_id)
            .into_iter()
            .map(|t| t.number.as_str());

        match parent_id {
            None => Ok((next_topic_number(None, siblings)?, 0)),
            Some(pid) => {
                let parent = self.require(pid)?;
                let number = next_topic_number(
                    Some(ParentRef {
                        number: &parent.number,
                        level: parent.level,
                    }),
                    siblings,
                )?;
                Ok((number, parent.level + 1))
            }
        }
    }

    /// Number of cards linked to each topic. Topics without cards are absent.
    pub fn card_counts(&self, cards: &[Card]) -> HashMap<Uuid, usize> {
        let mut counts = HashMap::new();
        for card in cards {
            for topic_id in &card.connected_topic_ids {
                if self.by_id.contains_key(topic_id) {
                    *counts.entry(*topic_id).or_insert(0) += 1;
                }
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn topic(number: &str, level: i32, parent: Option<&Topic>) -> Topic {
        Topic {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            number: number.to_string(),
            title: format!("Topic {}", number),
            emoji: String::new(),
            level,
            parent_id: parent.map(|p| p.id),
            related_topic_ids: vec![],
            created_at_utc: Utc::now(),
        }
    }

    /// root(1) -> a(1a), b(1b); a -> g(1a1); plus an unrelated root 2.
    fn sample() -> (TopicIndex, Vec<Topic>) {
        let root = topic("1", 0, None);
        let a = topic("1a", 1, Some(&root));
        let b = topic("1b", 1, Some(&root));
        let g = topic("1a1", 2, Some(&a));
        let other = topic("2", 0, None);
        let all = vec![root, a, b, g, other];
        (TopicIndex::new(all.clone()), all)
    }

    #[test]
    fn test_roots_and_children() {
        let (index, all) = sample();
        let roots: Vec<_> = index.roots().iter().map(|t| t.number.clone()).collect();
        assert_eq!(roots, vec!["1", "2"]);
        let kids: Vec<_> = index
            .children(all[0].id)
            .iter()
            .map(|t| t.number.clone())
            .collect();
        assert_eq!(kids, vec!["1a", "1b"]);
        assert!(index.children(all[3].id).is_empty());
    }

    #[test]
    fn test_cascade_covers_two_children_and_grandchild() {
        let (index, all) = sample();
        let removed = index.descendants_inclusive(all[0].id);
        assert_eq!(removed.len(), 4);
        assert_eq!(removed[0], all[0].id);
        assert!(!removed.contains(&all[4].id));
    }

    #[test]
    fn test_cascade_of_leaf_is_itself() {
        let (index, all) = sample();
        assert_eq!(index.descendants_inclusive(all[3].id), vec![all[3].id]);
    }

    #[test]
    fn test_cascade_terminates_on_cycle() {
        let mut a = topic("1", 0, None);
        let b = topic("1a", 1, Some(&a));
        a.parent_id = Some(b.id);
        let index = TopicIndex::new(vec![a.clone(), b.clone()]);
        let removed = index.descendants_inclusive(a.id);
        assert_eq!(removed.len(), 2);
    }

    #[test]
    fn test_breadcrumb_root_first() {
        let (index, all) = sample();
        let path: Vec<_> = index
            .breadcrumb(all[3].id)
            .iter()
            .map(|t| t.number.clone())
            .collect();
        assert_eq!(path, vec!["1", "1a", "1a1"]);
        assert!(index.breadcrumb(Uuid::new_v4()).is_empty());
    }

    #[test]
    fn test_breadcrumb_terminates_on_cycle() {
        let mut a = topic("1", 0, None);
        let b = topic("1a", 1, Some(&a));
        a.parent_id = Some(b.id);
        let index = TopicIndex::new(vec![a.clone(), b.clone()]);
        assert_eq!(index.breadcrumb(b.id).len(), 2);
    }

    #[test]
    fn test_plan_child_numbers() {
        let (index, all) = sample();
        assert_eq!(index.plan_child(None).unwrap(), ("3".to_string(), 0));
        assert_eq!(
            index.plan_child(Some(all[0].id)).unwrap(),
            ("1c".to_string(), 1)
        );
        assert_eq!(
            index.plan_child(Some(all[1].id)).unwrap(),
            ("1a2".to_string(), 2)
        );
        assert_eq!(
            index.plan_child(Some(all[2].id)).unwrap(),
            ("1b1".to_string(), 2)
        );
    }

    #[test]
    fn test_plan_child_unknown_parent() {
        let (index, _) = sample();
        let missing = Uuid::new_v4();
        assert!(matches!(
            index.plan_child(Some(missing)),
            Err(Error::TopicNotFound(id)) if id == missing
        ));
    }

    #[test]
    fn test_related_skips_missing_topics() {
        let (_, mut all) = sample();
        let target = all[4].id;
        all[0].related_topic_ids = vec![target, Uuid::new_v4()];
        let index = TopicIndex::new(all.clone());
        let related = index.related(all[0].id);
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].id, target);
        // one-directional: the target does not point back
        assert!(index.related(target).is_empty());
    }

    #[test]
    fn test_card_counts() {
        let (index, all) = sample();
        let card = |topics: Vec<Uuid>| Card {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: "t".to_string(),
            body: String::new(),
            category: Default::default(),
            status: Default::default(),
            source_type: Default::default(),
            source_title: None,
            source_url: None,
            scripture: None,
            connected_topic_ids: topics,
            created_at_utc: Utc::now(),
        };
        let cards = vec![
            card(vec![all[0].id, all[1].id]),
            card(vec![all[0].id, Uuid::new_v4()]),
        ];
        let counts = index.card_counts(&cards);
        assert_eq!(counts.get(&all[0].id), Some(&2));
        assert_eq!(counts.get(&all[1].id), Some(&1));
        assert_eq!(counts.len(), 2);
    }
}
