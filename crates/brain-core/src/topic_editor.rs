//! Topic create/edit form.
//!
//! The editor is a sum type: a form is either creating a root, creating a
//! child under a known parent, or editing an existing topic. Submitting it
//! produces the repository command to run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::{NewTopic, Topic, TopicChanges};
use crate::topic_tree::TopicIndex;

#[derive(Debug, Clone, PartialEq)]
pub enum TopicEditor {
    NewRoot,
    NewChild { parent_id: Uuid },
    Edit { topic: Topic },
}

/// User-entered fields common to every editor mode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TopicForm {
    pub title: String,
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub related_topic_ids: Vec<Uuid>,
}

/// What a submitted editor asks the repository to do.
#[derive(Debug, Clone, PartialEq)]
pub enum TopicCommand {
    Create(NewTopic),
    Update { id: Uuid, changes: TopicChanges },
}

impl TopicEditor {
    /// Editor for creating under `parent_id`, or a root when `None`.
    pub fn create(parent_id: Option<Uuid>) -> Self {
        match parent_id {
            Some(parent_id) => Self::NewChild { parent_id },
            None => Self::NewRoot,
        }
    }

    pub fn parent_id(&self) -> Option<Uuid> {
        match self {
            Self::NewRoot => None,
            Self::NewChild { parent_id } => Some(*parent_id),
            Self::Edit { topic } => topic.parent_id,
        }
    }

    /// Number a save would produce. Edits keep their existing number.
    pub fn preview_number(&self, index: &TopicIndex) -> Result<String> {
        match self {
            Self::NewRoot => Ok(index.plan_child(None)?.0),
            Self::NewChild { parent_id } => Ok(index.plan_child(Some(*parent_id))?.0),
            Self::Edit { topic } => Ok(topic.number.clone()),
        }
    }

    /// Validate the form and build the command.
    pub fn submit(&self, form: TopicForm, index: &TopicIndex) -> Result<TopicCommand> {
        let title = form.title.trim().to_string();
        if title.is_empty() {
            return Err(Error::InvalidInput("Topic title is required".to_string()));
        }
        let emoji = form.emoji.trim().to_string();

        let self_id = match self {
            Self::Edit { topic } => Some(topic.id),
            _ => None,
        };
        let mut related_topic_ids = Vec::with_capacity(form.related_topic_ids.len());
        for id in form.related_topic_ids {
            if Some(id) != self_id && !related_topic_ids.contains(&id) {
                related_topic_ids.push(id);
            }
        }

        match self {
            Self::NewRoot | Self::NewChild { .. } => {
                let parent_id = self.parent_id();
                let (number, level) = index.plan_child(parent_id)?;
                Ok(TopicCommand::Create(NewTopic {
                    number,
                    title,
                    emoji,
                    level,
                    parent_id,
                    related_topic_ids,
                }))
            }
            Self::Edit { topic } => Ok(TopicCommand::Update {
                id: topic.id,
                changes: TopicChanges {
                    title,
                    emoji,
                    related_topic_ids,
                },
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn topic(number: &str, level: i32, parent_id: Option<Uuid>) -> Topic {
        Topic {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            number: number.to_string(),
            title: format!("Topic {}", number),
            emoji: String::new(),
            level,
            parent_id,
            related_topic_ids: vec![],
            created_at_utc: Utc::now(),
        }
    }

    fn form(title: &str) -> TopicForm {
        TopicForm {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_new_root_plans_next_number() {
        let index = TopicIndex::new(vec![topic("1", 0, None), topic("2", 0, None)]);
        let editor = TopicEditor::create(None);
        assert_eq!(editor.preview_number(&index).unwrap(), "3");

        match editor.submit(form("  Worship "), &index).unwrap() {
            TopicCommand::Create(new) => {
                assert_eq!(new.number, "3");
                assert_eq!(new.level, 0);
                assert_eq!(new.parent_id, None);
                assert_eq!(new.title, "Worship");
            }
            other => panic!("expected create, got {:?}", other),
        }
    }

    #[test]
    fn test_new_child_under_parent() {
        let root = topic("1", 0, None);
        let index = TopicIndex::new(vec![root.clone(), topic("1a", 1, Some(root.id))]);
        let editor = TopicEditor::create(Some(root.id));
        match editor.submit(form("Second"), &index).unwrap() {
            TopicCommand::Create(new) => {
                assert_eq!(new.number, "1b");
                assert_eq!(new.level, 1);
                assert_eq!(new.parent_id, Some(root.id));
            }
            other => panic!("expected create, got {:?}", other),
        }
    }

    #[test]
    fn test_edit_keeps_number_and_parent() {
        let root = topic("1", 0, None);
        let child = topic("1a", 1, Some(root.id));
        let index = TopicIndex::new(vec![root.clone(), child.clone()]);
        let editor = TopicEditor::Edit {
            topic: child.clone(),
        };
        assert_eq!(editor.preview_number(&index).unwrap(), "1a");

        let command = editor
            .submit(
                TopicForm {
                    title: "Renamed".to_string(),
                    emoji: "📖".to_string(),
                    related_topic_ids: vec![root.id, child.id, root.id],
                },
                &index,
            )
            .unwrap();
        assert_eq!(
            command,
            TopicCommand::Update {
                id: child.id,
                changes: TopicChanges {
                    title: "Renamed".to_string(),
                    emoji: "📖".to_string(),
                    related_topic_ids: vec![root.id],
                },
            }
        );
    }

    #[test]
    fn test_blank_title_rejected() {
        let index = TopicIndex::new(vec![]);
        let err = TopicEditor::NewRoot
            .submit(form("   "), &index)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_unknown_parent() {
        let index = TopicIndex::new(vec![]);
        let editor = TopicEditor::create(Some(Uuid::new_v4()));
        assert!(matches!(
            editor.preview_number(&index),
            Err(Error::TopicNotFound(_))
        ));
        assert!(matches!(
            editor.submit(form("x"), &index),
            Err(Error::TopicNotFound(_))
        ));
    }
}
