//! # brain-core
//!
//! Core types, traits, and algorithms for the second-brain service.
//!
//! This crate provides the domain model (cards, topics, profiles), the
//! repository traits that storage backends implement, and the pure logic
//! the API is built on: paragraph chunking for imports, hierarchical topic
//! numbering, the topic tree index, and the import triage state machine.

pub mod chunker;
pub mod defaults;
pub mod error;
pub mod import;
pub mod library;
pub mod logging;
pub mod memory;
pub mod models;
pub mod numbering;
pub mod onboarding;
pub mod settings;
pub mod topic_editor;
pub mod topic_tree;
pub mod traits;
pub mod triage;

// Re-export commonly used types at crate root
pub use chunker::{chunk_text, truncate_at_word, CandidateCard, ChunkSet};
pub use error::{Error, Result};
pub use import::{extract_text, source_title_for, ImportFormat};
pub use library::{
    CardFilter, CategoryCount, DashboardStats, KanbanBoard, KanbanColumn, TopicDetail,
};
pub use memory::MemoryStore;
pub use models::*;
pub use numbering::{next_topic_number, ParentRef};
pub use onboarding::{complete_onboarding, OnboardingTemplate};
pub use settings::{JsonFileSettingsStore, MemorySettingsStore, Settings, ViewMode};
pub use topic_editor::{TopicCommand, TopicEditor, TopicForm};
pub use topic_tree::TopicIndex;
pub use traits::*;
pub use triage::{DraftEdit, TriagePhase, TriageSession, TriageView};
