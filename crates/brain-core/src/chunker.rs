//! Paragraph chunking for document imports.
//!
//! Splits raw text at blank lines into a bounded, ordered list of candidate
//! cards for triage. Short fragments are dropped as noise and the list is
//! capped so a huge upload cannot flood the review queue.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::{CHUNK_MAX_CANDIDATES, CHUNK_MIN_CHARS, TITLE_MAX_CHARS};
use crate::models::Category;

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").unwrap());

/// A proposed card awaiting a triage decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CandidateCard {
    pub title: String,
    pub body: String,
    pub category: Category,
    pub scripture: String,
    pub connected_topic_ids: Vec<Uuid>,
}

impl CandidateCard {
    fn from_paragraph(paragraph: &str) -> Self {
        Self {
            title: truncate_at_word(paragraph, TITLE_MAX_CHARS),
            body: paragraph.to_string(),
            category: Category::Studies,
            scripture: String::new(),
            connected_topic_ids: Vec::new(),
        }
    }
}

/// Output of [`chunk_text`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkSet {
    /// Candidates in document order, at most [`CHUNK_MAX_CANDIDATES`].
    pub candidates: Vec<CandidateCard>,
    /// Qualifying paragraphs before the cap was applied.
    pub total_found: usize,
}

impl ChunkSet {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Paragraphs dropped by the cap (0 when nothing was truncated).
    pub fn overflow(&self) -> usize {
        self.total_found.saturating_sub(self.candidates.len())
    }
}

/// Split document text into triage candidates.
pub fn chunk_text(text: &str) -> ChunkSet {
    let paragraphs: Vec<&str> = PARAGRAPH_BREAK
        .split(text)
        .map(str::trim)
        .filter(|p| p.chars().count() >= CHUNK_MIN_CHARS)
        .collect();

    let total_found = paragraphs.len();
    let candidates = paragraphs
        .into_iter()
        .take(CHUNK_MAX_CANDIDATES)
        .map(CandidateCard::from_paragraph)
        .collect::<Vec<_>>();

    tracing::trace!(
        chunk_count = candidates.len(),
        total_found,
        "Chunked import text"
    );

    ChunkSet {
        candidates,
        total_found,
    }
}

/// Shorten `text` to at most `max_chars` characters without splitting a word.
///
/// Cuts back to the last space inside the limit, even when the limit itself
/// falls on a word boundary. Only a plain space counts as a break. With no
/// space in range the prefix is hard-truncated.
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    let Some((limit, _)) = text.char_indices().nth(max_chars) else {
        return text.to_string();
    };

    let prefix = &text[..limit];
    match prefix.rfind(' ') {
        Some(cut) if cut > 0 => prefix[..cut].to_string(),
        _ => prefix.to_string(),
    }
}
