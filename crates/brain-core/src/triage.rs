//! Import triage state machine.
//!
//! An uploaded document is chunked into candidates which the user then walks
//! through one at a time, approving (persisting a card) or skipping each.
//!
//! ```text
//!   Upload --start--> Triage --approve/skip (last)--> Complete
//!     ^                  |                               |
//!     +------reset-------+--------------reset------------+
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::chunker::{CandidateCard, ChunkSet};
use crate::defaults::CHUNK_MAX_CANDIDATES;
use crate::error::{Error, Result};
use crate::import::{source_title_for, NO_CONTENT_MESSAGE};
use crate::models::{Card, CardInput, Category, SourceType};
use crate::traits::CardRepository;

/// Externally visible phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TriagePhase {
    Upload,
    Triage,
    Complete,
}

/// Partial update to the active draft. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DraftEdit {
    pub title: Option<String>,
    pub body: Option<String>,
    pub category: Option<Category>,
    pub scripture: Option<String>,
    pub connected_topic_ids: Option<Vec<Uuid>>,
}

/// Snapshot of a session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct TriageView {
    pub phase: TriagePhase,
    pub filename: Option<String>,
    /// Zero-based index of the active draft.
    pub position: usize,
    /// Number of candidates in this session.
    pub total: usize,
    /// Qualifying paragraphs in the document, before the cap.
    pub total_found: usize,
    /// Paragraphs beyond the cap that will not be reviewed.
    pub truncated: usize,
    pub approved: usize,
    pub skipped: usize,
    pub draft: Option<CandidateCard>,
}

#[derive(Debug, Clone)]
struct Walk {
    filename: String,
    candidates: Vec<CandidateCard>,
    total_found: usize,
    index: usize,
    draft: CandidateCard,
    approved: usize,
    skipped: usize,
}

impl Walk {
    /// Move to the next candidate, or report that none is left.
    fn advance(&mut self) -> bool {
        self.index += 1;
        match self.candidates.get(self.index) {
            Some(next) => {
                self.draft = next.clone();
                true
            }
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
struct Summary {
    filename: String,
    total: usize,
    total_found: usize,
    approved: usize,
    skipped: usize,
}

#[derive(Debug, Clone, Default)]
enum State {
    #[default]
    Upload,
    Triage(Walk),
    Complete(Summary),
}

/// One user's walk through an imported document.
#[derive(Debug, Clone, Default)]
pub struct TriageSession {
    state: State,
}

impl TriageSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> TriagePhase {
        match self.state {
            State::Upload => TriagePhase::Upload,
            State::Triage(_) => TriagePhase::Triage,
            State::Complete(_) => TriagePhase::Complete,
        }
    }

    /// Begin triage over a chunked document.
    ///
    /// Only valid from `Upload`. An empty chunk set is rejected and the
    /// session stays where it is.
    pub fn start(&mut self, filename: impl Into<String>, chunks: ChunkSet) -> Result<()> {
        if !matches!(self.state, State::Upload) {
            return Err(Error::Precondition(
                "an import is already in progress; reset it first".to_string(),
            ));
        }
        let Some(first) = chunks.candidates.first().cloned() else {
            return Err(Error::UnsupportedInput(NO_CONTENT_MESSAGE.to_string()));
        };

        let filename = filename.into();
        info!(
            subsystem = "import",
            component = "triage",
            op = "start",
            filename = %filename,
            chunk_count = chunks.candidates.len(),
            total_found = chunks.total_found,
            "Triage started"
        );
        self.state = State::Triage(Walk {
            filename,
            candidates: chunks.candidates,
            total_found: chunks.total_found,
            index: 0,
            draft: first,
            approved: 0,
            skipped: 0,
        });
        Ok(())
    }

    /// Apply edits to the active draft.
    pub fn edit_draft(&mut self, edit: DraftEdit) -> Result<&CandidateCard> {
        let walk = self.walk_mut()?;
        if edit.category == Some(Category::Unprocessed) {
            return Err(Error::InvalidInput(
                "Imported cards cannot be filed as Unprocessed".to_string(),
            ));
        }
        if let Some(title) = edit.title {
            walk.draft.title = title;
        }
        if let Some(body) = edit.body {
            walk.draft.body = body;
        }
        if let Some(category) = edit.category {
            walk.draft.category = category;
        }
        if let Some(scripture) = edit.scripture {
            walk.draft.scripture = scripture;
        }
        if let Some(ids) = edit.connected_topic_ids {
            walk.draft.connected_topic_ids = ids;
        }
        Ok(&walk.draft)
    }

    /// Persist the active draft as a card and advance.
    ///
    /// The session does not move until the insert resolves. If it fails the
    /// error is returned and the same draft stays active.
    pub async fn approve(&mut self, cards: &dyn CardRepository, user_id: Uuid) -> Result<Card> {
        let walk = self.walk_mut()?;
        let input = draft_to_input(&walk.draft, &walk.filename);
        let card = cards.insert(user_id, input).await?;

        walk.approved += 1;
        debug!(
            subsystem = "import",
            component = "triage",
            op = "approve",
            user_id = %user_id,
            card_id = %card.id,
            position = walk.index,
            "Candidate approved"
        );
        self.advance();
        Ok(card)
    }

    /// Drop the active draft and advance.
    pub fn skip(&mut self) -> Result<()> {
        let walk = self.walk_mut()?;
        walk.skipped += 1;
        debug!(
            subsystem = "import",
            component = "triage",
            op = "skip",
            position = walk.index,
            "Candidate skipped"
        );
        self.advance();
        Ok(())
    }

    /// Return to `Upload`, discarding candidates and counters.
    pub fn reset(&mut self) {
        self.state = State::Upload;
    }

    pub fn view(&self) -> TriageView {
        match &self.state {
            State::Upload => TriageView {
                phase: TriagePhase::Upload,
                filename: None,
                position: 0,
                total: 0,
                total_found: 0,
                truncated: 0,
                approved: 0,
                skipped: 0,
                draft: None,
            },
            State::Triage(walk) => TriageView {
                phase: TriagePhase::Triage,
                filename: Some(walk.filename.clone()),
                position: walk.index,
                total: walk.candidates.len(),
                total_found: walk.total_found,
                truncated: overflow(walk.total_found),
                approved: walk.approved,
                skipped: walk.skipped,
                draft: Some(walk.draft.clone()),
            },
            State::Complete(summary) => TriageView {
                phase: TriagePhase::Complete,
                filename: Some(summary.filename.clone()),
                position: summary.total,
                total: summary.total,
                total_found: summary.total_found,
                truncated: overflow(summary.total_found),
                approved: summary.approved,
                skipped: summary.skipped,
                draft: None,
            },
        }
    }

    fn walk_mut(&mut self) -> Result<&mut Walk> {
        match &mut self.state {
            State::Triage(walk) => Ok(walk),
            _ => Err(Error::Precondition("no candidate is under review".to_string())),
        }
    }

    fn advance(&mut self) {
        let State::Triage(walk) = &mut self.state else {
            return;
        };
        if walk.advance() {
            return;
        }
        info!(
            subsystem = "import",
            component = "triage",
            op = "complete",
            filename = %walk.filename,
            approved = walk.approved,
            skipped = walk.skipped,
            "Triage complete"
        );
        let summary = Summary {
            filename: std::mem::take(&mut walk.filename),
            total: walk.candidates.len(),
            total_found: walk.total_found,
            approved: walk.approved,
            skipped: walk.skipped,
        };
        self.state = State::Complete(summary);
    }
}

fn overflow(total_found: usize) -> usize {
    total_found.saturating_sub(CHUNK_MAX_CANDIDATES)
}

fn draft_to_input(draft: &CandidateCard, filename: &str) -> CardInput {
    CardInput {
        title: draft.title.clone(),
        body: draft.body.clone(),
        category: draft.category,
        source_type: SourceType::Note,
        source_title: Some(source_title_for(filename)),
        source_url: None,
        scripture: Some(draft.scripture.clone()),
        connected_topic_ids: draft.connected_topic_ids.clone(),
    }
}
