//! Transition core for the draft authoring flow.
//!
//! The controller is synchronous: the async client asks it to *begin* a
//! transition, performs the gateway calls, then feeds the typed result
//! back through a *complete*/*fail* method. Each begin hands out the
//! current generation; completions carrying a stale generation are
//! ignored, so a response that arrives after the authoring session was
//! discarded cannot resurrect old state.

use shared::{
    domain::DraftId,
    protocol::{DraftPayload, EvaluationOutcome, SummaryPayload},
};

use crate::draft::DraftForm;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftState {
    Editing,
    Submitting,
    EvaluatedSummary { summary: SummaryPayload },
    EvaluatedFeedback { comment: String },
    Resummarizing { summary: SummaryPayload },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateTag {
    Editing,
    Submitting,
    EvaluatedSummary,
    EvaluatedFeedback,
    Resummarizing,
}

impl DraftState {
    pub fn tag(&self) -> StateTag {
        match self {
            Self::Editing => StateTag::Editing,
            Self::Submitting => StateTag::Submitting,
            Self::EvaluatedSummary { .. } => StateTag::EvaluatedSummary,
            Self::EvaluatedFeedback { .. } => StateTag::EvaluatedFeedback,
            Self::Resummarizing { .. } => StateTag::Resummarizing,
        }
    }
}

/// Which gateway call a submission must make. Chosen solely on
/// identifier presence: once a draft has a server id, every later
/// submission is an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAction {
    Create(DraftPayload),
    Update(DraftId, DraftPayload),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket {
    pub action: SubmitAction,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResummarizeTicket {
    pub draft_id: DraftId,
    pub generation: u64,
}

#[derive(Debug)]
pub struct DraftLifecycle {
    draft: DraftForm,
    draft_id: Option<DraftId>,
    state: DraftState,
    generation: u64,
}

impl Default for DraftLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl DraftLifecycle {
    pub fn new() -> Self {
        Self {
            draft: DraftForm::new(),
            draft_id: None,
            state: DraftState::Editing,
            generation: 0,
        }
    }

    pub fn state(&self) -> &DraftState {
        &self.state
    }

    pub fn draft(&self) -> &DraftForm {
        &self.draft
    }

    pub fn draft_id(&self) -> Option<DraftId> {
        self.draft_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn read_only(&self) -> bool {
        !matches!(self.state, DraftState::Editing)
    }

    /// Mutable access to the draft, granted only while editing.
    pub fn draft_mut(&mut self) -> Option<&mut DraftForm> {
        match self.state {
            DraftState::Editing => Some(&mut self.draft),
            _ => None,
        }
    }

    pub fn summary(&self) -> Option<&SummaryPayload> {
        match &self.state {
            DraftState::EvaluatedSummary { summary } | DraftState::Resummarizing { summary } => {
                Some(summary)
            }
            _ => None,
        }
    }

    pub fn feedback(&self) -> Option<&str> {
        match &self.state {
            DraftState::EvaluatedFeedback { comment } => Some(comment),
            _ => None,
        }
    }

    /// Draft reference handed to the creator-matching flow. Only an
    /// accepted (summarized) draft may be matched.
    pub fn matching_reference(&self) -> Option<DraftId> {
        match self.state {
            DraftState::EvaluatedSummary { .. } => self.draft_id,
            _ => None,
        }
    }

    /// Starts a submission. None when the draft is incomplete, or when
    /// the flow is not in `Editing` (covers re-entrant triggers while a
    /// call is outstanding). The controller enforces the completeness
    /// precondition itself; a disabled submit button in the shell is not
    /// trusted.
    pub fn begin_submit(&mut self) -> Option<SubmitTicket> {
        if !matches!(self.state, DraftState::Editing) {
            return None;
        }
        let payload = self.draft.payload()?;
        self.state = DraftState::Submitting;
        let action = match self.draft_id {
            Some(id) => SubmitAction::Update(id, payload),
            None => SubmitAction::Create(payload),
        };
        Some(SubmitTicket {
            action,
            generation: self.generation,
        })
    }

    /// Records the identifier assigned by a successful create. The id is
    /// immutable once assigned. Returns false for a stale generation or
    /// when no submission is in flight.
    pub fn record_created(&mut self, generation: u64, draft_id: DraftId) -> bool {
        if generation != self.generation || !matches!(self.state, DraftState::Submitting) {
            return false;
        }
        if self.draft_id.is_none() {
            self.draft_id = Some(draft_id);
        }
        true
    }

    /// Applies the evaluation result; the variant tag alone selects the
    /// evaluated state.
    pub fn complete_submit(&mut self, generation: u64, outcome: EvaluationOutcome) -> bool {
        if generation != self.generation || !matches!(self.state, DraftState::Submitting) {
            return false;
        }
        self.state = match outcome {
            EvaluationOutcome::Summary(summary) => DraftState::EvaluatedSummary { summary },
            EvaluationOutcome::Feedback(feedback) => DraftState::EvaluatedFeedback {
                comment: feedback.comment,
            },
        };
        true
    }

    /// Rolls a failed submission back to `Editing`. An identifier
    /// assigned by an already-successful create is kept: the draft
    /// exists server-side, so a retry must route through update.
    pub fn fail_submit(&mut self, generation: u64) -> bool {
        if generation != self.generation || !matches!(self.state, DraftState::Submitting) {
            return false;
        }
        self.state = DraftState::Editing;
        true
    }

    /// Starts a summary regeneration; legal only from
    /// `EvaluatedSummary`. The prior summary is retained for rollback.
    pub fn begin_resummarize(&mut self) -> Option<ResummarizeTicket> {
        let draft_id = self.draft_id?;
        let DraftState::EvaluatedSummary { summary } = &self.state else {
            return None;
        };
        self.state = DraftState::Resummarizing {
            summary: summary.clone(),
        };
        Some(ResummarizeTicket {
            draft_id,
            generation: self.generation,
        })
    }

    /// Replaces the summary wholesale with the regenerated one.
    pub fn complete_resummarize(&mut self, generation: u64, summary: SummaryPayload) -> bool {
        if generation != self.generation || !matches!(self.state, DraftState::Resummarizing { .. })
        {
            return false;
        }
        self.state = DraftState::EvaluatedSummary { summary };
        true
    }

    /// Restores the retained summary after a failed regeneration.
    pub fn fail_resummarize(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        let DraftState::Resummarizing { summary } = &self.state else {
            return false;
        };
        self.state = DraftState::EvaluatedSummary {
            summary: summary.clone(),
        };
        true
    }

    /// Re-opens the draft for editing after feedback. The evaluation
    /// result is discarded entirely.
    pub fn revise(&mut self) -> bool {
        if !matches!(self.state, DraftState::EvaluatedFeedback { .. }) {
            return false;
        }
        self.state = DraftState::Editing;
        true
    }

    /// Abandons the authoring session: fresh draft, no identifier, and a
    /// bumped generation so any still-outstanding completion is ignored.
    pub fn discard(&mut self) {
        self.draft = DraftForm::new();
        self.draft_id = None;
        self.state = DraftState::Editing;
        self.generation += 1;
    }
}

#[cfg(test)]
#[path = "tests/lifecycle_tests.rs"]
mod tests;
