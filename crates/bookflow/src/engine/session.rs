use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::controller::{self, BackNavigation, Transition, TransitionError};
use super::definition::{FlowDefinition, FlowKind, StepId};
use super::progress;
use super::record::AggregateRecord;
use super::repository::{
    DraftRepository, DraftStoreError, OwnerId, SubmissionError, SubmissionGateway,
    SubmissionReceipt,
};

/// One live wizard instance: the imperative shell composing the pure
/// pieces (accumulate, derive, decide) with draft persistence and final
/// submission.
///
/// The session exclusively owns its cursor and record. Collaborator
/// failures surface as errors and leave both in their last-known-good
/// state.
pub struct FlowSession<R, G>
where
    R: DraftRepository,
    G: SubmissionGateway,
{
    definition: FlowDefinition,
    owner: OwnerId,
    record: AggregateRecord,
    cursor: StepId,
    drafts: Arc<R>,
    submissions: Arc<G>,
}

/// What one `submit_step` call did, surfaced to the host UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Advanced(StepId),
    Looped(StepId),
    Stayed(StepId),
    Completed(SubmissionReceipt),
}

/// Error raised by the flow session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Draft(#[from] DraftStoreError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

impl<R, G> FlowSession<R, G>
where
    R: DraftRepository,
    G: SubmissionGateway,
{
    /// Opens (or resumes) a flow for an owner: loads any draft and derives
    /// the starting cursor from the accumulated record.
    pub fn open(
        definition: FlowDefinition,
        owner: OwnerId,
        drafts: Arc<R>,
        submissions: Arc<G>,
    ) -> Result<Self, SessionError> {
        let record = drafts
            .load(&owner, definition.kind())?
            .map(|draft| draft.record)
            .unwrap_or_default();
        let cursor = progress::resume_step(&definition, &record);

        debug!(
            flow = definition.kind().label(),
            owner = %owner.0,
            %cursor,
            resumed = !record.is_empty(),
            "flow session opened"
        );

        Ok(Self {
            definition,
            owner,
            record,
            cursor,
            drafts,
            submissions,
        })
    }

    pub fn definition(&self) -> &FlowDefinition {
        &self.definition
    }

    pub fn kind(&self) -> FlowKind {
        self.definition.kind()
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn cursor(&self) -> StepId {
        self.cursor
    }

    pub fn record(&self) -> &AggregateRecord {
        &self.record
    }

    pub fn completed_steps(&self) -> BTreeSet<StepId> {
        progress::completed_steps(&self.definition, &self.record)
    }

    pub fn progress_percent(&self) -> u8 {
        progress::progress_percent(&self.definition, &self.record)
    }

    /// Absorbs an in-step partial update without moving the cursor, the
    /// path a step handler's incremental saves (and embedded sub-flows)
    /// use between submissions.
    pub fn apply_partial(&mut self, partial: Map<String, Value>) -> Result<(), SessionError> {
        self.record = self.record.apply_update(&partial);
        self.save_draft(false)?;
        Ok(())
    }

    /// Submits a completed step: folds the partial into the record, saves
    /// the draft, and moves the cursor per the transition rules. The final
    /// step triggers submission instead of advancing.
    pub fn submit_step(
        &mut self,
        step: StepId,
        partial: Map<String, Value>,
        signal: Option<&str>,
    ) -> Result<StepOutcome, SessionError> {
        let transition =
            controller::decide_transition(&self.definition, self.cursor, step, &partial, signal)?;

        self.record = self.record.apply_update(&partial);
        self.save_draft(false)?;

        let outcome = match transition {
            Transition::Advanced(next) => {
                self.cursor = next;
                StepOutcome::Advanced(next)
            }
            Transition::Looped(target) => {
                self.cursor = target;
                StepOutcome::Looped(target)
            }
            Transition::Stayed => StepOutcome::Stayed(self.cursor),
            Transition::Completed => StepOutcome::Completed(self.finalize()?),
        };

        debug!(
            flow = self.definition.kind().label(),
            owner = %self.owner.0,
            submitted = %step,
            cursor = %self.cursor,
            "step submitted"
        );

        Ok(outcome)
    }

    /// Hands the finished record to the submission gateway. Callable again
    /// after a failure without re-traversing any step: the session stays on
    /// the terminal step with its record intact.
    pub fn finalize(&mut self) -> Result<SubmissionReceipt, SessionError> {
        let receipt = self
            .submissions
            .submit(self.definition.kind(), &self.owner, &self.record)?;

        if let Err(err) = self.save_draft(true) {
            // The backend accepted the record; a stale draft only means the
            // store keeps offering a finished flow until the next save wins.
            warn!(
                flow = self.definition.kind().label(),
                owner = %self.owner.0,
                error = %err,
                "draft finalization failed after accepted submission"
            );
        }

        Ok(receipt)
    }

    /// One step backward; backing out of step 1 exits the flow and leaves
    /// the record untouched.
    pub fn go_back(&mut self) -> BackNavigation {
        let navigation = controller::go_back(self.cursor);
        if let BackNavigation::MovedBack(previous) = navigation {
            self.cursor = previous;
        }
        navigation
    }

    /// Unconditional jump from a review screen's "edit section" action.
    pub fn go_to_step(&mut self, target: StepId) -> Result<StepId, SessionError> {
        self.cursor = controller::go_to_step(&self.definition, target)?;
        Ok(self.cursor)
    }

    pub fn state_view(&self) -> FlowStateView {
        let cursor_key = self
            .definition
            .step(self.cursor)
            .map(|step| step.key)
            .unwrap_or("");

        FlowStateView {
            flow_kind: self.definition.kind(),
            owner_id: self.owner.0.clone(),
            cursor: self.cursor,
            cursor_key,
            completed_steps: self.completed_steps().into_iter().collect(),
            progress_percent: self.progress_percent(),
            total_steps: self.definition.len(),
        }
    }

    fn save_draft(&self, is_final: bool) -> Result<(), DraftStoreError> {
        self.drafts
            .save(&self.owner, self.definition.kind(), &self.record, is_final)
    }
}

/// Sanitized snapshot of a session for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct FlowStateView {
    pub flow_kind: FlowKind,
    pub owner_id: String,
    pub cursor: StepId,
    pub cursor_key: &'static str,
    pub completed_steps: Vec<StepId>,
    pub progress_percent: u8,
    pub total_steps: usize,
}
