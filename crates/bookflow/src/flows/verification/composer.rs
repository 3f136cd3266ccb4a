use serde_json::{Map, Value};
use tracing::debug;

use crate::engine::{
    decide_transition, resume_step, AggregateRecord, FlowDefinition, StepId, Transition,
    TransitionError,
};

/// The record key the child flow's output lives under in the parent.
/// Child data is never flattened into the parent's top level.
pub const VERIFICATION_KEY: &str = "verification";

/// Runs a child flow inside one step of a parent flow.
///
/// The child keeps its own cursor and record, opaque to the parent. Every
/// child submission yields a namespaced parent partial so the parent's
/// draft always carries the child's latest evidence; only child completion
/// tells the host to submit the parent's embedding step.
pub struct SubFlowComposer {
    definition: FlowDefinition,
    record: AggregateRecord,
    cursor: StepId,
}

/// What one child submission means for the parent.
#[derive(Debug)]
pub enum SubFlowProgress {
    /// The child moved on; persist the namespaced partial, parent cursor
    /// untouched.
    Advanced {
        cursor: StepId,
        parent_partial: Map<String, Value>,
    },
    /// The child finished; fold the partial into the parent and submit the
    /// embedding step as if it had been filled by hand.
    Completed { parent_partial: Map<String, Value> },
}

impl SubFlowComposer {
    /// Opens the child flow against whatever evidence the parent draft
    /// already holds under the namespace key. Prior evidence moves the
    /// child's starting sub-step forward — a stored matching score lands
    /// on document upload, not back at identity capture.
    pub fn open(definition: FlowDefinition, parent_record: &AggregateRecord) -> Self {
        let record = parent_record
            .get(VERIFICATION_KEY)
            .and_then(Value::as_object)
            .cloned()
            .map(AggregateRecord::from_map)
            .unwrap_or_default();
        let cursor = resume_step(&definition, &record);

        debug!(
            flow = definition.kind().label(),
            %cursor,
            resumed = !record.is_empty(),
            "sub-flow opened"
        );

        Self {
            definition,
            record,
            cursor,
        }
    }

    pub fn definition(&self) -> &FlowDefinition {
        &self.definition
    }

    pub fn cursor(&self) -> StepId {
        self.cursor
    }

    pub fn record(&self) -> &AggregateRecord {
        &self.record
    }

    /// Submits one child step. Mirrors the parent-level transition rules,
    /// scoped to the child's definition and record.
    pub fn submit_step(
        &mut self,
        step: StepId,
        partial: Map<String, Value>,
        signal: Option<&str>,
    ) -> Result<SubFlowProgress, TransitionError> {
        let transition = decide_transition(&self.definition, self.cursor, step, &partial, signal)?;
        self.record = self.record.apply_update(&partial);

        let progress = match transition {
            Transition::Advanced(next) | Transition::Looped(next) => {
                self.cursor = next;
                SubFlowProgress::Advanced {
                    cursor: next,
                    parent_partial: self.parent_partial(),
                }
            }
            Transition::Stayed => SubFlowProgress::Advanced {
                cursor: self.cursor,
                parent_partial: self.parent_partial(),
            },
            Transition::Completed => SubFlowProgress::Completed {
                parent_partial: self.parent_partial(),
            },
        };

        Ok(progress)
    }

    /// The child's full record under its namespace key, ready for the
    /// parent's accumulator.
    pub fn parent_partial(&self) -> Map<String, Value> {
        let mut partial = Map::new();
        partial.insert(
            VERIFICATION_KEY.to_string(),
            self.record.clone().into_value(),
        );
        partial
    }
}
