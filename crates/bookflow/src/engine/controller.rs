//! Pure transition decisions over the cursor. The session shell owns the
//! actual cursor mutation; everything here maps inputs to an outcome.

use serde_json::{Map, Value};

use super::definition::{FlowDefinition, LoopRule, StepId};

/// Outcome of submitting a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Default advance to the next step.
    Advanced(StepId),
    /// A loop rule fired; the cursor jumps to the rule's target.
    Looped(StepId),
    /// The final step was submitted; the flow is ready to finalize.
    Completed,
    /// The submitted step was not the active one; the record still
    /// absorbed the partial but the cursor does not move.
    Stayed,
}

/// Result of explicit backward navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackNavigation {
    MovedBack(StepId),
    /// Backing out of step 1 leaves the flow entirely; the record is
    /// untouched and the host decides where to go.
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("flow '{flow}' has no step {step}")]
    UnknownStep { flow: &'static str, step: StepId },
}

/// Decides the cursor movement for one step submission.
///
/// Loop rules are checked first so a review step's "add another" can fire
/// even when that step is also the final one. Submitting the final step
/// without a firing rule completes the flow. No validation happens here: a
/// submission means the step's own handler was satisfied.
pub fn decide_transition(
    definition: &FlowDefinition,
    cursor: StepId,
    submitted: StepId,
    partial: &Map<String, Value>,
    signal: Option<&str>,
) -> Result<Transition, TransitionError> {
    if definition.step(submitted).is_none() {
        return Err(TransitionError::UnknownStep {
            flow: definition.kind().label(),
            step: submitted,
        });
    }

    if let Some(target) = loop_target(definition, submitted, partial, signal) {
        return Ok(Transition::Looped(target));
    }

    if submitted == definition.last_step_id() {
        return Ok(Transition::Completed);
    }

    if submitted == cursor {
        return Ok(Transition::Advanced(submitted.next()));
    }

    Ok(Transition::Stayed)
}

/// One step backward, or out of the flow from step 1.
pub fn go_back(cursor: StepId) -> BackNavigation {
    if cursor <= StepId::FIRST {
        BackNavigation::Exited
    } else {
        BackNavigation::MovedBack(StepId(cursor.0 - 1))
    }
}

/// Unconditional jump used by review screens' "edit section" actions.
/// Leaves completion untouched; only the cursor moves.
pub fn go_to_step(definition: &FlowDefinition, target: StepId) -> Result<StepId, TransitionError> {
    if definition.step(target).is_none() {
        return Err(TransitionError::UnknownStep {
            flow: definition.kind().label(),
            step: target,
        });
    }
    Ok(target)
}

fn loop_target(
    definition: &FlowDefinition,
    submitted: StepId,
    partial: &Map<String, Value>,
    signal: Option<&str>,
) -> Option<StepId> {
    definition
        .loop_rules()
        .iter()
        .find(|rule| rule.source == submitted && rule_fired(rule, partial, signal))
        .map(|rule| rule.target)
}

fn rule_fired(rule: &LoopRule, partial: &Map<String, Value>, signal: Option<&str>) -> bool {
    match signal {
        Some(name) => name == rule.signal,
        None => matches!(partial.get(rule.signal), Some(Value::Bool(true))),
    }
}
