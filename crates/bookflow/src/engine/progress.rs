//! Derived views over the aggregate record: which steps are done, where a
//! session should resume, and how far along the flow is. Everything here is
//! recomputed from the record on every call; nothing is cached.

use std::collections::BTreeSet;

use super::definition::{FlowDefinition, ResumeRule, StepId};
use super::record::AggregateRecord;

/// Evaluates every step's completion rule against the record.
pub fn completed_steps(definition: &FlowDefinition, record: &AggregateRecord) -> BTreeSet<StepId> {
    definition
        .steps()
        .iter()
        .filter(|step| step.completion.resolve(record))
        .map(|step| step.id)
        .collect()
}

/// Picks the step a reopened session lands on.
///
/// First required step whose rule is unmet; once every required step is
/// done, the step after the last completed one, capped at the final step.
/// An empty record always lands on step 1. Idempotent by construction:
/// the same record yields the same step.
pub fn resume_step(definition: &FlowDefinition, record: &AggregateRecord) -> StepId {
    if record.is_empty() || definition.resume_rule() == ResumeRule::AlwaysFirst {
        return definition.first_step_id();
    }

    let completed = completed_steps(definition, record);

    if let Some(step) = definition
        .steps()
        .iter()
        .find(|step| step.required && !completed.contains(&step.id))
    {
        return step.id;
    }

    match completed.iter().next_back() {
        Some(last) => last.next().min(definition.last_step_id()),
        None => definition.first_step_id(),
    }
}

/// Completed required steps over total required steps, as a whole percent.
pub fn progress_percent(definition: &FlowDefinition, record: &AggregateRecord) -> u8 {
    let required_total = definition.steps().iter().filter(|step| step.required).count();
    if required_total == 0 {
        return 100;
    }

    let completed = completed_steps(definition, record);
    let required_done = definition
        .steps()
        .iter()
        .filter(|step| step.required && completed.contains(&step.id))
        .count();

    ((required_done * 100) / required_total) as u8
}
