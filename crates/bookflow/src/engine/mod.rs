//! The reusable wizard machinery shared by every flow in the catalog.

pub mod controller;
pub mod definition;
pub mod progress;
pub mod record;
pub mod repository;
pub mod session;

#[cfg(test)]
mod tests;

pub use controller::{decide_transition, go_back, go_to_step, BackNavigation, Transition, TransitionError};
pub use definition::{
    CompletionRule, FlowDefinition, FlowKind, LoopRule, ResumeRule, StepDescriptor, StepId,
};
pub use progress::{completed_steps, progress_percent, resume_step};
pub use record::AggregateRecord;
pub use repository::{
    DraftRepository, DraftSnapshot, DraftStoreError, OwnerId, SubmissionError, SubmissionGateway,
    SubmissionReceipt,
};
pub use session::{FlowSession, FlowStateView, SessionError, StepOutcome};
