//! Partner verification: a hub flow reachable from both onboarding
//! wizards, embedding the identity sub-flow, which in turn wraps the
//! capture/compare machine in [`identity`].

pub mod composer;
pub mod identity;

pub use composer::{SubFlowComposer, SubFlowProgress, VERIFICATION_KEY};
pub use identity::{
    CapturePhase, ComparisonError, ComparisonGateway, ComparisonOutcome, IdentityCapture,
};

use crate::engine::{
    CompletionRule, FlowDefinition, FlowKind, ResumeRule, StepDescriptor, StepId,
};

/// The verification hub. Its first step is satisfied by the identity
/// sub-flow's folded output; the record itself never distinguishes
/// "filled by hand" from "filled by a child flow".
pub fn verification_hub_definition() -> FlowDefinition {
    FlowDefinition::new(
        FlowKind::VerificationHub,
        vec![
            StepDescriptor {
                id: StepId(1),
                key: "partner_verification",
                title: "Partner Verification",
                required: true,
                completion: CompletionRule::Fields(&[
                    "verification.matchingScore",
                    "verification.ownershipDocs",
                ]),
            },
            StepDescriptor {
                id: StepId(2),
                key: "review",
                title: "Review & Submit",
                required: false,
                completion: CompletionRule::Never,
            },
        ],
        ResumeRule::FirstIncomplete,
        Vec::new(),
    )
}

/// The identity sub-flow embedded by the hub. Scoped to the child record:
/// field names here are relative to the `verification` namespace the
/// composer folds into the parent.
pub fn identity_subflow_definition() -> FlowDefinition {
    FlowDefinition::new(
        FlowKind::IdentityVerification,
        vec![
            StepDescriptor {
                id: StepId(1),
                key: "identity_match",
                title: "Identity Match",
                required: true,
                completion: CompletionRule::Fields(&["matchingScore"]),
            },
            StepDescriptor {
                id: StepId(2),
                key: "ownership_documents",
                title: "Ownership Documents",
                required: true,
                completion: CompletionRule::Fields(&["ownershipDocs"]),
            },
        ],
        ResumeRule::FirstIncomplete,
        Vec::new(),
    )
}
