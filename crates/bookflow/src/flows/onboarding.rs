//! Partner onboarding wizards. Both roles share the same shape: profile
//! steps, a verification step fed by the embedded verification sub-flow
//! (its output lands under the `verification` key), and a review screen.

use crate::engine::{
    CompletionRule, FlowDefinition, FlowKind, ResumeRule, StepDescriptor, StepId,
};

pub fn manager_onboarding_definition() -> FlowDefinition {
    FlowDefinition::new(
        FlowKind::ManagerOnboarding,
        vec![
            StepDescriptor {
                id: StepId(1),
                key: "contact_profile",
                title: "Contact Profile",
                required: true,
                completion: CompletionRule::Fields(&["fullName", "email", "phone"]),
            },
            StepDescriptor {
                id: StepId(2),
                key: "business_profile",
                title: "Business Profile",
                required: true,
                completion: CompletionRule::Fields(&["businessName", "businessType"]),
            },
            StepDescriptor {
                id: StepId(3),
                key: "property_portfolio",
                title: "Property Portfolio",
                required: true,
                completion: CompletionRule::Fields(&["properties"]),
            },
            StepDescriptor {
                id: StepId(4),
                key: "verification",
                title: "Verification",
                required: true,
                completion: CompletionRule::Fields(&[
                    "verification.matchingScore",
                    "verification.ownershipDocs",
                ]),
            },
            StepDescriptor {
                id: StepId(5),
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

pub fn operator_onboarding_definition() -> FlowDefinition {
    FlowDefinition::new(
        FlowKind::OperatorOnboarding,
        vec![
            StepDescriptor {
                id: StepId(1),
                key: "contact_profile",
                title: "Contact Profile",
                required: true,
                completion: CompletionRule::Fields(&["fullName", "email", "phone"]),
            },
            StepDescriptor {
                id: StepId(2),
                key: "company_profile",
                title: "Company Profile",
                required: true,
                completion: CompletionRule::Fields(&["companyName", "registrationNumber"]),
            },
            StepDescriptor {
                id: StepId(3),
                key: "licensing",
                title: "Licensing",
                required: true,
                completion: CompletionRule::Fields(&["licenses"]),
            },
            StepDescriptor {
                id: StepId(4),
                key: "verification",
                title: "Verification",
                required: true,
                completion: CompletionRule::Fields(&[
                    "verification.matchingScore",
                    "verification.ownershipDocs",
                ]),
            },
            StepDescriptor {
                id: StepId(5),
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
