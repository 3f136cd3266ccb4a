use crate::engine::{
    CompletionRule, FlowDefinition, FlowKind, LoopRule, ResumeRule, StepDescriptor, StepId,
};

/// The package creation wizard. Submitting the review step with the
/// `addAnother` signal jumps back to the room details step so an operator
/// can keep appending room options without losing anything already
/// entered.
pub fn package_creation_definition() -> FlowDefinition {
    FlowDefinition::new(
        FlowKind::PackageCreation,
        vec![
            StepDescriptor {
                id: StepId(1),
                key: "basics",
                title: "Package Basics",
                required: true,
                completion: CompletionRule::Fields(&["packageName", "description"]),
            },
            StepDescriptor {
                id: StepId(2),
                key: "destination",
                title: "Destination",
                required: true,
                completion: CompletionRule::Fields(&["destination"]),
            },
            StepDescriptor {
                id: StepId(3),
                key: "schedule",
                title: "Dates & Duration",
                required: true,
                completion: CompletionRule::Fields(&["departureDate", "durationDays"]),
            },
            StepDescriptor {
                id: StepId(4),
                key: "pricing",
                title: "Pricing",
                required: true,
                completion: CompletionRule::Fields(&["pricing"]),
            },
            StepDescriptor {
                id: StepId(5),
                key: "rooms",
                title: "Room Details",
                required: true,
                completion: CompletionRule::Fields(&["rooms"]),
            },
            StepDescriptor {
                id: StepId(6),
                key: "itinerary",
                title: "Itinerary",
                required: true,
                completion: CompletionRule::Fields(&["itinerary"]),
            },
            StepDescriptor {
                id: StepId(7),
                key: "services",
                title: "Included Services",
                required: true,
                completion: CompletionRule::Fields(&["services"]),
            },
            StepDescriptor {
                id: StepId(8),
                key: "photos",
                title: "Photos",
                required: true,
                completion: CompletionRule::Fields(&["photos"]),
            },
            StepDescriptor {
                id: StepId(9),
                key: "review",
                title: "Review & Publish",
                required: false,
                completion: CompletionRule::Never,
            },
        ],
        ResumeRule::FirstIncomplete,
        vec![LoopRule {
            source: StepId(9),
            target: StepId(5),
            signal: "addAnother",
        }],
    )
}
