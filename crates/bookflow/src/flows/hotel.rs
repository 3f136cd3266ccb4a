use crate::engine::{
    CompletionRule, FlowDefinition, FlowKind, ResumeRule, StepDescriptor, StepId,
};

/// The hotel listing wizard: seven data steps and a review screen.
///
/// Completion is read straight off the accumulated record, so a host can
/// reopen a half-finished listing and land on the first gap.
pub fn hotel_listing_definition() -> FlowDefinition {
    FlowDefinition::new(
        FlowKind::HotelListing,
        vec![
            StepDescriptor {
                id: StepId(1),
                key: "property_type",
                title: "Property Type",
                required: true,
                completion: CompletionRule::Fields(&["propertyType"]),
            },
            StepDescriptor {
                id: StepId(2),
                key: "basic_info",
                title: "Name & Description",
                required: true,
                completion: CompletionRule::Fields(&["hotelName", "description"]),
            },
            StepDescriptor {
                id: StepId(3),
                key: "location",
                title: "Location",
                required: true,
                completion: CompletionRule::Fields(&["location"]),
            },
            StepDescriptor {
                id: StepId(4),
                key: "amenities",
                title: "Amenities",
                required: true,
                completion: CompletionRule::Fields(&["amenities"]),
            },
            StepDescriptor {
                id: StepId(5),
                key: "rooms",
                title: "Rooms",
                required: true,
                completion: CompletionRule::Fields(&["rooms"]),
            },
            StepDescriptor {
                id: StepId(6),
                key: "policies",
                title: "Policies",
                required: true,
                completion: CompletionRule::Fields(&["policies"]),
            },
            StepDescriptor {
                id: StepId(7),
                key: "photos",
                title: "Photos",
                required: true,
                completion: CompletionRule::Fields(&["photos"]),
            },
            StepDescriptor {
                id: StepId(8),
                key: "review",
                title: "Review & Publish",
                required: false,
                completion: CompletionRule::Never,
            },
        ],
        ResumeRule::FirstIncomplete,
        Vec::new(),
    )
}
