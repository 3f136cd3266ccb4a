//! The concrete flow catalog: one immutable definition per flow kind.

mod hotel;
mod onboarding;
mod package;
pub mod verification;

pub use hotel::hotel_listing_definition;
pub use onboarding::{manager_onboarding_definition, operator_onboarding_definition};
pub use package::package_creation_definition;
pub use verification::{identity_subflow_definition, verification_hub_definition};

use crate::engine::{FlowDefinition, FlowKind};

/// The step registry: resolves a flow kind to its fixed definition.
pub fn definition_for(kind: FlowKind) -> FlowDefinition {
    match kind {
        FlowKind::HotelListing => hotel_listing_definition(),
        FlowKind::PackageCreation => package_creation_definition(),
        FlowKind::ManagerOnboarding => manager_onboarding_definition(),
        FlowKind::OperatorOnboarding => operator_onboarding_definition(),
        FlowKind::VerificationHub => verification_hub_definition(),
        FlowKind::IdentityVerification => identity_subflow_definition(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_resolves_to_a_definition_of_its_own_kind() {
        for kind in FlowKind::ordered() {
            let definition = definition_for(kind);
            assert_eq!(definition.kind(), kind);
            assert!(!definition.is_empty());
        }
    }

    #[test]
    fn step_ids_are_consecutive_from_one() {
        for kind in FlowKind::ordered() {
            let definition = definition_for(kind);
            for (index, step) in definition.steps().iter().enumerate() {
                assert_eq!(step.id.0 as usize, index + 1, "{}", kind.label());
            }
        }
    }

    #[test]
    fn loop_rules_point_at_existing_steps() {
        for kind in FlowKind::ordered() {
            let definition = definition_for(kind);
            for rule in definition.loop_rules() {
                assert!(definition.step(rule.source).is_some());
                assert!(definition.step(rule.target).is_some());
            }
        }
    }
}
