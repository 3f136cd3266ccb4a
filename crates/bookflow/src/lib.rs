//! Wizard orchestration for the booking platform's multi-step flows.
//!
//! The [`engine`] module carries the reusable machinery: step registries,
//! record accumulation, derived completion/progress, and the transition
//! controller. The [`flows`] module holds the concrete flow catalog (hotel
//! listing, package creation, partner onboarding, verification).

pub mod config;
pub mod engine;
pub mod error;
pub mod flows;
pub mod telemetry;
