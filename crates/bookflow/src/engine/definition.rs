use std::fmt;

use serde::{Deserialize, Serialize};

use super::record::AggregateRecord;

/// 1-based position of a step inside its flow.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StepId(pub u8);

impl StepId {
    pub const FIRST: StepId = StepId(1);

    pub const fn next(self) -> StepId {
        StepId(self.0 + 1)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The flows the platform ships. Each maps to exactly one immutable
/// [`FlowDefinition`] in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    HotelListing,
    PackageCreation,
    ManagerOnboarding,
    OperatorOnboarding,
    VerificationHub,
    IdentityVerification,
}

impl FlowKind {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::HotelListing,
            Self::PackageCreation,
            Self::ManagerOnboarding,
            Self::OperatorOnboarding,
            Self::VerificationHub,
            Self::IdentityVerification,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HotelListing => "Hotel Listing",
            Self::PackageCreation => "Package Creation",
            Self::ManagerOnboarding => "Manager Onboarding",
            Self::OperatorOnboarding => "Operator Onboarding",
            Self::VerificationHub => "Verification Hub",
            Self::IdentityVerification => "Identity Verification",
        }
    }

    /// URL-safe name used in API paths and draft keys.
    pub const fn slug(self) -> &'static str {
        match self {
            Self::HotelListing => "hotel-listing",
            Self::PackageCreation => "package-creation",
            Self::ManagerOnboarding => "manager-onboarding",
            Self::OperatorOnboarding => "operator-onboarding",
            Self::VerificationHub => "verification-hub",
            Self::IdentityVerification => "identity-verification",
        }
    }

    pub fn from_slug(value: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|kind| kind.slug() == value)
    }
}

/// How a step's completion is derived from the aggregate record.
///
/// Rules are data rather than closures so definitions stay `'static` and a
/// rule is total over any partial record: absent fields simply resolve to
/// incomplete.
#[derive(Debug, Clone, Copy)]
pub enum CompletionRule {
    /// Complete once every listed field resolves to a non-empty value.
    /// Field names may use `.` to reach one level into a nested object.
    Fields(&'static [&'static str]),
    /// Never derived from the record. Confirmation/review screens carry no
    /// data of their own and only finish by submitting the flow.
    Never,
}

impl CompletionRule {
    pub(crate) fn resolve(&self, record: &AggregateRecord) -> bool {
        match self {
            CompletionRule::Fields(fields) => {
                fields.iter().all(|field| record.field_complete(field))
            }
            CompletionRule::Never => false,
        }
    }
}

/// Where a freshly opened session should place its cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeRule {
    /// Lowest-ordered required step whose completion rule is unmet.
    FirstIncomplete,
    /// Always reopen at step 1 regardless of accumulated data.
    AlwaysFirst,
}

/// Non-linear transition: submitting `source` with its `signal` set jumps
/// the cursor to `target` instead of advancing.
#[derive(Debug, Clone, Copy)]
pub struct LoopRule {
    pub source: StepId,
    pub target: StepId,
    /// Field looked up in the submitted partial (`true` fires the rule)
    /// unless an explicit signal name is passed alongside the submission.
    pub signal: &'static str,
}

/// One step of a flow, fixed at definition time.
#[derive(Debug, Clone)]
pub struct StepDescriptor {
    pub id: StepId,
    /// Stable symbolic name used in logs and API payloads.
    pub key: &'static str,
    pub title: &'static str,
    pub required: bool,
    pub completion: CompletionRule,
}

/// Immutable description of one flow: its ordered steps, resume behavior,
/// and any non-linear transition rules.
#[derive(Debug, Clone)]
pub struct FlowDefinition {
    kind: FlowKind,
    steps: Vec<StepDescriptor>,
    resume_rule: ResumeRule,
    loop_rules: Vec<LoopRule>,
}

impl FlowDefinition {
    pub fn new(
        kind: FlowKind,
        steps: Vec<StepDescriptor>,
        resume_rule: ResumeRule,
        loop_rules: Vec<LoopRule>,
    ) -> Self {
        debug_assert!(!steps.is_empty(), "a flow needs at least one step");
        debug_assert!(
            steps
                .iter()
                .enumerate()
                .all(|(index, step)| step.id.0 as usize == index + 1),
            "step ids must be consecutive starting at 1"
        );
        debug_assert!(
            loop_rules.iter().all(|rule| {
                steps.iter().any(|step| step.id == rule.source)
                    && steps.iter().any(|step| step.id == rule.target)
            }),
            "loop rules must reference existing steps"
        );

        Self {
            kind,
            steps,
            resume_rule,
            loop_rules,
        }
    }

    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    pub fn steps(&self) -> &[StepDescriptor] {
        &self.steps
    }

    pub fn step(&self, id: StepId) -> Option<&StepDescriptor> {
        self.steps.iter().find(|step| step.id == id)
    }

    pub fn first_step_id(&self) -> StepId {
        StepId::FIRST
    }

    pub fn last_step_id(&self) -> StepId {
        StepId(self.steps.len() as u8)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn resume_rule(&self) -> ResumeRule {
        self.resume_rule
    }

    pub fn loop_rules(&self) -> &[LoopRule] {
        &self.loop_rules
    }
}
