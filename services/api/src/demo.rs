use crate::infra::{InMemoryDraftRepository, InMemorySubmissionGateway, StubComparisonGateway};
use bookflow::engine::{FlowKind, FlowSession, OwnerId, StepId, StepOutcome};
use bookflow::flows::verification::{IdentityCapture, SubFlowComposer, SubFlowProgress};
use bookflow::flows::{
    definition_for, hotel_listing_definition, identity_subflow_definition,
    verification_hub_definition,
};
use clap::Args;
use serde_json::{json, Map, Value};
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Owner identifier used for the demo drafts
    #[arg(long, default_value = "demo-partner")]
    pub(crate) owner: String,
    /// Skip the verification hub portion of the demo
    #[arg(long)]
    pub(crate) skip_verification: bool,
    /// Matching score the stubbed comparison provider reports (0-100)
    #[arg(long, default_value_t = 92)]
    pub(crate) matching_score: u8,
}

pub(crate) fn run_flow_catalog() -> Result<(), bookflow::error::AppError> {
    println!("Flow catalog");
    for kind in FlowKind::ordered() {
        let definition = definition_for(kind);
        println!("\n{} ({})", kind.label(), kind.slug());
        for step in definition.steps() {
            let marker = if step.required { "required" } else { "optional" };
            println!("  {}. {} [{}] ({})", step.id, step.title, marker, step.key);
        }
        for rule in definition.loop_rules() {
            println!(
                "  loop: step {} -> step {} on '{}'",
                rule.source, rule.target, rule.signal
            );
        }
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), bookflow::error::AppError> {
    let DemoArgs {
        owner,
        skip_verification,
        matching_score,
    } = args;

    println!("Booking platform flow demo");

    let drafts = Arc::new(InMemoryDraftRepository::default());
    let submissions = Arc::new(InMemorySubmissionGateway::default());

    run_listing_walkthrough(&owner, drafts.clone(), submissions.clone())?;

    if !skip_verification {
        run_verification_walkthrough(&owner, matching_score, drafts, submissions.clone())?;
    }

    let accepted = submissions.accepted();
    println!(
        "\n{} record(s) accepted by the submission gateway",
        accepted.len()
    );
    for (kind, _record) in &accepted {
        println!("- {}", kind.label());
    }

    Ok(())
}

fn run_listing_walkthrough(
    owner: &str,
    drafts: Arc<InMemoryDraftRepository>,
    submissions: Arc<InMemorySubmissionGateway>,
) -> Result<(), bookflow::error::AppError> {
    println!("\nHotel listing walkthrough");

    let mut session = FlowSession::open(
        hotel_listing_definition(),
        OwnerId(owner.to_string()),
        drafts.clone(),
        submissions.clone(),
    )?;

    let steps: Vec<Value> = vec![
        json!({ "propertyType": "hotel" }),
        json!({ "hotelName": "Harbor Light Hotel", "description": "Fifty rooms above the old port" }),
        json!({ "location": { "address": "2 Quay St", "city": "Turku", "country": "FI" } }),
        json!({ "amenities": ["wifi", "breakfast", "sauna"] }),
        json!({ "rooms": [{ "name": "Harbor Double", "capacity": 2, "rate": 140 }] }),
        json!({ "policies": { "checkIn": "15:00", "checkOut": "11:00", "cancellation": "flexible" } }),
        json!({ "photos": ["facade.jpg", "harbor-double.jpg"] }),
    ];

    for payload in steps {
        let step = session.cursor();
        let outcome = session.submit_step(step, object(payload), None)?;
        println!(
            "- step {} submitted -> cursor {} ({}% complete)",
            step,
            match outcome {
                StepOutcome::Advanced(next) => next,
                StepOutcome::Looped(target) => target,
                StepOutcome::Stayed(current) => current,
                StepOutcome::Completed(_) => session.cursor(),
            },
            session.progress_percent()
        );
    }

    let outcome = session.submit_step(session.cursor(), Map::new(), None)?;
    match outcome {
        StepOutcome::Completed(receipt) => {
            println!("- listing published as {}", receipt.entity_id);
        }
        other => println!("- unexpected review outcome: {other:?}"),
    }

    Ok(())
}

fn run_verification_walkthrough(
    owner: &str,
    matching_score: u8,
    drafts: Arc<InMemoryDraftRepository>,
    submissions: Arc<InMemorySubmissionGateway>,
) -> Result<(), bookflow::error::AppError> {
    println!("\nPartner verification walkthrough");

    let comparisons = StubComparisonGateway {
        score: matching_score,
    };

    let mut hub = FlowSession::open(
        verification_hub_definition(),
        OwnerId(owner.to_string()),
        drafts,
        submissions,
    )?;

    let mut composer = SubFlowComposer::open(identity_subflow_definition(), hub.record());
    println!(
        "- identity sub-flow opens at sub-step {}",
        composer.cursor()
    );

    let mut capture = IdentityCapture::new();
    capture.submit_id("passport.jpg");
    match capture.submit_selfie(&comparisons, "selfie.jpg") {
        Ok(outcome) if outcome.matched => {
            println!("- identity matched (score {})", outcome.score);
        }
        Ok(outcome) => {
            println!(
                "- identity did not match (score {}): {}",
                outcome.score,
                outcome.reason.as_deref().unwrap_or("no reason given")
            );
            return Ok(());
        }
        Err(err) => {
            println!("- comparison unavailable: {err}");
            return Ok(());
        }
    }

    let identity_partial = capture
        .matched_partial()
        .expect("a matched capture yields a partial");
    if let SubFlowProgress::Advanced { parent_partial, .. } =
        composer.submit_step(StepId(1), identity_partial, None)?
    {
        hub.apply_partial(parent_partial)?;
        println!("- identity evidence saved to the hub draft");
    }

    let progress = composer.submit_step(
        StepId(2),
        object(json!({ "ownershipDocs": ["deed.pdf", "registry-extract.pdf"] })),
        None,
    )?;
    if let SubFlowProgress::Completed { parent_partial } = progress {
        let outcome = hub.submit_step(StepId(1), parent_partial, None)?;
        println!(
            "- verification step folded into the hub -> {:?} ({}% complete)",
            outcome,
            hub.progress_percent()
        );
    }

    let outcome = hub.submit_step(hub.cursor(), Map::new(), None)?;
    match outcome {
        StepOutcome::Completed(receipt) => {
            println!("- verification submitted as {}", receipt.entity_id);
        }
        other => println!("- unexpected review outcome: {other:?}"),
    }

    Ok(())
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
