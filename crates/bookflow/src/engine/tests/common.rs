use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::{Map, Value};

use crate::engine::definition::{
    CompletionRule, FlowDefinition, FlowKind, ResumeRule, StepDescriptor, StepId,
};
use crate::engine::record::AggregateRecord;
use crate::engine::repository::{
    DraftRepository, DraftSnapshot, DraftStoreError, OwnerId, SubmissionError, SubmissionGateway,
    SubmissionReceipt,
};

pub(super) fn partial(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object literal, got {other}"),
    }
}

pub(super) fn owner(name: &str) -> OwnerId {
    OwnerId(name.to_string())
}

/// Three required data steps plus an unrequired review step.
pub(super) fn sample_definition() -> FlowDefinition {
    FlowDefinition::new(
        FlowKind::HotelListing,
        vec![
            StepDescriptor {
                id: StepId(1),
                key: "basics",
                title: "Basics",
                required: true,
                completion: CompletionRule::Fields(&["name"]),
            },
            StepDescriptor {
                id: StepId(2),
                key: "location",
                title: "Location",
                required: true,
                completion: CompletionRule::Fields(&["location"]),
            },
            StepDescriptor {
                id: StepId(3),
                key: "photos",
                title: "Photos",
                required: true,
                completion: CompletionRule::Fields(&["photos"]),
            },
            StepDescriptor {
                id: StepId(4),
                key: "review",
                title: "Review",
                required: false,
                completion: CompletionRule::Never,
            },
        ],
        ResumeRule::FirstIncomplete,
        Vec::new(),
    )
}

#[derive(Default)]
struct StoredDraft {
    record: AggregateRecord,
    finalized: bool,
}

/// In-memory draft store with a switch to simulate an outage.
#[derive(Default)]
pub(super) struct MemoryDrafts {
    drafts: Mutex<HashMap<(String, FlowKind), StoredDraft>>,
    unavailable: AtomicBool,
    saves: AtomicU64,
}

impl MemoryDrafts {
    pub(super) fn set_unavailable(&self, value: bool) {
        self.unavailable.store(value, Ordering::Relaxed);
    }

    pub(super) fn save_count(&self) -> u64 {
        self.saves.load(Ordering::Relaxed)
    }

    pub(super) fn seed(&self, owner: &OwnerId, kind: FlowKind, record: AggregateRecord) {
        let mut guard = self.drafts.lock().expect("draft mutex poisoned");
        guard.insert(
            (owner.0.clone(), kind),
            StoredDraft {
                record,
                finalized: false,
            },
        );
    }

    pub(super) fn stored_record(&self, owner: &OwnerId, kind: FlowKind) -> Option<AggregateRecord> {
        let guard = self.drafts.lock().expect("draft mutex poisoned");
        guard
            .get(&(owner.0.clone(), kind))
            .map(|draft| draft.record.clone())
    }
}

impl DraftRepository for MemoryDrafts {
    fn load(
        &self,
        owner: &OwnerId,
        kind: FlowKind,
    ) -> Result<Option<DraftSnapshot>, DraftStoreError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(DraftStoreError::Unavailable("store offline".to_string()));
        }

        let guard = self.drafts.lock().expect("draft mutex poisoned");
        Ok(guard
            .get(&(owner.0.clone(), kind))
            .filter(|draft| !draft.finalized)
            .map(|draft| DraftSnapshot {
                flow_kind: kind,
                owner_id: owner.clone(),
                record: draft.record.clone(),
                updated_at: Utc::now(),
            }))
    }

    fn save(
        &self,
        owner: &OwnerId,
        kind: FlowKind,
        record: &AggregateRecord,
        is_final: bool,
    ) -> Result<(), DraftStoreError> {
        if self.unavailable.load(Ordering::Relaxed) {
            return Err(DraftStoreError::Unavailable("store offline".to_string()));
        }

        self.saves.fetch_add(1, Ordering::Relaxed);
        let mut guard = self.drafts.lock().expect("draft mutex poisoned");
        guard.insert(
            (owner.0.clone(), kind),
            StoredDraft {
                record: record.clone(),
                finalized: is_final,
            },
        );
        Ok(())
    }
}

/// In-memory submission gateway that can be told to reject.
#[derive(Default)]
pub(super) struct MemoryGateway {
    rejecting: AtomicBool,
    accepted: Mutex<Vec<AggregateRecord>>,
    sequence: AtomicU64,
}

impl MemoryGateway {
    pub(super) fn set_rejecting(&self, value: bool) {
        self.rejecting.store(value, Ordering::Relaxed);
    }

    pub(super) fn accepted(&self) -> Vec<AggregateRecord> {
        self.accepted.lock().expect("gateway mutex poisoned").clone()
    }
}

impl SubmissionGateway for MemoryGateway {
    fn submit(
        &self,
        _kind: FlowKind,
        _owner: &OwnerId,
        record: &AggregateRecord,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        if self.rejecting.load(Ordering::Relaxed) {
            return Err(SubmissionError::Rejected("record incomplete".to_string()));
        }

        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        self.accepted
            .lock()
            .expect("gateway mutex poisoned")
            .push(record.clone());
        Ok(SubmissionReceipt {
            entity_id: format!("entity-{id:06}"),
        })
    }
}

pub(super) fn open_session(
    definition: FlowDefinition,
    owner_name: &str,
    drafts: Arc<MemoryDrafts>,
    gateway: Arc<MemoryGateway>,
) -> crate::engine::session::FlowSession<MemoryDrafts, MemoryGateway> {
    crate::engine::session::FlowSession::open(definition, owner(owner_name), drafts, gateway)
        .expect("session opens")
}
