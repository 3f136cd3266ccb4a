use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::{Map, Value};

use bookflow::engine::{
    AggregateRecord, DraftRepository, DraftSnapshot, DraftStoreError, FlowKind, OwnerId,
    SubmissionError, SubmissionGateway, SubmissionReceipt,
};

pub fn partial(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object literal, got {other}"),
    }
}

pub fn owner(name: &str) -> OwnerId {
    OwnerId(name.to_string())
}

#[derive(Default)]
struct StoredDraft {
    record: AggregateRecord,
    finalized: bool,
}

#[derive(Default)]
pub struct InMemoryDrafts {
    drafts: Mutex<HashMap<(String, FlowKind), StoredDraft>>,
}

impl InMemoryDrafts {
    pub fn seed(&self, owner: &OwnerId, kind: FlowKind, record: AggregateRecord) {
        let mut guard = self.drafts.lock().expect("draft mutex poisoned");
        guard.insert(
            (owner.0.clone(), kind),
            StoredDraft {
                record,
                finalized: false,
            },
        );
    }

}

impl DraftRepository for InMemoryDrafts {
    fn load(
        &self,
        owner: &OwnerId,
        kind: FlowKind,
    ) -> Result<Option<DraftSnapshot>, DraftStoreError> {
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

#[derive(Default)]
pub struct InMemoryGateway {
    sequence: AtomicU64,
    accepted: Mutex<Vec<AggregateRecord>>,
}

impl InMemoryGateway {
    pub fn accepted(&self) -> Vec<AggregateRecord> {
        self.accepted.lock().expect("gateway mutex poisoned").clone()
    }
}

impl SubmissionGateway for InMemoryGateway {
    fn submit(
        &self,
        _kind: FlowKind,
        _owner: &OwnerId,
        record: &AggregateRecord,
    ) -> Result<SubmissionReceipt, SubmissionError> {
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

pub fn collaborators() -> (Arc<InMemoryDrafts>, Arc<InMemoryGateway>) {
    (
        Arc::new(InMemoryDrafts::default()),
        Arc::new(InMemoryGateway::default()),
    )
}
