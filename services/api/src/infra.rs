use bookflow::engine::{
    AggregateRecord, DraftRepository, DraftSnapshot, DraftStoreError, FlowKind, OwnerId,
    SubmissionError, SubmissionGateway, SubmissionReceipt,
};
use bookflow::flows::verification::{ComparisonError, ComparisonGateway, ComparisonOutcome};
use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct StoredDraft {
    record: AggregateRecord,
    finalized: bool,
}

/// Process-local draft store. Finalized drafts stop coming back from
/// `load`, matching how the platform's backing store treats submitted
/// flows.
#[derive(Default)]
pub(crate) struct InMemoryDraftRepository {
    drafts: Mutex<HashMap<(String, FlowKind), StoredDraft>>,
}

impl DraftRepository for InMemoryDraftRepository {
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

static ENTITY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

/// Accepts finished records and hands out sequential entity identifiers.
#[derive(Default)]
pub(crate) struct InMemorySubmissionGateway {
    accepted: Mutex<Vec<(FlowKind, AggregateRecord)>>,
}

impl InMemorySubmissionGateway {
    pub(crate) fn accepted(&self) -> Vec<(FlowKind, AggregateRecord)> {
        self.accepted
            .lock()
            .expect("submission mutex poisoned")
            .clone()
    }
}

impl SubmissionGateway for InMemorySubmissionGateway {
    fn submit(
        &self,
        kind: FlowKind,
        _owner: &OwnerId,
        record: &AggregateRecord,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let id = ENTITY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        self.accepted
            .lock()
            .expect("submission mutex poisoned")
            .push((kind, record.clone()));
        Ok(SubmissionReceipt {
            entity_id: format!("entity-{id:06}"),
        })
    }
}

/// Stand-in for the face comparison provider used by demos and local runs.
pub(crate) struct StubComparisonGateway {
    pub(crate) score: u8,
}

impl Default for StubComparisonGateway {
    fn default() -> Self {
        Self { score: 92 }
    }
}

impl ComparisonGateway for StubComparisonGateway {
    fn compare_face_to_id(
        &self,
        _id_image: &str,
        _selfie_image: &str,
    ) -> Result<ComparisonOutcome, ComparisonError> {
        Ok(ComparisonOutcome {
            matched: self.score >= 70,
            score: self.score,
            reason: (self.score < 70).then(|| "similarity below threshold".to_string()),
        })
    }
}
