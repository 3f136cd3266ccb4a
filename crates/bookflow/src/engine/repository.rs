use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::definition::FlowKind;
use super::record::AggregateRecord;

/// Identifier wrapper for the account owning a draft.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub String);

/// A persisted, incomplete record keyed by owner and flow kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftSnapshot {
    pub flow_kind: FlowKind,
    pub owner_id: OwnerId,
    pub record: AggregateRecord,
    pub updated_at: DateTime<Utc>,
}

/// Storage abstraction so the session shell can be exercised in isolation.
///
/// `save` with `is_final` set tells the store the draft may move to a
/// finalized state and stop coming back from `load`.
pub trait DraftRepository: Send + Sync {
    fn load(
        &self,
        owner: &OwnerId,
        kind: FlowKind,
    ) -> Result<Option<DraftSnapshot>, DraftStoreError>;

    fn save(
        &self,
        owner: &OwnerId,
        kind: FlowKind,
        record: &AggregateRecord,
        is_final: bool,
    ) -> Result<(), DraftStoreError>;
}

/// Draft persistence failures are recoverable: the session keeps its
/// in-memory record and cursor and the caller retries.
#[derive(Debug, thiserror::Error)]
pub enum DraftStoreError {
    #[error("draft store unavailable: {0}")]
    Unavailable(String),
}

/// Receipt for a finished record accepted by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub entity_id: String,
}

/// Backend seam accepting a finished record.
pub trait SubmissionGateway: Send + Sync {
    fn submit(
        &self,
        kind: FlowKind,
        owner: &OwnerId,
        record: &AggregateRecord,
    ) -> Result<SubmissionReceipt, SubmissionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("submission service unavailable: {0}")]
    Unavailable(String),
}
