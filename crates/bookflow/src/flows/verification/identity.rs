use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::debug;

/// The linear capture machine inside the identity sub-flow's first step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapturePhase {
    IdCapture,
    SelfieCapture,
    Comparing,
    Result,
}

impl CapturePhase {
    pub const fn label(self) -> &'static str {
        match self {
            Self::IdCapture => "id_capture",
            Self::SelfieCapture => "selfie_capture",
            Self::Comparing => "comparing",
            Self::Result => "result",
        }
    }
}

/// Result of one face-to-document comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonOutcome {
    pub matched: bool,
    /// 0-100 similarity score as reported by the comparison provider.
    pub score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Seam to the external face comparison provider.
pub trait ComparisonGateway: Send + Sync {
    fn compare_face_to_id(
        &self,
        id_image: &str,
        selfie_image: &str,
    ) -> Result<ComparisonOutcome, ComparisonError>;
}

/// A comparison *error* is distinct from a clean non-match: errors return
/// the machine to selfie capture for a manual retry, a non-match is a
/// normal result the user may answer with "try again".
#[derive(Debug, thiserror::Error)]
pub enum ComparisonError {
    #[error("comparison service unavailable: {0}")]
    Unavailable(String),
}

/// Drives `id capture -> selfie capture -> comparing -> result`.
///
/// The comparing phase is one-shot per selfie submission: exactly one
/// outbound call, then either the result phase or back to selfie capture.
#[derive(Debug)]
pub struct IdentityCapture {
    phase: CapturePhase,
    id_image: Option<String>,
    selfie_image: Option<String>,
    outcome: Option<ComparisonOutcome>,
}

impl IdentityCapture {
    pub fn new() -> Self {
        Self {
            phase: CapturePhase::IdCapture,
            id_image: None,
            selfie_image: None,
            outcome: None,
        }
    }

    pub fn phase(&self) -> CapturePhase {
        self.phase
    }

    pub fn outcome(&self) -> Option<&ComparisonOutcome> {
        self.outcome.as_ref()
    }

    /// Stores the document capture and moves on to the selfie.
    pub fn submit_id(&mut self, id_image: &str) {
        self.id_image = Some(id_image.to_string());
        self.outcome = None;
        self.phase = CapturePhase::SelfieCapture;
    }

    /// Submits a selfie and performs the single comparison call.
    ///
    /// On a gateway error the machine returns to selfie capture with its
    /// captures unchanged; the caller retries with a fresh selfie when the
    /// user is ready. A successful call always lands in the result phase,
    /// match or not.
    pub fn submit_selfie<C: ComparisonGateway>(
        &mut self,
        gateway: &C,
        selfie_image: &str,
    ) -> Result<&ComparisonOutcome, ComparisonError> {
        let id_image = self
            .id_image
            .clone()
            .unwrap_or_default();
        self.selfie_image = Some(selfie_image.to_string());
        self.phase = CapturePhase::Comparing;

        match gateway.compare_face_to_id(&id_image, selfie_image) {
            Ok(outcome) => {
                debug!(
                    matched = outcome.matched,
                    score = outcome.score,
                    "identity comparison finished"
                );
                self.phase = CapturePhase::Result;
                self.outcome = Some(outcome);
                Ok(self.outcome.as_ref().expect("outcome just stored"))
            }
            Err(err) => {
                self.phase = CapturePhase::SelfieCapture;
                Err(err)
            }
        }
    }

    /// The "try again" choice offered after a non-match: restarts from
    /// document capture with everything cleared.
    pub fn retry(&mut self) {
        self.phase = CapturePhase::IdCapture;
        self.id_image = None;
        self.selfie_image = None;
        self.outcome = None;
    }

    /// The partial update a matched capture contributes to the identity
    /// sub-flow's first step. `None` until a successful match is on hand.
    pub fn matched_partial(&self) -> Option<Map<String, Value>> {
        let outcome = self.outcome.as_ref().filter(|outcome| outcome.matched)?;
        let value = json!({
            "idImage": self.id_image,
            "selfieImage": self.selfie_image,
            "matchingScore": outcome.score,
        });
        match value {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }
}

impl Default for IdentityCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct ScriptedGateway {
        responses: Vec<Result<ComparisonOutcome, ComparisonError>>,
        calls: AtomicU32,
    }

    impl ScriptedGateway {
        fn new(responses: Vec<Result<ComparisonOutcome, ComparisonError>>) -> Self {
            Self {
                responses,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::Relaxed)
        }
    }

    impl ComparisonGateway for ScriptedGateway {
        fn compare_face_to_id(
            &self,
            _id_image: &str,
            _selfie_image: &str,
        ) -> Result<ComparisonOutcome, ComparisonError> {
            let index = self.calls.fetch_add(1, Ordering::Relaxed) as usize;
            match self.responses.get(index) {
                Some(Ok(outcome)) => Ok(outcome.clone()),
                Some(Err(ComparisonError::Unavailable(message))) => {
                    Err(ComparisonError::Unavailable(message.clone()))
                }
                None => panic!("gateway called more times than scripted"),
            }
        }
    }

    fn matched(score: u8) -> ComparisonOutcome {
        ComparisonOutcome {
            matched: true,
            score,
            reason: None,
        }
    }

    fn non_match() -> ComparisonOutcome {
        ComparisonOutcome {
            matched: false,
            score: 31,
            reason: Some("face does not match document".to_string()),
        }
    }

    #[test]
    fn walks_the_happy_path_with_one_comparison_call() {
        let gateway = ScriptedGateway::new(vec![Ok(matched(92))]);
        let mut capture = IdentityCapture::new();
        assert_eq!(capture.phase(), CapturePhase::IdCapture);

        capture.submit_id("id-front.jpg");
        assert_eq!(capture.phase(), CapturePhase::SelfieCapture);

        let outcome = capture
            .submit_selfie(&gateway, "selfie.jpg")
            .expect("comparison succeeds");
        assert!(outcome.matched);
        assert_eq!(capture.phase(), CapturePhase::Result);
        assert_eq!(gateway.calls(), 1);

        let partial = capture.matched_partial().expect("match produces a partial");
        assert_eq!(partial.get("matchingScore"), Some(&serde_json::json!(92)));
    }

    #[test]
    fn gateway_error_returns_to_selfie_capture() {
        let gateway = ScriptedGateway::new(vec![
            Err(ComparisonError::Unavailable("timeout".to_string())),
            Ok(matched(88)),
        ]);
        let mut capture = IdentityCapture::new();
        capture.submit_id("id-front.jpg");

        let error = capture.submit_selfie(&gateway, "selfie.jpg");
        assert!(error.is_err());
        assert_eq!(capture.phase(), CapturePhase::SelfieCapture);
        assert!(capture.outcome().is_none(), "captures unchanged on failure");

        // Retry is manual: nothing fires until the next selfie submission.
        assert_eq!(gateway.calls(), 1);
        capture
            .submit_selfie(&gateway, "selfie-2.jpg")
            .expect("second attempt succeeds");
        assert_eq!(capture.phase(), CapturePhase::Result);
    }

    #[test]
    fn non_match_is_a_result_offering_manual_retry() {
        let gateway = ScriptedGateway::new(vec![Ok(non_match())]);
        let mut capture = IdentityCapture::new();
        capture.submit_id("id-front.jpg");

        let outcome = capture
            .submit_selfie(&gateway, "selfie.jpg")
            .expect("comparison call itself succeeds");
        assert!(!outcome.matched);
        assert_eq!(capture.phase(), CapturePhase::Result);
        assert!(capture.matched_partial().is_none());

        capture.retry();
        assert_eq!(capture.phase(), CapturePhase::IdCapture);
        assert!(capture.outcome().is_none());
    }
}
