use crate::infra::{AppState, InMemoryDraftRepository, InMemorySubmissionGateway};
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use bookflow::engine::{
    BackNavigation, FlowKind, FlowSession, OwnerId, StepId, StepOutcome,
};
use bookflow::error::AppError;
use bookflow::flows::definition_for;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub(crate) type ApiFlowSession = FlowSession<InMemoryDraftRepository, InMemorySubmissionGateway>;

/// Live sessions keyed by owner and flow kind, plus the collaborators new
/// sessions are opened against.
pub(crate) struct FlowServiceState {
    sessions: Mutex<HashMap<(String, FlowKind), ApiFlowSession>>,
    drafts: Arc<InMemoryDraftRepository>,
    submissions: Arc<InMemorySubmissionGateway>,
}

impl FlowServiceState {
    pub(crate) fn new(
        drafts: Arc<InMemoryDraftRepository>,
        submissions: Arc<InMemorySubmissionGateway>,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            drafts,
            submissions,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitStepRequest {
    #[serde(default)]
    pub(crate) partial: Map<String, Value>,
    #[serde(default)]
    pub(crate) signal: Option<String>,
}

pub(crate) fn with_flow_routes(state: Arc<FlowServiceState>) -> axum::Router {
    axum::Router::new()
        .route(
            "/api/v1/flows/:flow/:owner/open",
            axum::routing::post(open_flow_handler),
        )
        .route(
            "/api/v1/flows/:flow/:owner",
            axum::routing::get(flow_state_handler),
        )
        .route(
            "/api/v1/flows/:flow/:owner/steps/:step",
            axum::routing::post(submit_step_handler),
        )
        .route(
            "/api/v1/flows/:flow/:owner/back",
            axum::routing::post(go_back_handler),
        )
        .route(
            "/api/v1/flows/:flow/:owner/goto/:step",
            axum::routing::post(go_to_step_handler),
        )
        .with_state(state)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn open_flow_handler(
    State(state): State<Arc<FlowServiceState>>,
    Path((flow, owner)): Path<(String, String)>,
) -> Response {
    with_session(&state, &flow, &owner, |session| {
        (StatusCode::OK, Json(session.state_view())).into_response()
    })
}

pub(crate) async fn flow_state_handler(
    State(state): State<Arc<FlowServiceState>>,
    Path((flow, owner)): Path<(String, String)>,
) -> Response {
    with_session(&state, &flow, &owner, |session| {
        (StatusCode::OK, Json(session.state_view())).into_response()
    })
}

pub(crate) async fn submit_step_handler(
    State(state): State<Arc<FlowServiceState>>,
    Path((flow, owner, step)): Path<(String, String, u8)>,
    Json(request): Json<SubmitStepRequest>,
) -> Response {
    let Some(kind) = FlowKind::from_slug(&flow) else {
        return unknown_flow(&flow);
    };

    let mut sessions = state.sessions.lock().expect("session mutex poisoned");
    let session = match entry(&state, &mut sessions, kind, &owner) {
        Ok(session) => session,
        Err(error) => return AppError::from(error).into_response(),
    };

    let outcome = session.submit_step(
        StepId(step),
        request.partial,
        request.signal.as_deref(),
    );
    let view = session.state_view();

    match outcome {
        Ok(StepOutcome::Completed(receipt)) => {
            let payload = json!({
                "outcome": "completed",
                "entity_id": receipt.entity_id,
            });
            sessions.remove(&(owner, kind));
            (StatusCode::OK, Json(payload)).into_response()
        }
        Ok(outcome) => {
            let label = match outcome {
                StepOutcome::Advanced(_) => "advanced",
                StepOutcome::Looped(_) => "looped",
                StepOutcome::Stayed(_) => "stayed",
                StepOutcome::Completed(_) => unreachable!("handled above"),
            };
            let payload = json!({
                "outcome": label,
                "state": view,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => AppError::from(error).into_response(),
    }
}

pub(crate) async fn go_back_handler(
    State(state): State<Arc<FlowServiceState>>,
    Path((flow, owner)): Path<(String, String)>,
) -> Response {
    let Some(kind) = FlowKind::from_slug(&flow) else {
        return unknown_flow(&flow);
    };

    let mut sessions = state.sessions.lock().expect("session mutex poisoned");
    let session = match entry(&state, &mut sessions, kind, &owner) {
        Ok(session) => session,
        Err(error) => return AppError::from(error).into_response(),
    };

    let navigation = session.go_back();
    let view = session.state_view();

    match navigation {
        BackNavigation::MovedBack(_) => {
            let payload = json!({
                "outcome": "moved_back",
                "state": view,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        BackNavigation::Exited => {
            sessions.remove(&(owner, kind));
            let payload = json!({ "outcome": "exited" });
            (StatusCode::OK, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn go_to_step_handler(
    State(state): State<Arc<FlowServiceState>>,
    Path((flow, owner, step)): Path<(String, String, u8)>,
) -> Response {
    with_session(&state, &flow, &owner, |session| {
        match session.go_to_step(StepId(step)) {
            Ok(_) => (StatusCode::OK, Json(session.state_view())).into_response(),
            Err(error) => AppError::from(error).into_response(),
        }
    })
}

fn with_session<F>(state: &FlowServiceState, flow: &str, owner: &str, action: F) -> Response
where
    F: FnOnce(&mut ApiFlowSession) -> Response,
{
    let Some(kind) = FlowKind::from_slug(flow) else {
        return unknown_flow(flow);
    };

    let mut sessions = state.sessions.lock().expect("session mutex poisoned");
    match entry(state, &mut sessions, kind, owner) {
        Ok(session) => action(session),
        Err(error) => AppError::from(error).into_response(),
    }
}

fn entry<'a>(
    state: &FlowServiceState,
    sessions: &'a mut HashMap<(String, FlowKind), ApiFlowSession>,
    kind: FlowKind,
    owner: &str,
) -> Result<&'a mut ApiFlowSession, bookflow::engine::SessionError> {
    use std::collections::hash_map::Entry;

    match sessions.entry((owner.to_string(), kind)) {
        Entry::Occupied(occupied) => Ok(occupied.into_mut()),
        Entry::Vacant(vacant) => {
            let session = FlowSession::open(
                definition_for(kind),
                OwnerId(owner.to_string()),
                state.drafts.clone(),
                state.submissions.clone(),
            )?;
            Ok(vacant.insert(session))
        }
    }
}

fn unknown_flow(flow: &str) -> Response {
    let payload = json!({
        "error": format!("unknown flow '{flow}'"),
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}
