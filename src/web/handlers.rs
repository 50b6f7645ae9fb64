//! Health endpoint handlers.
//!
//! Both answer `200` with `status: "ok"` regardless of what the worker is doing:
//! the probe only needs a responsive port. Worker liveness is traced, not reported.

use axum::{extract::State, response::Json};
use tracing::debug;

use super::response_types::{HealthzResponse, RootResponse, ROOT_MESSAGE, STATUS_OK};
use super::state::FacadeState;

/// `GET /`: service identity plus a fixed status.
pub async fn root(State(state): State<FacadeState>) -> Json<RootResponse> {
    debug!(
        path = "/",
        worker_running = state.liveness.is_running(),
        "health request"
    );
    Json(RootResponse {
        status: STATUS_OK.to_string(),
        service: state.service_name.to_string(),
        agent_name: state.agent_name.to_string(),
        message: ROOT_MESSAGE.to_string(),
    })
}

/// `GET /healthz`: minimal payload for automated probes.
pub async fn healthz(State(state): State<FacadeState>) -> Json<HealthzResponse> {
    debug!(
        path = "/healthz",
        worker_running = state.liveness.is_running(),
        "health request"
    );
    Json(HealthzResponse {
        status: STATUS_OK.to_string(),
        service: state.service_name.to_string(),
    })
}
