//! Response bodies of the health endpoints.

use serde::{Deserialize, Serialize};

/// Value of the `status` field; always reported.
pub const STATUS_OK: &str = "ok";
/// Value of the root endpoint's `message` field.
pub const ROOT_MESSAGE: &str = "Agent worker is running";

/// `GET /`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub service: String,
    pub agent_name: String,
    pub message: String,
}

/// `GET /healthz`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthzResponse {
    pub status: String,
    pub service: String,
}
