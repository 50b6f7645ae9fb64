//! Shared, read-only state of the health router.

use std::sync::Arc;

use crate::core::LivenessState;

/// State handed to every request handler.
///
/// Identity fields are immutable copies taken at construction; the liveness reader
/// is the only thing connected to the worker.
#[derive(Clone, Debug)]
pub struct FacadeState {
    pub service_name: Arc<str>,
    pub agent_name: Arc<str>,
    pub liveness: LivenessState,
}

impl FacadeState {
    pub fn new(service_name: &str, agent_name: &str, liveness: LivenessState) -> Self {
        Self {
            service_name: Arc::from(service_name),
            agent_name: Arc::from(agent_name),
            liveness,
        }
    }
}
