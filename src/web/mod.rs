//! # Health facade: the HTTP surface platform probes poll.
//!
//! | Method | Path       | Body                                      |
//! |--------|------------|-------------------------------------------|
//! | GET    | `/`        | `{status, service, agent_name, message}`  |
//! | GET    | `/healthz` | `{status, service}`                       |
//!
//! Read-only, unauthenticated, always `200` + `"ok"`.
//!
//! ## Lifecycle
//! ```text
//! HealthFacade::bind() ── Err ──► ServerError::Bind
//!        │
//!        ▼
//! BoundFacade::serve_until(shutdown)
//!        ├─ server error      ──► ServerError::Serve
//!        └─ shutdown resolves ──► stop accepting
//!                                 └─► drain in-flight (≤ shutdown_grace) ──► Ok(())
//! ```

mod handlers;
pub mod response_types;
mod state;

use std::{
    future::{Future, IntoFuture},
    io,
    net::SocketAddr,
    time::Duration,
};

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{config::ServerConfig, core::LivenessState, error::ServerError};

pub use self::state::FacadeState;

/// Builds the health router over the given state.
pub fn router(state: FacadeState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz))
        .with_state(state)
}

/// Health facade, configured but not yet bound.
#[derive(Debug)]
pub struct HealthFacade {
    config: ServerConfig,
    state: FacadeState,
}

impl HealthFacade {
    /// Creates a facade reporting `agent_name` and reading (never writing) `liveness`.
    pub fn new(config: ServerConfig, agent_name: &str, liveness: LivenessState) -> Self {
        let state = FacadeState::new(&config.service_name, agent_name, liveness);
        Self { config, state }
    }

    /// Returns the router this facade serves.
    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// Binds the configured address.
    pub async fn bind(self) -> Result<BoundFacade, ServerError> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| ServerError::Bind { addr, source })?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| ServerError::Bind { addr, source })?;

        Ok(BoundFacade {
            listener,
            router: self.router(),
            grace: self.config.shutdown_grace,
            local_addr,
        })
    }

    /// Binds and serves until `shutdown` resolves. Blocks for the life of the server.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = io::Result<()>> + Send,
    {
        self.bind().await?.serve_until(shutdown).await
    }
}

/// Health facade with a bound listener.
#[derive(Debug)]
pub struct BoundFacade {
    listener: TcpListener,
    router: Router,
    grace: Duration,
    local_addr: SocketAddr,
}

impl BoundFacade {
    /// Address actually bound (resolves port `0`).
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Serves requests until `shutdown` resolves, then drains in-flight requests.
    ///
    /// An `Err` from `shutdown` means signal handling could not be set up: the
    /// server is stopped and [`ServerError::Signal`] is returned.
    pub async fn serve_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = io::Result<()>> + Send,
    {
        let BoundFacade {
            listener,
            router,
            grace,
            local_addr,
        } = self;

        let stop = CancellationToken::new();
        let server = axum::serve(listener, router)
            .with_graceful_shutdown(stop.clone().cancelled_owned())
            .into_future();
        tokio::pin!(server);

        info!(addr = %local_addr, "health server listening");

        let shutdown_result = tokio::select! {
            res = &mut server => {
                return res.map_err(|source| ServerError::Serve { source });
            }
            res = shutdown => res,
        };

        stop.cancel();
        info!(?grace, "health server stopping; draining in-flight requests");

        let drained = tokio::time::timeout(grace, server).await;

        if let Err(source) = shutdown_result {
            return Err(ServerError::Signal { source });
        }
        match drained {
            Ok(res) => {
                res.map_err(|source| ServerError::Serve { source })?;
                info!("health server stopped");
                Ok(())
            }
            Err(_elapsed) => {
                warn!(?grace, "in-flight requests did not finish within grace; abandoning them");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Method, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::core::liveness::liveness;
    use crate::error::WorkerError;

    fn facade_state() -> (crate::core::LivenessWriter, FacadeState) {
        let (writer, reader) = liveness();
        (writer, FacadeState::new("test-service", "voice-agent", reader))
    }

    async fn get_json(router: Router, path: &str) -> (StatusCode, Value) {
        let resp = router
            .oneshot(Request::get(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_root_payload() {
        let (_writer, state) = facade_state();
        let (status, body) = get_json(router(state), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "test-service");
        assert_eq!(body["agent_name"], "voice-agent");
        assert_eq!(body["message"], response_types::ROOT_MESSAGE);
    }

    #[tokio::test]
    async fn test_healthz_payload_is_minimal() {
        let (_writer, state) = facade_state();
        let (status, body) = get_json(router(state), "/healthz").await;

        assert_eq!(status, StatusCode::OK);
        let obj = body.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["status"], "ok");
        assert_eq!(obj["service"], "test-service");
    }

    #[tokio::test]
    async fn test_ok_even_when_worker_failed() {
        let (writer, state) = facade_state();
        writer.mark_running();
        writer.mark_failed(&WorkerError::failed("coordinator unreachable"));

        for path in ["/", "/healthz"] {
            let (status, body) = get_json(router(state.clone()), path).await;
            assert_eq!(status, StatusCode::OK, "{path}");
            assert_eq!(body["status"], "ok", "{path}");
        }
    }

    #[tokio::test]
    async fn test_unknown_path_and_method() {
        let (_writer, state) = facade_state();

        let resp = router(state.clone())
            .oneshot(Request::get("/admin").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = router(state)
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/healthz")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    fn local_config(port: u16) -> ServerConfig {
        ServerConfig {
            bind_address: "127.0.0.1".parse().unwrap(),
            port,
            shutdown_grace: Duration::from_secs(2),
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn test_bind_conflict_is_bind_error() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let (_writer, reader) = liveness();
        let err = HealthFacade::new(local_config(port), "a", reader)
            .bind()
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "server_bind");
    }

    #[tokio::test]
    async fn test_shutdown_returns_ok() {
        let (_writer, reader) = liveness();
        let bound = HealthFacade::new(local_config(0), "a", reader)
            .bind()
            .await
            .unwrap();
        assert_ne!(bound.local_addr().port(), 0);

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(bound.serve_until(async move {
            let _ = rx.await;
            Ok(())
        }));

        tx.send(()).unwrap();
        let res = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server should stop")
            .unwrap();
        assert!(res.is_ok());
    }

    #[tokio::test]
    async fn test_signal_setup_failure_is_signal_error() {
        let (_writer, reader) = liveness();
        let bound = HealthFacade::new(local_config(0), "a", reader)
            .bind()
            .await
            .unwrap();

        let err = bound
            .serve_until(async { Err(io::Error::new(io::ErrorKind::Other, "no signals")) })
            .await
            .unwrap_err();
        assert_eq!(err.as_label(), "server_signal");
    }
}
