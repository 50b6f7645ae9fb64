//! `Supervisor::run` against a real termination signal.
//!
//! Kept in its own test binary: the signal is delivered to the whole process.
#![cfg(unix)]

use std::time::{Duration, Instant};

use agenthost::{
    ServerConfig, Settings, Supervisor, WorkerConfig, WorkerError, WorkerFn, WorkerOptions,
    WorkerPhase,
};
use nix::{
    sys::signal::{kill, Signal},
    unistd::Pid,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

async fn free_port() -> u16 {
    let probe = TcpListener::bind("127.0.0.1:0").await.unwrap();
    probe.local_addr().unwrap().port()
}

async fn wait_healthy(port: u16) {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        if let Ok(mut stream) = TcpStream::connect(("127.0.0.1", port)).await {
            let req = "GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n";
            if stream.write_all(req.as_bytes()).await.is_ok() {
                let mut raw = Vec::new();
                let answered = stream.read_to_end(&mut raw).await.is_ok();
                if answered && raw.starts_with(b"HTTP/1.1 200") {
                    return;
                }
            }
        }
        assert!(Instant::now() < deadline, "health server never answered");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_sigterm_while_serving_exits_zero() {
    let port = free_port().await;
    let settings = Settings {
        worker: WorkerConfig::new("signal-agent"),
        server: ServerConfig {
            bind_address: "127.0.0.1".parse().unwrap(),
            port,
            shutdown_grace: Duration::from_secs(2),
            ..ServerConfig::default()
        },
    };
    let worker = WorkerFn::arc("forever", |_opts: WorkerOptions| async {
        std::future::pending::<()>().await;
        Ok::<(), WorkerError>(())
    });

    let run = tokio::spawn(Supervisor::new(settings, worker).run());

    wait_healthy(port).await;
    kill(Pid::this(), Signal::SIGTERM).unwrap();

    let exit = tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("supervisor stops on SIGTERM")
        .unwrap();

    assert_eq!(exit.status(), 0);
    assert!(exit.result().is_ok());
    let mut state = exit.worker().liveness();
    let status = tokio::time::timeout(Duration::from_secs(5), state.wait_for(|s| s.running))
        .await
        .expect("worker still running after shutdown");
    assert_eq!(status.phase, WorkerPhase::Running);
    assert!(!exit.worker().is_finished());
}
