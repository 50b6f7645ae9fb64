//! # Process configuration.
//!
//! Provides [`Settings`], the pair of immutable values the supervisor is built from:
//! - [`WorkerConfig`]: how to invoke the worker (identifier, mode, arguments);
//! - [`ServerConfig`]: where and how the health facade listens.
//!
//! Both are constructed once at process start and never mutated afterwards.
//!
//! ## Sources
//! Layered with the `config` crate, later sources win:
//! 1. an optional file named by `AGENTHOST_CONFIG` (TOML/YAML/JSON, lowercase keys);
//! 2. process environment variables (`PORT`, `AGENT_NAME`, ...).
//!
//! ## Keys
//! | Key                   | Default                | Notes                              |
//! |-----------------------|------------------------|------------------------------------|
//! | `AGENT_NAME`          | (none)                 | required, non-blank                |
//! | `PORT`                | `10000`                | `1..=65535`                        |
//! | `HOST`                | `0.0.0.0`              | IP address                         |
//! | `SERVICE_NAME`        | `livekit-agent-worker` | reported by both endpoints         |
//! | `WORKER_MODE`         | `dev`                  | first positional worker argument   |
//! | `WORKER_ARGS`         | empty                  | split on whitespace                |
//! | `WORKER_COMMAND`      | unset                  | program run by `CommandWorker`     |
//! | `SHUTDOWN_GRACE_SECS` | `30`                   | drain window for in-flight requests|

use std::{
    ffi::OsString,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 10000;
/// Service name reported by the health endpoints when `SERVICE_NAME` is not set.
pub const DEFAULT_SERVICE_NAME: &str = "livekit-agent-worker";
/// Worker run mode used when `WORKER_MODE` is not set.
pub const DEFAULT_WORKER_MODE: &str = "dev";
/// Environment variable naming an optional configuration file.
pub const CONFIG_FILE_ENV: &str = "AGENTHOST_CONFIG";

const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// How to invoke the worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Stable identifier the worker registers under; surfaced as `agent_name`.
    pub agent_name: String,
    /// Run mode handed to the worker as its first positional argument.
    pub mode: String,
    /// Additional positional arguments.
    pub args: Vec<String>,
    /// External program for [`CommandWorker`](crate::CommandWorker), if any.
    pub command: Option<String>,
}

impl WorkerConfig {
    /// Creates a worker config with the default mode and no extra arguments.
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            mode: DEFAULT_WORKER_MODE.to_string(),
            args: Vec::new(),
            command: None,
        }
    }
}

/// Where and how the health facade listens.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind.
    pub bind_address: IpAddr,
    /// Port to bind; `0` asks the OS for an ephemeral port.
    pub port: u16,
    /// Service name reported by both endpoints.
    pub service_name: String,
    /// Maximum time to drain in-flight requests after shutdown is requested.
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    /// Returns the socket address to bind.
    #[inline]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }
}

impl Default for ServerConfig {
    /// `0.0.0.0:10000`, default service name, 30s grace.
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }
}

/// Fully validated process configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// Worker invocation settings.
    pub worker: WorkerConfig,
    /// Health facade settings.
    pub server: ServerConfig,
}

/// Values as they come out of the layered sources, before validation.
///
/// Everything is read as a string so that validation owns the error messages.
#[derive(Debug, Deserialize)]
struct RawSettings {
    agent_name: Option<String>,
    port: Option<String>,
    host: Option<String>,
    service_name: Option<String>,
    worker_mode: Option<String>,
    worker_args: Option<String>,
    worker_command: Option<String>,
    shutdown_grace_secs: Option<String>,
}

impl Settings {
    /// Loads settings from the optional config file and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(std::env::vars_os())
    }

    /// Same as [`load`](Self::load) over an explicit set of variables.
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn load_from<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let env = utf8_vars(vars);

        let mut builder = config::Config::builder();
        if let Some(path) = env.get(CONFIG_FILE_ENV) {
            builder = builder.add_source(config::File::with_name(path));
        }
        let cfg = builder
            .add_source(config::Environment::default().source(Some(env)))
            .build()?;
        Self::from_config(cfg)
    }

    /// Validates an already-built layered configuration.
    pub fn from_config(cfg: config::Config) -> Result<Self, ConfigError> {
        let raw: RawSettings = cfg.try_deserialize()?;
        raw.validate()
    }
}

impl RawSettings {
    fn validate(self) -> Result<Settings, ConfigError> {
        let agent_name = self
            .agent_name
            .filter(|name| !name.trim().is_empty())
            .ok_or(ConfigError::Missing { key: "AGENT_NAME" })?;

        let port = match non_blank(self.port) {
            None => DEFAULT_PORT,
            Some(raw) => parse_port(&raw)?,
        };

        let bind_address = match non_blank(self.host) {
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::Invalid {
                key: "HOST",
                reason: format!("{raw:?} is not an IP address: {e}"),
            })?,
        };

        let shutdown_grace = match non_blank(self.shutdown_grace_secs) {
            None => DEFAULT_SHUTDOWN_GRACE,
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::Invalid {
                    key: "SHUTDOWN_GRACE_SECS",
                    reason: format!("{raw:?}: {e}"),
                })?,
        };

        let args = self
            .worker_args
            .map(|raw| raw.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();

        Ok(Settings {
            worker: WorkerConfig {
                agent_name,
                mode: non_blank(self.worker_mode)
                    .unwrap_or_else(|| DEFAULT_WORKER_MODE.to_string()),
                args,
                command: non_blank(self.worker_command),
            },
            server: ServerConfig {
                bind_address,
                port,
                service_name: non_blank(self.service_name)
                    .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
                shutdown_grace,
            },
        })
    }
}

fn utf8_vars<I>(vars: I) -> config::Map<String, String>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                let key = key.unwrap_or_else(|raw| raw.to_string_lossy().into_owned());
                debug!(%key, "skipping non UTF-8 environment variable");
                None
            }
        })
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    let port = raw.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
        key: "PORT",
        reason: format!("{raw:?}: {e}"),
    })?;
    if port == 0 {
        return Err(ConfigError::Invalid {
            key: "PORT",
            reason: "must be between 1 and 65535".to_string(),
        });
    }
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings_from(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let mut builder = config::Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(*key, *value).unwrap();
        }
        Settings::from_config(builder.build().unwrap())
    }

    #[test]
    fn test_defaults_applied() {
        let s = settings_from(&[("agent_name", "voice-agent")]).unwrap();
        assert_eq!(s.worker.agent_name, "voice-agent");
        assert_eq!(s.worker.mode, "dev");
        assert!(s.worker.args.is_empty());
        assert!(s.worker.command.is_none());
        assert_eq!(s.server.port, DEFAULT_PORT);
        assert_eq!(s.server.socket_addr().to_string(), "0.0.0.0:10000");
        assert_eq!(s.server.service_name, DEFAULT_SERVICE_NAME);
        assert_eq!(s.server.shutdown_grace, Duration::from_secs(30));
    }

    #[test]
    fn test_agent_name_required() {
        let err = settings_from(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { key: "AGENT_NAME" }));
    }

    #[test]
    fn test_empty_agent_name_rejected() {
        for blank in ["", "   "] {
            let err = settings_from(&[("agent_name", blank)]).unwrap_err();
            assert_eq!(err.as_label(), "config_missing", "{blank:?} should be rejected");
        }
    }

    #[test]
    fn test_agent_name_kept_verbatim() {
        let s = settings_from(&[("agent_name", "Agent 007")]).unwrap();
        assert_eq!(s.worker.agent_name, "Agent 007");
    }

    #[test]
    fn test_port_parsing() {
        let s = settings_from(&[("agent_name", "a"), ("port", "8080")]).unwrap();
        assert_eq!(s.server.port, 8080);

        let s = settings_from(&[("agent_name", "a"), ("port", "65535")]).unwrap();
        assert_eq!(s.server.port, 65535);

        for bad in ["abc", "0", "65536", "-1"] {
            let err = settings_from(&[("agent_name", "a"), ("port", bad)]).unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { key: "PORT", .. }),
                "port {bad:?} should be invalid, got {err:?}"
            );
        }
    }

    #[test]
    fn test_host_and_grace() {
        let s = settings_from(&[
            ("agent_name", "a"),
            ("host", "127.0.0.1"),
            ("shutdown_grace_secs", "5"),
        ])
        .unwrap();
        assert_eq!(s.server.socket_addr().to_string(), "127.0.0.1:10000");
        assert_eq!(s.server.shutdown_grace, Duration::from_secs(5));

        let err = settings_from(&[("agent_name", "a"), ("host", "localhost:1")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "HOST", .. }));
    }

    #[test]
    fn test_worker_arguments() {
        let s = settings_from(&[
            ("agent_name", "a"),
            ("worker_mode", "start"),
            ("worker_args", "  --log-level  debug "),
            ("worker_command", "/usr/bin/agent"),
        ])
        .unwrap();
        assert_eq!(s.worker.mode, "start");
        assert_eq!(s.worker.args, vec!["--log-level", "debug"]);
        assert_eq!(s.worker.command.as_deref(), Some("/usr/bin/agent"));
    }

    fn vars(pairs: &[(&str, &str)]) -> Vec<(OsString, OsString)> {
        pairs
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v)))
            .collect()
    }

    #[test]
    fn test_load_from_uppercase_environment() {
        let s = Settings::load_from(vars(&[
            ("AGENT_NAME", "voice-agent"),
            ("PORT", "8081"),
            ("WORKER_ARGS", "--fast"),
            ("PATH", "/usr/bin"),
        ]))
        .unwrap();
        assert_eq!(s.worker.agent_name, "voice-agent");
        assert_eq!(s.server.port, 8081);
        assert_eq!(s.worker.args, vec!["--fast"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_variables_are_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let mut env = vars(&[("AGENT_NAME", "voice-agent")]);
        env.push((OsString::from("BROKEN"), OsString::from_vec(vec![0x66, 0xff, 0x6f])));
        env.push((OsString::from_vec(vec![0xfe, 0x41]), OsString::from("x")));

        let s = Settings::load_from(env).unwrap();
        assert_eq!(s.worker.agent_name, "voice-agent");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_agent_name_is_missing() {
        use std::os::unix::ffi::OsStringExt;

        let env = vec![(OsString::from("AGENT_NAME"), OsString::from_vec(vec![0xff]))];
        let err = Settings::load_from(env).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { key: "AGENT_NAME" }));
    }
}
