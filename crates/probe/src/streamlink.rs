//! Streamlink-backed liveness probe.

use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::trace;

use crate::error::ProbeError;
use crate::{LivenessProbe, ResolvedStatus, UNKNOWN_PLATFORM};

static DEFAULT_BINARY: &str = "streamlink";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Liveness probe that shells out to the streamlink CLI.
///
/// Runs `<binary> --json --url <url> [extra args...]` and inspects the JSON
/// document streamlink prints on stdout (errors included). The binary path
/// resolution order is: explicit override, the `STREAMLINK_PATH` environment
/// variable, then plain `streamlink` on `PATH`.
#[derive(Debug, Clone)]
pub struct StreamlinkProbe {
    binary: String,
    timeout: Duration,
    extra_args: Vec<String>,
}

impl Default for StreamlinkProbe {
    fn default() -> Self {
        Self {
            binary: std::env::var("STREAMLINK_PATH").unwrap_or_else(|_| DEFAULT_BINARY.to_string()),
            timeout: DEFAULT_TIMEOUT,
            extra_args: Vec::new(),
        }
    }
}

impl StreamlinkProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the streamlink binary path.
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        let binary = binary.into();
        if !binary.is_empty() {
            self.binary = binary;
        }
        self
    }

    /// Bound a single check; the child is killed when the bound elapses.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Extra arguments appended to every invocation (auth options and such).
    pub fn with_extra_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.extra_args = args.into_iter().collect();
        self
    }

    /// The per-check time bound.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Best-effort check that the configured binary runs at all.
    pub fn is_available(&self) -> bool {
        let mut cmd = process_utils::std_command(&self.binary);
        cmd.arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd.status().is_ok_and(|s| s.success())
    }

    async fn run_json(&self, url: &str) -> Result<StreamlinkJson, ProbeError> {
        let mut cmd = process_utils::tokio_command(&self.binary);
        cmd.arg("--json").arg("--url").arg(url);
        cmd.args(&self.extra_args);
        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // An abandoned check must not leak a streamlink process.
            .kill_on_drop(true);

        trace!("running {} --json --url {url}", self.binary);
        let out = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| ProbeError::Timeout(self.timeout))?
            .map_err(|source| ProbeError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&out.stdout);
        // Streamlink prints JSON to stdout in `--json` mode, errors included.
        match serde_json::from_str(&stdout) {
            Ok(json) => Ok(json),
            Err(_) if stdout.trim().is_empty() => {
                let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
                Err(ProbeError::Tool(stderr))
            }
            Err(e) => Err(ProbeError::Json(e)),
        }
    }
}

#[async_trait]
impl LivenessProbe for StreamlinkProbe {
    async fn try_resolve(&self, url: &str) -> Result<ResolvedStatus, ProbeError> {
        let json = self.run_json(url).await?;
        evaluate(json)
    }
}

fn evaluate(json: StreamlinkJson) -> Result<ResolvedStatus, ProbeError> {
    if let Some(error) = json.error.as_deref() {
        return Err(map_streamlink_error(error));
    }
    let platform = json.plugin.unwrap_or_else(|| UNKNOWN_PLATFORM.to_string());
    let is_live = json
        .streams
        .as_ref()
        .is_some_and(|streams| streams.values().any(|s| s.url.is_some()));
    Ok(ResolvedStatus { platform, is_live })
}

fn map_streamlink_error(msg: &str) -> ProbeError {
    let lower = msg.to_lowercase();
    if lower.contains("no plugin can handle url") {
        return ProbeError::UnsupportedUrl(msg.to_string());
    }
    if lower.contains("no streams found") || lower.contains("no playable streams") {
        return ProbeError::NoStreams;
    }
    ProbeError::Tool(msg.to_string())
}

#[derive(Debug, Clone, Deserialize)]
struct StreamlinkJson {
    #[serde(default)]
    plugin: Option<String>,
    #[serde(default)]
    streams: Option<HashMap<String, StreamlinkStream>>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct StreamlinkStream {
    #[serde(default)]
    url: Option<String>,
}
