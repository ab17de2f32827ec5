// SPDX-License-Identifier: Apache-2.0

//! TOML configuration, loaded once at startup. Every field has a sane
//! default so an empty or absent config file is valid.

use netfault_core::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetfaultConfig {
    /// Known switch dpids. Empty means "accept any dpid" (the mock
    /// topology's wildcard, used when no real topology was pre-declared).
    pub switches: Vec<u64>,
    /// Controller launch commands, one per controller process. The mock
    /// `ControllerManager` never spawns anything — it only logs these —
    /// but a real deployment's manager reads this same field to start the
    /// external binaries it supervises.
    pub controller_commands: Vec<String>,
    /// Seconds past an event's own logical time the driver will wait for it
    /// before treating it as timed out.
    pub peek_seconds: f64,
    /// Wall-clock interval between `NotYet` retries, in milliseconds.
    pub tick_ms: u64,
    /// Whether a `CheckInvariants` violation aborts the run.
    pub fail_on_error: bool,
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`
    /// when that's set.
    pub log_filter: String,
}

impl Default for NetfaultConfig {
    fn default() -> Self {
        Self {
            switches: Vec::new(),
            controller_commands: Vec::new(),
            peek_seconds: netfault_core::dag::DEFAULT_PEEK_SECONDS,
            tick_ms: 50,
            fail_on_error: true,
            log_filter: "info".to_string(),
        }
    }
}

impl NetfaultConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .map_err(|err| netfault_core::Error::External(format!("reading {path:?}: {err}")))?;
        toml::from_str(&raw)
            .map_err(|err| netfault_core::Error::Structural(format!("parsing {path:?}: {err}")))
    }
}
