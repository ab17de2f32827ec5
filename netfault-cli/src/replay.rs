// SPDX-License-Identifier: Apache-2.0

//! `netfault replay`: walks a recorded event trace against the in-workspace
//! mock simulation. A real deployment swaps `netfault-mock` for a crate
//! wiring the facade traits to an actual topology and controller fleet;
//! nothing here changes.

use crate::config::NetfaultConfig;
use netfault_core::dag::EventDag;
use netfault_core::driver::{ProcessRegistry, ReplayDriver};
use netfault_core::event::Event;
use netfault_core::Result;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use structopt::StructOpt;
use tracing::{error, info};

#[derive(Debug, StructOpt)]
pub struct Replay {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[structopt(long)]
    config: Option<PathBuf>,
    /// Newline-delimited JSON event trace to replay.
    #[structopt(long)]
    trace: PathBuf,
}

impl Replay {
    pub async fn run(&self) -> Result<()> {
        let config = NetfaultConfig::load(self.config.as_deref())?;
        let contents = tokio::fs::read_to_string(&self.trace)
            .await
            .map_err(|err| netfault_core::Error::External(format!("reading {:?}: {err}", self.trace)))?;

        let mut events = Vec::new();
        for (lineno, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            events.push(Event::from_json_line(line).map_err(|err| {
                netfault_core::Error::Structural(format!("{}:{}: {err}", self.trace.display(), lineno + 1))
            })?);
        }
        info!(count = events.len(), trace = %self.trace.display(), "loaded trace");

        let mut dag = EventDag::with_peek_seconds(events, config.peek_seconds)?;
        let mut sim = netfault_mock::mock_simulation(config.switches.clone());

        let registry = Arc::new(ProcessRegistry::new());
        {
            let registry = registry.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("signal received, stopping replay");
                    registry.shutdown();
                }
            });
        }

        let driver = ReplayDriver::new(Duration::from_millis(config.tick_ms));
        let result = driver.run(&mut dag, &mut sim, &registry).await;
        if let Err(err) = &result {
            error!(error = %err, "replay failed");
        }
        result
    }
}
