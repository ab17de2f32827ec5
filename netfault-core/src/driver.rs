// SPDX-License-Identifier: Apache-2.0

//! Replay driver (C6): the single cooperative loop that walks an
//! [`crate::dag::EventDag`] against a [`crate::facade::Simulation`], one
//! `tokio::task` on the current thread. Retries on `NotYet` by sleeping —
//! not by parking on a condition variable — because the observations the
//! driver is waiting on (a buffered packet, a pending controller message)
//! can originate from outside any channel the driver owns, matching
//! `netbench-sync`'s poll-and-sleep coordination idiom.

use crate::dag::EventDag;
use crate::event::ProceedOutcome;
use crate::facade::Simulation;
use crate::time::LogicalTime;
use crate::{Error, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// The default retry interval between `NotYet` polls.
pub const DEFAULT_TICK: Duration = Duration::from_millis(50);

/// Process-wide shutdown flag (Design Note's reification of "process-wide
/// active processes set"). One `ProcessRegistry` is shared between the
/// driver loop and a `ctrl_c` handler installed by the CLI; `shutdown()` is
/// safe to call from either, exactly once will do actual work.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    shutdown: AtomicBool,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self {
            shutdown: AtomicBool::new(false),
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Returns `true` the first time it is called; subsequent calls are a
    /// no-op so signal-handler and normal-completion paths can both call it
    /// without double-running cleanup.
    pub fn shutdown(&self) -> bool {
        self.shutdown
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ReplayDriver {
    tick: Duration,
}

impl Default for ReplayDriver {
    fn default() -> Self {
        Self { tick: DEFAULT_TICK }
    }
}

impl ReplayDriver {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }

    /// Walks every event in `dag`, in order, against `sim`. Recomputes
    /// deadlines with `peek()` before starting so callers don't have to
    /// remember to (`EventDag::remove` already does this after pruning).
    ///
    /// Returns on the first fatal error. `registry.shutdown()` is invoked
    /// exactly once, whether the loop finishes normally, aborts on a fatal
    /// error, or observes the registry already shut down by a signal
    /// handler running concurrently.
    pub async fn run(&self, dag: &mut EventDag, sim: &mut Simulation, registry: &ProcessRegistry) -> Result<()> {
        dag.peek();
        let outcome = self.run_inner(dag, sim, registry).await;
        registry.shutdown();
        outcome
    }

    async fn run_inner(&self, dag: &EventDag, sim: &mut Simulation, registry: &ProcessRegistry) -> Result<()> {
        for event in dag.events() {
            if registry.is_shutdown() {
                warn!(label = event.label(), "replay aborted: shutdown requested");
                return Err(Error::Signal);
            }

            let span = tracing::info_span!("event", label = event.label(), kind = ?event.kind());
            let _enter = span.enter();

            let budget = wait_budget(dag, event.label(), event.time());
            let wait_start = Instant::now();

            loop {
                match event.proceed(sim) {
                    Ok(ProceedOutcome::Done) => {
                        debug!("event completed");
                        break;
                    }
                    Ok(ProceedOutcome::NotYet) => {
                        if wait_start.elapsed() >= budget {
                            if event.is_input() {
                                return Err(Error::InputTimeout {
                                    label: event.label().to_string(),
                                    kind: event.kind(),
                                });
                            }
                            warn!("internal event timed out, skipping");
                            break;
                        }
                        if registry.is_shutdown() {
                            return Err(Error::Signal);
                        }
                        tokio::time::sleep(self.tick).await;
                    }
                    Err(err) => return Err(err),
                }
            }
        }

        info!(count = dag.len(), "replay complete");
        Ok(())
    }
}

/// How long the driver is willing to wait (in real wall-clock time) for
/// `label` to complete, derived from `peek()`'s logical-time deadline minus
/// the event's own logical time.
fn wait_budget(dag: &EventDag, label: &str, event_time: LogicalTime) -> Duration {
    match dag.wait_time(label) {
        Some(deadline) => {
            let deadline_d: Duration = deadline.into();
            let event_d: Duration = event_time.into();
            deadline_d.checked_sub(event_d).unwrap_or(Duration::ZERO)
        }
        None => Duration::from_secs_f64(dag.peek_seconds()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_is_idempotent() {
        let registry = ProcessRegistry::new();
        assert!(registry.shutdown());
        assert!(!registry.shutdown());
        assert!(registry.is_shutdown());
    }

    #[test]
    fn fresh_registry_not_shutdown() {
        let registry = ProcessRegistry::new();
        assert!(!registry.is_shutdown());
    }
}
