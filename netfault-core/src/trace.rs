// SPDX-License-Identifier: Apache-2.0

//! Domain-specific per-event trace stream — parity with the teacher's
//! `trace::Logger`, kept distinct from `tracing`'s structured spans because
//! it records exactly the generated/observed event sequence, not arbitrary
//! log lines. `netfault-cli`'s `fuzz` mode uses [`TracingLogger`] to report
//! each input event it invents before feeding it to the driver.

use crate::event::Event;

pub trait Trace: Send {
    #[inline(always)]
    fn record(&mut self, event: &Event) {
        let _ = event;
    }
}

/// Records nothing. The default for `replay`, where the trace being walked
/// is already on disk.
#[derive(Clone, Copy, Debug, Default)]
pub struct Disabled;

impl Trace for Disabled {}

/// Logs each recorded event at `debug` via `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

impl Trace for TracingLogger {
    fn record(&mut self, event: &Event) {
        tracing::debug!(label = event.label(), kind = ?event.kind(), "generated event");
    }
}
