// SPDX-License-Identifier: Apache-2.0

//! `proceed`: not a coroutine (Design Note), a plain state machine. The
//! driver interprets the result; `proceed` itself never sleeps or retries.

use super::Event;
use crate::facade::Simulation;
use crate::scheduler::PendingReceive;
use crate::{Error, Result};
use tracing::warn;

/// The outcome of one `proceed` call. `Fail` conditions (an already-unblocked
/// channel, scheduling an absent message) are reported as `Err` instead of a
/// third variant here, so the driver's `?`-based error handling covers them
/// for free.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProceedOutcome {
    Done,
    NotYet,
}

impl Event {
    /// Executes one round of this event against `sim`. Preconditions that
    /// fail surface as `Err(Error::Precondition(..))`; internal events that
    /// haven't happened yet return `Ok(ProceedOutcome::NotYet)` for the
    /// driver to retry.
    pub fn proceed(&self, sim: &mut Simulation) -> Result<ProceedOutcome> {
        use ProceedOutcome::*;
        match self {
            Event::SwitchFailure { dpid, .. } => {
                sim.topology.get_switch(*dpid)?;
                sim.topology.crash_switch(*dpid)?;
                Ok(Done)
            }
            Event::SwitchRecovery { dpid, .. } => {
                sim.topology.recover_switch(*dpid)?;
                Ok(Done)
            }
            Event::LinkFailure {
                start_dpid,
                start_port_no,
                end_dpid,
                end_port_no,
                ..
            } => {
                sim.topology
                    .sever_link(*start_dpid, *start_port_no, *end_dpid, *end_port_no)?;
                Ok(Done)
            }
            Event::LinkRecovery {
                start_dpid,
                start_port_no,
                end_dpid,
                end_port_no,
                ..
            } => {
                sim.topology
                    .repair_link(*start_dpid, *start_port_no, *end_dpid, *end_port_no)?;
                Ok(Done)
            }
            Event::ControllerFailure { controller_id, .. } => {
                sim.controller_manager.kill_controller(controller_id)?;
                Ok(Done)
            }
            Event::ControllerRecovery { controller_id, .. } => {
                sim.controller_manager.reboot_controller(controller_id)?;
                Ok(Done)
            }
            Event::HostMigration {
                old_ingress_dpid,
                old_ingress_port_no,
                new_ingress_dpid,
                new_ingress_port_no,
                ..
            } => {
                sim.topology.migrate_host(
                    *old_ingress_dpid,
                    *old_ingress_port_no,
                    *new_ingress_dpid,
                    *new_ingress_port_no,
                )?;
                Ok(Done)
            }
            Event::PolicyChange { .. } => {
                // Policy requests are opaque to the core; simply observing
                // one occur is the entire contract.
                Ok(Done)
            }
            Event::TrafficInjection { .. } => {
                let trace = sim.dataplane_trace.as_mut().ok_or_else(|| {
                    Error::Precondition("no dataplane trace configured".into())
                })?;
                trace.inject_trace_event()?;
                Ok(Done)
            }
            Event::WaitTime { .. } => {
                // The logical delay itself is realized by the replay
                // driver's peek-derived deadlines, not here.
                Ok(Done)
            }
            Event::CheckInvariants {
                fail_on_error,
                invariant_check,
                ..
            } => {
                let violations = sim
                    .invariant_checker
                    .check(invariant_check.as_deref())?;
                if !violations.is_empty() {
                    if *fail_on_error {
                        return Err(Error::InvariantViolation(violations.join("; ")));
                    }
                    warn!(violations = violations.join("; "), "invariant violation (non-fatal)");
                }
                Ok(Done)
            }
            Event::ControlChannelBlock {
                dpid,
                controller_id,
                ..
            } => {
                let conn = sim.connection(*dpid, controller_id)?;
                if conn.is_blocked() {
                    return Err(Error::Precondition(format!(
                        "connection ({dpid}, {controller_id:?}) already blocked"
                    )));
                }
                conn.block();
                Ok(Done)
            }
            Event::ControlChannelUnblock {
                dpid,
                controller_id,
                ..
            } => {
                let conn = sim.connection(*dpid, controller_id)?;
                if !conn.is_blocked() {
                    return Err(Error::Precondition(format!(
                        "connection ({dpid}, {controller_id:?}) not blocked"
                    )));
                }
                conn.unblock();
                Ok(Done)
            }
            Event::DataplaneDrop { fingerprint, .. } => {
                if sim.patch_panel.get_buffered_dp_event(fingerprint).is_none() {
                    return Ok(NotYet);
                }
                sim.patch_panel.drop_dp_event(fingerprint)?;
                Ok(Done)
            }
            Event::DataplanePermit { fingerprint, .. } => {
                if sim.patch_panel.get_buffered_dp_event(fingerprint).is_none() {
                    return Ok(NotYet);
                }
                sim.patch_panel.permit_dp_event(fingerprint)?;
                Ok(Done)
            }
            Event::ControlMessageReceive {
                dpid,
                controller_id,
                fingerprint,
                ..
            } => {
                let key = PendingReceive {
                    dpid: *dpid,
                    controller_id: controller_id.clone(),
                    fingerprint: fingerprint.clone(),
                };
                if !sim.god_scheduler.message_waiting(&key) {
                    return Ok(NotYet);
                }
                sim.god_scheduler.schedule(&key)?;
                Ok(Done)
            }
            Event::ControllerStateChange {
                controller_id,
                fingerprint,
                name,
                value,
                ..
            } => {
                if !sim
                    .controller_sync_callback
                    .state_change_pending(controller_id, fingerprint, name, value)
                {
                    return Ok(NotYet);
                }
                sim.controller_sync_callback
                    .gc_pending_state_change(controller_id, fingerprint, name, value);
                Ok(Done)
            }
            Event::DeterministicValue { .. } => {
                // A recorded source of nondeterminism (e.g. a random seed
                // draw); observing it is the entire contract, matching
                // `PolicyChange`.
                Ok(Done)
            }
        }
    }
}
