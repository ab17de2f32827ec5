// SPDX-License-Identifier: Apache-2.0

//! The narrow capability set the event model (C2) and replay driver (C6)
//! depend on (C7). Everything here is a trait: the real topology, real
//! controller processes, and the real patch panel live entirely outside this
//! crate. `netfault-mock` ships the one implementation this workspace runs
//! against.

use crate::connection::InterceptedConnection;
use crate::fingerprint::{ControllerId, DPFingerprint, Dpid};
use crate::scheduler::GodScheduler;
use crate::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Topology mutation surface: crash/recover switches, sever/repair links,
/// migrate a host's access link.
pub trait Topology: Send {
    fn get_switch(&self, dpid: Dpid) -> Result<()>;
    fn crash_switch(&mut self, dpid: Dpid) -> Result<()>;
    fn recover_switch(&mut self, dpid: Dpid) -> Result<()>;
    fn sever_link(&mut self, start_dpid: Dpid, start_port_no: u32, end_dpid: Dpid, end_port_no: u32) -> Result<()>;
    fn repair_link(&mut self, start_dpid: Dpid, start_port_no: u32, end_dpid: Dpid, end_port_no: u32) -> Result<()>;
    fn migrate_host(
        &mut self,
        old_ingress_dpid: Dpid,
        old_ingress_port_no: u32,
        new_ingress_dpid: Dpid,
        new_ingress_port_no: u32,
    ) -> Result<()>;
}

/// Controller process lifecycle. Launch/kill of the real external binary is
/// out of scope for the core; this trait is the seam the core calls through.
pub trait ControllerManager: Send {
    fn get_controller(&self, id: &ControllerId) -> Result<()>;
    fn kill_controller(&mut self, id: &ControllerId) -> Result<()>;
    fn reboot_controller(&mut self, id: &ControllerId) -> Result<()>;
}

/// The data-plane "patch panel" that buffers in-flight packets between
/// `DataplaneDrop`/`DataplanePermit` decisions.
pub trait PatchPanel: Send {
    fn get_buffered_dp_event(&self, fingerprint: &DPFingerprint) -> Option<()>;
    fn drop_dp_event(&mut self, fingerprint: &DPFingerprint) -> Result<()>;
    fn permit_dp_event(&mut self, fingerprint: &DPFingerprint) -> Result<()>;
}

/// Callback surface the controller synchronization protocol uses to report
/// observed state changes, and that `ControllerStateChange` events wait on.
pub trait ControllerSyncCallback: Send {
    fn state_change_pending(&self, controller_id: &ControllerId, fingerprint: &Value, name: &str, value: &Value) -> bool;
    fn gc_pending_state_change(&mut self, controller_id: &ControllerId, fingerprint: &Value, name: &str, value: &Value);
}

/// Optional pre-recorded data-plane trace that `TrafficInjection` draws from.
pub trait DataplaneTrace: Send {
    fn inject_trace_event(&mut self) -> Result<()>;
}

/// An invariant checker run by `CheckInvariants`. Returns human-readable
/// violation descriptions; an empty vec means the network is healthy.
pub trait InvariantChecker: Send {
    fn check(&mut self, name: Option<&str>) -> Result<Vec<String>>;
}

/// The simulation the replay driver and every `Event::proceed` call operate
/// against: one struct composing the five collaborator traits above plus the
/// God Scheduler, matching `spec.md` §4.7 exactly.
pub struct Simulation {
    pub topology: Box<dyn Topology>,
    pub controller_manager: Box<dyn ControllerManager>,
    pub patch_panel: Box<dyn PatchPanel>,
    pub god_scheduler: Arc<GodScheduler>,
    pub controller_sync_callback: Box<dyn ControllerSyncCallback>,
    pub dataplane_trace: Option<Box<dyn DataplaneTrace>>,
    pub invariant_checker: Box<dyn InvariantChecker>,
    connections: HashMap<(Dpid, ControllerId), Arc<InterceptedConnection>>,
}

impl Simulation {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        topology: Box<dyn Topology>,
        controller_manager: Box<dyn ControllerManager>,
        patch_panel: Box<dyn PatchPanel>,
        god_scheduler: Arc<GodScheduler>,
        controller_sync_callback: Box<dyn ControllerSyncCallback>,
        dataplane_trace: Option<Box<dyn DataplaneTrace>>,
        invariant_checker: Box<dyn InvariantChecker>,
    ) -> Self {
        Self {
            topology,
            controller_manager,
            patch_panel,
            god_scheduler,
            controller_sync_callback,
            dataplane_trace,
            invariant_checker,
            connections: HashMap::new(),
        }
    }

    /// Registers an intercepted connection so `ControlChannelBlock`/`Unblock`
    /// can find it by `(dpid, controller_id)`. Called by whoever wires up the
    /// I/O workers (outside the core's scope).
    pub fn register_connection(&mut self, conn: Arc<InterceptedConnection>) {
        self.connections
            .insert((conn.dpid, conn.controller_id.clone()), conn);
    }

    pub fn connection(
        &self,
        dpid: Dpid,
        controller_id: &ControllerId,
    ) -> Result<&Arc<InterceptedConnection>> {
        self.connections
            .get(&(dpid, controller_id.clone()))
            .ok_or_else(|| {
                Error::Precondition(format!(
                    "no intercepted connection for ({dpid}, {controller_id:?})"
                ))
            })
    }
}
