// SPDX-License-Identifier: Apache-2.0

//! In-memory stand-ins for the five facade traits `netfault-core` depends
//! on, in the style of `netbench`'s `testing::Connection`: plain structs
//! over `Mutex`-guarded state, no sockets, no external processes. This is
//! explicitly a toy — the real topology, real controller processes, and
//! real patch panel this harness drives in production live outside this
//! workspace entirely.

use netfault_core::facade::{
    ControllerManager, ControllerSyncCallback, DataplaneTrace, InvariantChecker, PatchPanel,
    Simulation, Topology,
};
use netfault_core::fingerprint::{ControllerId, DPFingerprint, Dpid};
use netfault_core::scheduler::GodScheduler;
use netfault_core::Result;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct LinkKey {
    start_dpid: Dpid,
    start_port_no: u32,
    end_dpid: Dpid,
    end_port_no: u32,
}

/// A toy topology: switches and links exist only as membership in two sets.
/// `migrate_host` is recorded but not otherwise modeled — there is no host
/// graph here to rewire.
#[derive(Default)]
pub struct MockTopology {
    known_switches: HashSet<Dpid>,
    crashed_switches: HashSet<Dpid>,
    severed_links: HashSet<LinkKey>,
    pub migrations: Vec<(Dpid, u32, Dpid, u32)>,
}

impl MockTopology {
    pub fn new(switches: impl IntoIterator<Item = Dpid>) -> Self {
        Self {
            known_switches: switches.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn is_crashed(&self, dpid: Dpid) -> bool {
        self.crashed_switches.contains(&dpid)
    }
}

impl Topology for MockTopology {
    fn get_switch(&self, dpid: Dpid) -> Result<()> {
        if self.known_switches.is_empty() || self.known_switches.contains(&dpid) {
            Ok(())
        } else {
            Err(netfault_core::Error::Precondition(format!("no such switch {dpid}")))
        }
    }

    fn crash_switch(&mut self, dpid: Dpid) -> Result<()> {
        debug!(dpid, "switch crashed");
        self.crashed_switches.insert(dpid);
        Ok(())
    }

    fn recover_switch(&mut self, dpid: Dpid) -> Result<()> {
        debug!(dpid, "switch recovered");
        self.crashed_switches.remove(&dpid);
        Ok(())
    }

    fn sever_link(&mut self, start_dpid: Dpid, start_port_no: u32, end_dpid: Dpid, end_port_no: u32) -> Result<()> {
        self.severed_links.insert(LinkKey {
            start_dpid,
            start_port_no,
            end_dpid,
            end_port_no,
        });
        Ok(())
    }

    fn repair_link(&mut self, start_dpid: Dpid, start_port_no: u32, end_dpid: Dpid, end_port_no: u32) -> Result<()> {
        self.severed_links.remove(&LinkKey {
            start_dpid,
            start_port_no,
            end_dpid,
            end_port_no,
        });
        Ok(())
    }

    fn migrate_host(
        &mut self,
        old_ingress_dpid: Dpid,
        old_ingress_port_no: u32,
        new_ingress_dpid: Dpid,
        new_ingress_port_no: u32,
    ) -> Result<()> {
        self.migrations.push((
            old_ingress_dpid,
            old_ingress_port_no,
            new_ingress_dpid,
            new_ingress_port_no,
        ));
        Ok(())
    }
}

/// Tracks which controller processes this mock considers alive. There is no
/// real process behind any `ControllerId` here.
#[derive(Default)]
pub struct MockControllerManager {
    killed: HashSet<ControllerId>,
}

impl MockControllerManager {
    pub fn is_alive(&self, id: &ControllerId) -> bool {
        !self.killed.contains(id)
    }
}

impl ControllerManager for MockControllerManager {
    fn get_controller(&self, _id: &ControllerId) -> Result<()> {
        Ok(())
    }

    fn kill_controller(&mut self, id: &ControllerId) -> Result<()> {
        debug!(?id, "controller killed");
        self.killed.insert(id.clone());
        Ok(())
    }

    fn reboot_controller(&mut self, id: &ControllerId) -> Result<()> {
        debug!(?id, "controller rebooted");
        self.killed.remove(id);
        Ok(())
    }
}

/// A patch panel whose buffer is a plain set the test or `fuzz` driver
/// populates directly via [`MockPatchPanel::buffer_event`] — there is no
/// real dataplane producing packets to intercept.
#[derive(Default)]
pub struct MockPatchPanel {
    buffered: HashSet<DPFingerprint>,
    pub dropped: Vec<DPFingerprint>,
    pub permitted: Vec<DPFingerprint>,
}

impl MockPatchPanel {
    pub fn buffer_event(&mut self, fingerprint: DPFingerprint) {
        self.buffered.insert(fingerprint);
    }
}

impl PatchPanel for MockPatchPanel {
    fn get_buffered_dp_event(&self, fingerprint: &DPFingerprint) -> Option<()> {
        self.buffered.contains(fingerprint).then_some(())
    }

    fn drop_dp_event(&mut self, fingerprint: &DPFingerprint) -> Result<()> {
        self.buffered.remove(fingerprint);
        self.dropped.push(fingerprint.clone());
        Ok(())
    }

    fn permit_dp_event(&mut self, fingerprint: &DPFingerprint) -> Result<()> {
        self.buffered.remove(fingerprint);
        self.permitted.push(fingerprint.clone());
        Ok(())
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct StateChangeKey {
    controller_id: ControllerId,
    fingerprint: String,
    name: String,
}

/// Observed controller state changes, keyed by the same tuple
/// `ControllerStateChange` carries. `observe` is how a test (or a real sync
/// protocol client, in a non-mock implementation) reports one arriving.
#[derive(Default)]
pub struct MockSyncCallback {
    observed: HashMap<StateChangeKey, VecDeque<Value>>,
}

impl MockSyncCallback {
    pub fn observe(&mut self, controller_id: ControllerId, fingerprint: &Value, name: impl Into<String>, value: Value) {
        let key = StateChangeKey {
            controller_id,
            fingerprint: fingerprint.to_string(),
            name: name.into(),
        };
        self.observed.entry(key).or_default().push_back(value);
    }
}

impl ControllerSyncCallback for MockSyncCallback {
    fn state_change_pending(&self, controller_id: &ControllerId, fingerprint: &Value, name: &str, value: &Value) -> bool {
        let key = StateChangeKey {
            controller_id: controller_id.clone(),
            fingerprint: fingerprint.to_string(),
            name: name.to_string(),
        };
        self.observed
            .get(&key)
            .is_some_and(|q| q.front() == Some(value))
    }

    fn gc_pending_state_change(&mut self, controller_id: &ControllerId, fingerprint: &Value, name: &str, value: &Value) {
        let key = StateChangeKey {
            controller_id: controller_id.clone(),
            fingerprint: fingerprint.to_string(),
            name: name.to_string(),
        };
        if let Some(queue) = self.observed.get_mut(&key) {
            if queue.front() == Some(value) {
                queue.pop_front();
            }
        }
    }
}

/// A scripted sequence of trace events `TrafficInjection` draws from, one
/// per call, in order. Exhausting the trace is a precondition error, same
/// as no trace being configured at all.
#[derive(Default)]
pub struct MockDataplaneTrace {
    remaining: VecDeque<()>,
}

impl MockDataplaneTrace {
    pub fn with_events(count: usize) -> Self {
        Self {
            remaining: std::iter::repeat(()).take(count).collect(),
        }
    }
}

impl DataplaneTrace for MockDataplaneTrace {
    fn inject_trace_event(&mut self) -> Result<()> {
        self.remaining
            .pop_front()
            .ok_or_else(|| netfault_core::Error::Precondition("dataplane trace exhausted".into()))
    }
}

/// Invariant checker whose verdict is whatever the test or `fuzz` harness
/// set via [`MockInvariantChecker::set_violations`] — there is no real
/// network-wide property being evaluated here.
#[derive(Default)]
pub struct MockInvariantChecker {
    violations: Mutex<Vec<String>>,
}

impl MockInvariantChecker {
    pub fn set_violations(&self, violations: Vec<String>) {
        *self.violations.lock() = violations;
    }
}

impl InvariantChecker for MockInvariantChecker {
    fn check(&mut self, name: Option<&str>) -> Result<Vec<String>> {
        debug!(?name, "checking invariants");
        Ok(self.violations.lock().clone())
    }
}

/// Assembles a [`Simulation`] wired entirely with this crate's mocks, for
/// tests and local `replay`/`fuzz` runs that have no real topology or
/// controller fleet to drive.
pub fn mock_simulation(switches: impl IntoIterator<Item = Dpid>) -> Simulation {
    Simulation::new(
        Box::new(MockTopology::new(switches)),
        Box::new(MockControllerManager::default()),
        Box::new(MockPatchPanel::default()),
        Arc::new(GodScheduler::new()),
        Box::new(MockSyncCallback::default()),
        Some(Box::new(MockDataplaneTrace::default())),
        Box::new(MockInvariantChecker::default()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crash_then_recover_switch() {
        let mut topo = MockTopology::new([1, 2, 3]);
        topo.crash_switch(1).unwrap();
        assert!(topo.is_crashed(1));
        topo.recover_switch(1).unwrap();
        assert!(!topo.is_crashed(1));
    }

    #[test]
    fn unknown_switch_is_precondition_error() {
        let topo = MockTopology::new([1]);
        assert!(topo.get_switch(99).is_err());
    }

    #[test]
    fn patch_panel_buffers_then_drops() {
        let fp = DPFingerprint::packet("a", "b", 0x0800, "10.0.0.1", "10.0.0.2", 6, 0);
        let mut panel = MockPatchPanel::default();
        assert!(panel.get_buffered_dp_event(&fp).is_none());
        panel.buffer_event(fp.clone());
        assert!(panel.get_buffered_dp_event(&fp).is_some());
        panel.drop_dp_event(&fp).unwrap();
        assert!(panel.get_buffered_dp_event(&fp).is_none());
        assert_eq!(panel.dropped, vec![fp]);
    }

    #[test]
    fn trace_exhaustion_is_precondition_error() {
        let mut trace = MockDataplaneTrace::with_events(1);
        trace.inject_trace_event().unwrap();
        assert!(trace.inject_trace_event().is_err());
    }

    #[test]
    fn sync_callback_observes_then_gcs() {
        let mut cb = MockSyncCallback::default();
        let cid = ControllerId::new("127.0.0.1", 8888);
        let fp = serde_json::json!({"dpid": 1});
        cb.observe(cid.clone(), &fp, "flow_count", Value::from(3));
        assert!(cb.state_change_pending(&cid, &fp, "flow_count", &Value::from(3)));
        cb.gc_pending_state_change(&cid, &fp, "flow_count", &Value::from(3));
        assert!(!cb.state_change_pending(&cid, &fp, "flow_count", &Value::from(3)));
    }
}
