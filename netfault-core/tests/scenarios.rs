// SPDX-License-Identifier: Apache-2.0

//! The six concrete replay scenarios this harness is expected to get right,
//! run end to end through [`netfault_core::driver::ReplayDriver`] against
//! `netfault-mock`'s in-memory facade implementations.

use netfault_core::connection::{InterceptedConnection, SwitchHandler};
use netfault_core::dag::EventDag;
use netfault_core::driver::{ProcessRegistry, ReplayDriver};
use netfault_core::event::{Event, EventMeta};
use netfault_core::fingerprint::{ControllerId, OFFingerprint};
use netfault_core::time::LogicalTime;
use netfault_core::Error;
use netfault_core::facade::Simulation;
use netfault_core::scheduler::GodScheduler;
use netfault_mock::{
    mock_simulation, MockControllerManager, MockInvariantChecker, MockPatchPanel, MockSyncCallback,
    MockTopology,
};
use parking_lot::Mutex as PLMutex;
use std::collections::HashSet;
use std::sync::Arc;

struct Recorder(Arc<PLMutex<Vec<Vec<u8>>>>);
impl SwitchHandler for Recorder {
    fn deliver(&self, msg: &Vec<u8>) {
        self.0.lock().push(msg.clone());
    }
}

fn meta(label: &str, sec: i64) -> EventMeta {
    EventMeta::new(label, LogicalTime::new(sec, 0))
}

/// 1. An empty DAG completes immediately with no side effects.
#[tokio::test]
async fn empty_dag_completes_immediately() {
    let mut dag = EventDag::new(vec![]).unwrap();
    let mut sim = mock_simulation([]);
    let registry = ProcessRegistry::new();
    let driver = ReplayDriver::default();

    driver.run(&mut dag, &mut sim, &registry).await.unwrap();
    assert!(registry.is_shutdown());
}

/// 2. A single `SwitchFailure` crashes exactly the named switch.
#[tokio::test]
async fn single_switch_failure_crashes_switch() {
    let events = vec![Event::SwitchFailure {
        meta: meta("e1", 0),
        dpid: 7,
    }];
    let mut dag = EventDag::new(events).unwrap();
    let mut sim = mock_simulation([7]);
    let registry = ProcessRegistry::new();
    let driver = ReplayDriver::default();

    driver.run(&mut dag, &mut sim, &registry).await.unwrap();
}

/// 3. Pruning a `SwitchFailure` also prunes its paired `SwitchRecovery`.
#[tokio::test]
async fn pruning_failure_prunes_paired_recovery() {
    let events = vec![
        Event::SwitchFailure {
            meta: meta("e1", 0),
            dpid: 7,
        },
        Event::SwitchRecovery {
            meta: meta("e2", 1),
            dpid: 7,
        },
    ];
    let mut dag = EventDag::new(events).unwrap();
    assert_eq!(dag.get("e1").unwrap().dependent_labels(), &["e2".to_string()]);

    dag.remove(&HashSet::from(["e1".to_string()]));
    assert!(dag.is_empty());

    let mut sim = mock_simulation([7]);
    let registry = ProcessRegistry::new();
    let driver = ReplayDriver::default();
    driver.run(&mut dag, &mut sim, &registry).await.unwrap();
}

/// 4. `ControlChannelBlock` then `Unblock` succeeds; replaying `Unblock`
/// first is a fatal precondition error.
#[tokio::test]
async fn control_channel_block_then_unblock_succeeds() {
    let cid = ControllerId::new("127.0.0.1", 8888);
    let events = vec![
        Event::ControlChannelBlock {
            meta: meta("e1", 0),
            dpid: 1,
            controller_id: cid.clone(),
        },
        Event::ControlChannelUnblock {
            meta: meta("e2", 1),
            dpid: 1,
            controller_id: cid.clone(),
        },
    ];
    let mut dag = EventDag::new(events).unwrap();
    let mut sim = mock_simulation([1]);
    let conn = Arc::new(InterceptedConnection::new(
        1,
        cid,
        Box::new(Recorder(Default::default())),
    ));
    sim.register_connection(conn);

    let registry = ProcessRegistry::new();
    let driver = ReplayDriver::default();
    driver.run(&mut dag, &mut sim, &registry).await.unwrap();
}

#[tokio::test]
async fn control_channel_unblock_before_block_is_fatal() {
    let cid = ControllerId::new("127.0.0.1", 8888);
    let events = vec![Event::ControlChannelUnblock {
        meta: meta("e1", 0),
        dpid: 1,
        controller_id: cid.clone(),
    }];
    let mut dag = EventDag::new(events).unwrap();
    let mut sim = mock_simulation([1]);
    let conn = Arc::new(InterceptedConnection::new(
        1,
        cid,
        Box::new(Recorder(Default::default())),
    ));
    sim.register_connection(conn);

    let registry = ProcessRegistry::new();
    let driver = ReplayDriver::default();
    let err = driver.run(&mut dag, &mut sim, &registry).await.unwrap_err();
    assert!(matches!(err, Error::Precondition(_)));
}

/// 5. Two `ControlMessageReceive` events under the same key are delivered
/// in FIFO order once the God Scheduler has both pending.
#[tokio::test]
async fn two_control_message_receives_deliver_fifo() {
    let cid = ControllerId::new("127.0.0.1", 8888);
    let fp = OFFingerprint::generic("barrier_request", vec![]);
    let events = vec![
        Event::ControlMessageReceive {
            meta: meta("e1", 0),
            dpid: 1,
            controller_id: cid.clone(),
            fingerprint: fp.clone(),
        },
        Event::ControlMessageReceive {
            meta: meta("e2", 1),
            dpid: 1,
            controller_id: cid.clone(),
            fingerprint: fp.clone(),
        },
    ];
    let mut dag = EventDag::new(events).unwrap();
    let mut sim = mock_simulation([1]);

    let sink = Arc::new(PLMutex::new(vec![]));
    let conn = Arc::new(InterceptedConnection::new(
        1,
        cid.clone(),
        Box::new(Recorder(sink.clone())),
    ));
    sim.register_connection(conn.clone());
    sim.god_scheduler
        .insert_pending(1, cid.clone(), fp.clone(), vec![1], conn.clone());
    sim.god_scheduler.insert_pending(1, cid, fp, vec![2], conn);

    let registry = ProcessRegistry::new();
    let driver = ReplayDriver::default();
    driver.run(&mut dag, &mut sim, &registry).await.unwrap();

    assert_eq!(sink.lock().as_slice(), &[vec![1], vec![2]]);
}

/// 6. `TrafficInjection` with no dataplane trace configured is fatal.
#[tokio::test]
async fn traffic_injection_without_trace_is_fatal() {
    let events = vec![Event::TrafficInjection { meta: meta("e1", 0) }];
    let mut dag = EventDag::new(events).unwrap();
    let mut sim = Simulation::new(
        Box::new(MockTopology::new([])),
        Box::new(MockControllerManager::default()),
        Box::new(MockPatchPanel::default()),
        Arc::new(GodScheduler::new()),
        Box::new(MockSyncCallback::default()),
        None,
        Box::new(MockInvariantChecker::default()),
    );
    let registry = ProcessRegistry::new();
    let driver = ReplayDriver::default();

    let err = driver.run(&mut dag, &mut sim, &registry).await.unwrap_err();
    assert!(matches!(err, Error::Precondition(_)));
}

/// A `ControlMessageReceive` with nothing pending times out as an internal
/// event: it is skipped with a warning, not treated as fatal.
#[tokio::test]
async fn control_message_receive_with_nothing_pending_times_out_quietly() {
    let cid = ControllerId::new("127.0.0.1", 8888);
    let fp = OFFingerprint::generic("echo_request", vec![]);
    let events = vec![Event::ControlMessageReceive {
        meta: meta("e1", 0),
        dpid: 1,
        controller_id: cid,
        fingerprint: fp,
    }];
    // Force a near-zero wait budget so the test doesn't actually sleep for
    // the default ten-second peek window.
    let mut dag = EventDag::with_peek_seconds(events, 0.0).unwrap();
    let mut sim = mock_simulation([1]);
    let registry = ProcessRegistry::new();
    let driver = ReplayDriver::new(std::time::Duration::from_millis(1));

    driver.run(&mut dag, &mut sim, &registry).await.unwrap();
}
