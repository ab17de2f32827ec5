// SPDX-License-Identifier: Apache-2.0

//! Intercepted connection (C4): sits between an external controller's
//! socket and a simulated switch. Owned 1:1 by its I/O worker; the driver
//! only ever touches `blocked` through `ControlChannelBlock`/`Unblock`.

use crate::fingerprint::{ControllerId, Dpid};
use crate::scheduler::OfpMessage;
use std::sync::atomic::{AtomicBool, Ordering};

/// Delivers a message the God Scheduler has released to the switch's real
/// handler. Kept as a trait object so `netfault-mock` (and eventually a real
/// socket-backed implementation) can plug in without this crate depending on
/// any particular I/O runtime beyond `tokio`'s task model.
pub trait SwitchHandler: Send + Sync {
    fn deliver(&self, msg: &OfpMessage);
}

/// Per-switch, per-controller channel. While blocked, the connection neither
/// reads from nor writes to the socket; the kernel's socket buffer absorbs
/// backpressure, which is acceptable for replay workloads per `spec.md` §4.4.
pub struct InterceptedConnection {
    pub dpid: Dpid,
    pub controller_id: ControllerId,
    blocked: AtomicBool,
    handler: Box<dyn SwitchHandler>,
}

impl InterceptedConnection {
    pub fn new(dpid: Dpid, controller_id: ControllerId, handler: Box<dyn SwitchHandler>) -> Self {
        Self {
            dpid,
            controller_id,
            blocked: AtomicBool::new(false),
            handler,
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::Acquire)
    }

    /// Set by `ControlChannelBlock::proceed` on the driver thread.
    pub fn block(&self) {
        self.blocked.store(true, Ordering::Release);
    }

    /// Set by `ControlChannelUnblock::proceed` on the driver thread.
    pub fn unblock(&self) {
        self.blocked.store(false, Ordering::Release);
    }

    /// Called back by the God Scheduler once it has decided a pending
    /// message may be delivered.
    pub fn allow_message(&self, msg: &OfpMessage) {
        self.handler.deliver(msg);
    }
}

impl std::fmt::Debug for InterceptedConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptedConnection")
            .field("dpid", &self.dpid)
            .field("controller_id", &self.controller_id)
            .field("blocked", &self.is_blocked())
            .finish()
    }
}
