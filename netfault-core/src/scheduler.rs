// SPDX-License-Identifier: Apache-2.0

//! God Scheduler (C5): the process-wide registry of pending control
//! messages. A single mutex guards the whole map — `spec.md` §5 only
//! requires that `insert_pending`, `message_waiting`, `schedule`, and `drop`
//! each be atomic, not that different keys be independently lockable.

use crate::connection::InterceptedConnection;
use crate::fingerprint::{ControllerId, Dpid, OFFingerprint};
use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

/// The core does not define the OpenFlow wire format (`spec.md` §6); it
/// relies on an upstream library to parse and fingerprint messages, and
/// treats the parsed message as an opaque byte string from here on.
pub type OfpMessage = Vec<u8>;

/// `(dpid, controller_id, fingerprint)` — the key a pending message, and the
/// `ControlMessageReceive` event that releases it, are both identified by.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PendingReceive {
    pub dpid: Dpid,
    pub controller_id: ControllerId,
    pub fingerprint: OFFingerprint,
}

struct PendingEntry {
    msg: OfpMessage,
    connection: Arc<InterceptedConnection>,
}

/// A process-wide (single-simulation-wide) registry of pending control
/// messages, keyed by `(dpid, controller_id, fingerprint)`. Within one key,
/// FIFO order is preserved; across keys, order is unconstrained until the
/// replay script emits explicit `ControlMessageReceive` events.
#[derive(Default)]
pub struct GodScheduler {
    pending: Mutex<HashMap<PendingReceive, VecDeque<PendingEntry>>>,
}

impl GodScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by an I/O worker when a control message arrives from a
    /// controller, instead of letting it reach the switch directly.
    pub fn insert_pending(
        &self,
        dpid: Dpid,
        controller_id: ControllerId,
        fingerprint: OFFingerprint,
        msg: OfpMessage,
        connection: Arc<InterceptedConnection>,
    ) {
        let key = PendingReceive {
            dpid,
            controller_id,
            fingerprint,
        };
        self.pending
            .lock()
            .entry(key)
            .or_default()
            .push_back(PendingEntry { msg, connection });
    }

    /// Non-destructive check for a head entry under this key.
    pub fn message_waiting(&self, key: &PendingReceive) -> bool {
        self.pending
            .lock()
            .get(key)
            .is_some_and(|q| !q.is_empty())
    }

    /// Pop the head entry under `key` and hand it to its connection. The
    /// caller (the driver, via `ControlMessageReceive::proceed`) should
    /// always check `message_waiting` first; calling this on an empty key
    /// is a precondition error, not silently ignored.
    pub fn schedule(&self, key: &PendingReceive) -> Result<()> {
        let entry = {
            let mut pending = self.pending.lock();
            let queue = pending
                .get_mut(key)
                .ok_or_else(|| Error::Precondition(format!("no pending messages for {key:?}")))?;
            queue.pop_front().ok_or_else(|| {
                Error::Precondition(format!("no pending messages for {key:?}"))
            })?
        };
        // Deliver outside the lock: `allow_message` may itself do I/O, and
        // the scheduler must never be held while a collaborator runs.
        entry.connection.allow_message(&entry.msg);
        Ok(())
    }

    /// Pop and discard the head entry under `key` without delivering it.
    pub fn drop(&self, key: &PendingReceive) -> Result<()> {
        let mut pending = self.pending.lock();
        let queue = pending
            .get_mut(key)
            .ok_or_else(|| Error::Precondition(format!("no pending messages for {key:?}")))?;
        queue
            .pop_front()
            .ok_or_else(|| Error::Precondition(format!("no pending messages for {key:?}")))?;
        Ok(())
    }
}
