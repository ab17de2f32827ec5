// SPDX-License-Identifier: Apache-2.0

//! Maps each fingerprint-bearing event to its [`Fingerprint`]: the identity
//! two events of the same kind share when they refer to the same physical
//! target. Only failure-bearing and message-observing events have one
//! (`spec.md` §3); everything else returns `None`.

use super::Event;
use crate::fingerprint::{ControllerId, DPFingerprint, Dpid, OFFingerprint};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Fingerprint {
    Switch(Dpid),
    Link {
        start_dpid: Dpid,
        start_port_no: u32,
        end_dpid: Dpid,
        end_port_no: u32,
    },
    Controller(ControllerId),
    ControlChannel {
        dpid: Dpid,
        controller_id: ControllerId,
    },
    DataPlane(DPFingerprint),
    ControlMessage {
        dpid: Dpid,
        controller_id: ControllerId,
        fingerprint: OFFingerprint,
    },
}

impl Event {
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        match self {
            Event::SwitchFailure { dpid, .. } | Event::SwitchRecovery { dpid, .. } => {
                Some(Fingerprint::Switch(*dpid))
            }
            Event::LinkFailure {
                start_dpid,
                start_port_no,
                end_dpid,
                end_port_no,
                ..
            }
            | Event::LinkRecovery {
                start_dpid,
                start_port_no,
                end_dpid,
                end_port_no,
                ..
            } => Some(Fingerprint::Link {
                start_dpid: *start_dpid,
                start_port_no: *start_port_no,
                end_dpid: *end_dpid,
                end_port_no: *end_port_no,
            }),
            Event::ControllerFailure { controller_id, .. }
            | Event::ControllerRecovery { controller_id, .. } => {
                Some(Fingerprint::Controller(controller_id.clone()))
            }
            Event::ControlChannelBlock {
                dpid,
                controller_id,
                ..
            }
            | Event::ControlChannelUnblock {
                dpid,
                controller_id,
                ..
            } => Some(Fingerprint::ControlChannel {
                dpid: *dpid,
                controller_id: controller_id.clone(),
            }),
            Event::DataplaneDrop { fingerprint, .. } | Event::DataplanePermit { fingerprint, .. } => {
                Some(Fingerprint::DataPlane(fingerprint.clone()))
            }
            Event::ControlMessageReceive {
                dpid,
                controller_id,
                fingerprint,
                ..
            } => Some(Fingerprint::ControlMessage {
                dpid: *dpid,
                controller_id: controller_id.clone(),
                fingerprint: fingerprint.clone(),
            }),
            Event::HostMigration { .. }
            | Event::PolicyChange { .. }
            | Event::TrafficInjection { .. }
            | Event::WaitTime { .. }
            | Event::CheckInvariants { .. }
            | Event::ControllerStateChange { .. }
            | Event::DeterministicValue { .. } => None,
        }
    }
}
