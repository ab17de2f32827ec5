// SPDX-License-Identifier: Apache-2.0

//! Stable, hashable identities (C1). Fingerprints are purely functional
//! derivations of message or failure-target bytes: the same bytes must
//! produce the same fingerprint across recording and replay, so every field
//! here is `Eq + Hash` and the wire form is a plain ordered tuple rather than
//! a struct with named keys.

use serde::{Deserialize, Serialize};

/// Datapath id of a simulated switch.
pub type Dpid = u64;

/// `(host, port)` identity of an external controller process, written on the
/// wire as the two-element `[host, port]` array the JSON format specifies.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControllerId(pub String, pub u16);

impl ControllerId {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self(host.into(), port)
    }
}

/// A single slot of an opaque ordered fingerprint tuple. Untagged so the
/// wire form stays a plain JSON array/scalar mix, matching `spec.md`'s
/// description of fingerprints as "opaque ordered tuples."
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Field {
    Int(i64),
    Str(String),
    Tuple(Vec<Field>),
}

impl From<i64> for Field {
    fn from(v: i64) -> Self {
        Field::Int(v)
    }
}

impl From<u64> for Field {
    fn from(v: u64) -> Self {
        Field::Int(v as i64)
    }
}

impl From<&str> for Field {
    fn from(v: &str) -> Self {
        Field::Str(v.to_owned())
    }
}

impl From<String> for Field {
    fn from(v: String) -> Self {
        Field::Str(v)
    }
}

/// Identity of a data-plane packet: typically
/// `⟨src_mac, dst_mac, ethertype, ip_src, ip_dst, proto, l4_payload_hash⟩`,
/// or an equivalent canonicalization supplied by the patch panel.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DPFingerprint(pub Vec<Field>);

impl DPFingerprint {
    /// Canonical 7-tuple constructor for an Ethernet/IP/L4 packet.
    #[allow(clippy::too_many_arguments)]
    pub fn packet(
        src_mac: impl Into<String>,
        dst_mac: impl Into<String>,
        ethertype: u64,
        ip_src: impl Into<String>,
        ip_dst: impl Into<String>,
        proto: u64,
        l4_payload_hash: u64,
    ) -> Self {
        Self(vec![
            Field::from(src_mac.into()),
            Field::from(dst_mac.into()),
            Field::from(ethertype),
            Field::from(ip_src.into()),
            Field::from(ip_dst.into()),
            Field::from(proto),
            Field::from(l4_payload_hash),
        ])
    }

    /// Escape hatch for canonicalizations the patch panel supplies directly.
    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self(fields)
    }
}

/// Identity of an OpenFlow control message: the message type plus
/// type-dependent salient fields.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OFFingerprint(pub Vec<Field>);

impl OFFingerprint {
    /// `packet_out`'s identity is the embedded data-plane fingerprint.
    pub fn packet_out(dp: &DPFingerprint) -> Self {
        Self(vec![
            Field::from("packet_out"),
            Field::Tuple(dp.0.clone()),
        ])
    }

    /// `flow_mod`'s identity is its match plus its actions, each already
    /// canonicalized to a string by the OpenFlow wire library upstream of
    /// this core.
    pub fn flow_mod(match_fields: impl Into<String>, actions: impl Into<String>) -> Self {
        Self(vec![
            Field::from("flow_mod"),
            Field::from(match_fields.into()),
            Field::from(actions.into()),
        ])
    }

    /// Any other message type, identified by its type name plus whatever
    /// salient fields the caller has already canonicalized.
    pub fn generic(message_type: impl Into<String>, fields: Vec<Field>) -> Self {
        let mut all = vec![Field::from(message_type.into())];
        all.extend(fields);
        Self(all)
    }

    pub fn from_fields(fields: Vec<Field>) -> Self {
        Self(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bytes_same_fingerprint() {
        let a = DPFingerprint::packet("aa:aa", "bb:bb", 0x0800, "10.0.0.1", "10.0.0.2", 6, 42);
        let b = DPFingerprint::packet("aa:aa", "bb:bb", 0x0800, "10.0.0.1", "10.0.0.2", 6, 42);
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn packet_out_embeds_dataplane_fingerprint() {
        let dp = DPFingerprint::packet("aa", "bb", 0x0800, "10.0.0.1", "10.0.0.2", 6, 1);
        let of_a = OFFingerprint::packet_out(&dp);
        let of_b = OFFingerprint::packet_out(&dp);
        assert_eq!(of_a, of_b);
    }

    #[test]
    fn controller_id_round_trips_as_pair() {
        let id = ControllerId::new("127.0.0.1", 8888);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#"["127.0.0.1",8888]"#);
        let back: ControllerId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
