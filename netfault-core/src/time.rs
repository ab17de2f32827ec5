// SPDX-License-Identifier: Apache-2.0

//! Logical time: a `(seconds, microseconds)` pair, monotonic only within a
//! single recording. Distinct from wall-clock time, which the driver
//! consults only to decide whether a [`crate::dag::EventDag::peek`] deadline
//! has elapsed.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A logical timestamp, recorded at microsecond resolution to match the
/// granularity of the control loop this harness drives.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogicalTime {
    pub sec: i64,
    pub usec: i64,
}

impl LogicalTime {
    pub fn new(sec: i64, usec: i64) -> Self {
        Self { sec, usec }
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.usec as f64 / 1_000_000.0
    }

    /// `self + amount`, where `amount` is a fractional-seconds duration such
    /// as `peek_seconds` or a `WaitTime` event's `wait_time`.
    pub fn plus_seconds(&self, amount: f64) -> Self {
        let total_usec = (self.sec as f64 * 1_000_000.0 + self.usec as f64 + amount * 1_000_000.0)
            .round() as i64;
        Self {
            sec: total_usec.div_euclid(1_000_000),
            usec: total_usec.rem_euclid(1_000_000),
        }
    }
}

impl From<LogicalTime> for Duration {
    fn from(t: LogicalTime) -> Self {
        Duration::new(t.sec.max(0) as u64, (t.usec.max(0) as u32) * 1_000)
    }
}

impl Serialize for WireTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeTuple;
        let mut tup = serializer.serialize_tuple(2)?;
        tup.serialize_element(&self.0.sec)?;
        tup.serialize_element(&self.0.usec)?;
        tup.end()
    }
}

/// Serde helper: `LogicalTime` is represented on the wire as the two-element
/// `[sec, usec]` array the JSON format requires, not as a `{sec, usec}` object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct WireTime(pub LogicalTime);

impl<'de> Deserialize<'de> for WireTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let (sec, usec) = <(i64, i64)>::deserialize(deserializer)?;
        Ok(WireTime(LogicalTime::new(sec, usec)))
    }
}

impl From<LogicalTime> for WireTime {
    fn from(t: LogicalTime) -> Self {
        WireTime(t)
    }
}

impl From<WireTime> for LogicalTime {
    fn from(t: WireTime) -> Self {
        t.0
    }
}
