// SPDX-License-Identifier: Apache-2.0

use crate::event::EventKind;
use core::fmt;

/// The six error kinds the replay engine distinguishes. Each maps to a
/// distinct process exit code in `netfault-cli`; none is ever swallowed.
#[derive(Debug)]
pub enum Error {
    /// Malformed JSON, an unknown event `class`, or a missing mandatory
    /// field. Loading the trace aborts.
    Structural(String),
    /// The trace does not match the current simulation prefix: unblocking an
    /// already-unblocked channel, scheduling a message that isn't pending,
    /// and the like.
    Precondition(String),
    /// An `InputEvent` never became `Done` before its peek-derived deadline.
    /// Always fatal.
    InputTimeout { label: String, kind: EventKind },
    /// A controller process died, or a socket errored, outside of any event
    /// the driver was waiting on.
    External(String),
    /// A shutdown signal was observed; cleanup ran and the driver stopped.
    Signal,
    /// `CheckInvariants` found a violation and `fail_on_error` was set.
    InvariantViolation(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Structural(msg) => write!(f, "structural error: {msg}"),
            Error::Precondition(msg) => write!(f, "precondition violated: {msg}"),
            Error::InputTimeout { label, kind } => {
                write!(f, "input event {label} ({kind:?}) timed out")
            }
            Error::External(msg) => write!(f, "external error: {msg}"),
            Error::Signal => write!(f, "replay aborted by signal"),
            Error::InvariantViolation(msg) => write!(f, "invariant violation: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Structural(err.to_string())
    }
}

impl Error {
    /// Process exit code for this error, per the harness's documented exit
    /// code contract (`0` normal, `5` invariant violation, others fatal).
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvariantViolation(_) => 5,
            Error::Structural(_) => 2,
            Error::Precondition(_) => 3,
            Error::InputTimeout { .. } => 4,
            Error::External(_) => 6,
            Error::Signal => 130,
        }
    }
}
