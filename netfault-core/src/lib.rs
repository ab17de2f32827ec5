// SPDX-License-Identifier: Apache-2.0

//! The event-driven replay engine for a deterministic SDN fault-injection
//! harness: a closed event model with a lossless JSON codec, an [`dag::EventDag`]
//! that prunes causal dependents, a [`scheduler::GodScheduler`] that arbitrates
//! intercepted control messages, and a [`driver::ReplayDriver`] that walks the
//! DAG against a [`facade::Simulation`].
//!
//! Everything outside of those is an external collaborator: real topology,
//! real controller processes, and the data-plane patch panel are reached only
//! through the narrow traits in [`facade`]. [`netfault_mock`](../netfault_mock)
//! ships one (intentionally toy) implementation of them.

pub type Result<T, E = Error> = core::result::Result<T, E>;

mod error;
pub mod label;
pub mod time;

pub mod fingerprint;

pub mod connection;
pub mod dag;
pub mod driver;
pub mod event;
pub mod facade;
pub mod scheduler;
pub mod trace;

pub use error::Error;
