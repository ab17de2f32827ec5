// SPDX-License-Identifier: Apache-2.0

//! Event DAG (C3): an ordered event list plus label→event and event→position
//! indices. Not a general graph — dependencies live only in each parent's
//! `dependent_labels`, per `spec.md` §3.

use crate::event::{Event, EventKind};
use crate::time::LogicalTime;
use crate::{Error, Result};
use std::collections::{HashMap, HashSet};

/// How far past the next input event's logical time the driver is willing
/// to wait for an internal event before treating it as timed out.
pub const DEFAULT_PEEK_SECONDS: f64 = 10.0;

#[derive(Debug, Clone)]
pub struct EventDag {
    events: Vec<Event>,
    label_to_index: HashMap<String, usize>,
    /// Dynamic per-label deadline computed by `peek()` — the Design Note's
    /// reification of the source's dict-keyed-by-event-identity hack.
    wait_times: HashMap<String, LogicalTime>,
    peek_seconds: f64,
    is_view: bool,
}

fn is_pairable_failure(kind: EventKind) -> bool {
    matches!(
        kind,
        EventKind::SwitchFailure
            | EventKind::LinkFailure
            | EventKind::ControllerFailure
            | EventKind::ControlChannelBlock
    )
}

impl EventDag {
    /// Builds a DAG from a freshly loaded or freshly generated event list.
    /// Runs invalid-input-sequence marking (failure/recovery pairing).
    pub fn new(events: Vec<Event>) -> Result<Self> {
        Self::build(events, false, DEFAULT_PEEK_SECONDS)
    }

    pub fn with_peek_seconds(events: Vec<Event>, peek_seconds: f64) -> Result<Self> {
        Self::build(events, false, peek_seconds)
    }

    fn build(events: Vec<Event>, is_view: bool, peek_seconds: f64) -> Result<Self> {
        let mut label_to_index = HashMap::with_capacity(events.len());
        for (idx, event) in events.iter().enumerate() {
            if label_to_index.insert(event.label().to_string(), idx).is_some() {
                return Err(Error::Structural(format!(
                    "duplicate event label {:?}",
                    event.label()
                )));
            }
        }

        let mut dag = Self {
            events,
            label_to_index,
            wait_times: HashMap::new(),
            peek_seconds,
            is_view,
        };

        if !is_view {
            dag.mark_invalid_input_sequences();
        }

        Ok(dag)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&Event> {
        self.label_to_index.get(label).map(|&idx| &self.events[idx])
    }

    pub fn wait_time(&self, label: &str) -> Option<LogicalTime> {
        self.wait_times.get(label).copied()
    }

    pub fn peek_seconds(&self) -> f64 {
        self.peek_seconds
    }

    /// For each consecutive pair of `InputEvent`s `(a, b)`, `a`'s own deadline
    /// is `time(b) + peek_seconds` (the last input's deadline is the last
    /// event's time plus `peek_seconds`). That deadline is then carried
    /// forward onto every `InternalEvent` between `a` and `b` — those are the
    /// events that actually loop on `NotYet` and need a deadline to time out
    /// against. `InternalEvent`s preceding the first `InputEvent` inherit that
    /// first input's deadline, since nothing earlier governs them.
    pub fn peek(&mut self) {
        self.wait_times.clear();

        let input_indices: Vec<usize> = self
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_input())
            .map(|(i, _)| i)
            .collect();

        if input_indices.is_empty() {
            return;
        }

        let mut deadline_at: Vec<Option<LogicalTime>> = vec![None; self.events.len()];

        for window in input_indices.windows(2) {
            let (current, next) = (window[0], window[1]);
            deadline_at[current] = Some(self.events[next].time().plus_seconds(self.peek_seconds));
        }
        let last_input = *input_indices.last().unwrap();
        let last_event_time = self.events.last().unwrap().time();
        deadline_at[last_input] = Some(last_event_time.plus_seconds(self.peek_seconds));

        // Carry each input's deadline forward onto the internal events that
        // follow it, up to (not including) the next input.
        let mut running = None;
        for slot in deadline_at.iter_mut() {
            if slot.is_some() {
                running = *slot;
            } else {
                *slot = running;
            }
        }

        // Internal events before the first input have nothing to inherit
        // from going forward; back-fill them with the first input's deadline.
        let mut running = None;
        for slot in deadline_at.iter_mut().rev() {
            if slot.is_some() {
                running = *slot;
            } else {
                *slot = running;
            }
        }

        for (idx, event) in self.events.iter().enumerate() {
            if let Some(deadline) = deadline_at[idx] {
                self.wait_times.insert(event.label().to_string(), deadline);
            }
        }
    }

    /// Mutates in place: for each `e` in `labels` that is an `InputEvent` and
    /// not a recovery kind, recursively removes `e` plus every event in the
    /// transitive closure of its `dependent_labels`. Runs `peek()` afterward
    /// since causal dependencies change with the prefix.
    pub fn remove(&mut self, labels: &HashSet<String>) {
        let roots: Vec<String> = labels
            .iter()
            .filter_map(|label| self.get(label))
            .filter(|e| e.is_input() && !e.kind().is_recovery())
            .map(|e| e.label().to_string())
            .collect();

        for label in roots {
            self.remove_event_and_dependents(&label);
        }

        self.rebuild_indices();
        self.peek();
    }

    fn remove_event_and_dependents(&mut self, label: &str) {
        let Some(&idx) = self.label_to_index.get(label) else {
            return;
        };
        let dependents = self.events[idx].dependent_labels().to_vec();

        self.label_to_index.remove(label);
        self.events.remove(idx);
        // Positions after `idx` shift down by one; `rebuild_indices` at the
        // end of `remove` restores a dense mapping, so a stale shift here is
        // harmless as long as every lookup in this recursive pass goes
        // through `label_to_index`, which we just fixed up.
        for (l, i) in self.label_to_index.iter_mut() {
            if *i > idx {
                *i -= 1;
            }
            let _ = l;
        }

        for dependent_label in dependents {
            self.remove_event_and_dependents(&dependent_label);
        }
    }

    fn rebuild_indices(&mut self) {
        self.label_to_index = self
            .events
            .iter()
            .enumerate()
            .map(|(i, e)| (e.label().to_string(), i))
            .collect();
    }

    /// Non-mutating: a fresh DAG copy marked as a view, with `remove(labels)`
    /// applied.
    pub fn ignore_portion(&self, labels: &HashSet<String>) -> Self {
        let mut view = Self::build(self.events.clone(), true, self.peek_seconds)
            .expect("cloning an already-valid event list cannot violate label uniqueness");
        view.remove(labels);
        view
    }

    /// Partitions the ordered list into `k` contiguous, non-empty slices of
    /// approximately equal length — the remainder distributed across the
    /// first slices rather than dumped entirely onto the last one, which is
    /// what guarantees exactly `k` non-empty slices whenever `1 <= k <= len`.
    pub fn split_inputs(&self, k: usize) -> Result<Vec<Vec<Event>>> {
        let n = self.events.len();
        if k < 1 || k > n {
            return Err(Error::Precondition(format!(
                "split_inputs: k={k} out of range for {n} events"
            )));
        }

        let base = n / k;
        let remainder = n % k;

        let mut splits = Vec::with_capacity(k);
        let mut start = 0;
        for i in 0..k {
            let size = base + usize::from(i < remainder);
            splits.push(self.events[start..start + size].to_vec());
            start += size;
        }
        Ok(splits)
    }

    fn mark_invalid_input_sequences(&mut self) {
        let mut previous_failure: HashMap<(EventKind, crate::event::Fingerprint), usize> =
            HashMap::new();

        for idx in 0..self.events.len() {
            let kind = self.events[idx].kind();
            let Some(fingerprint) = self.events[idx].fingerprint() else {
                continue;
            };

            if is_pairable_failure(kind) {
                previous_failure.insert((kind, fingerprint), idx);
            } else if let Some(failure_kind) = kind.matching_failure_kind() {
                if let Some(&failure_idx) = previous_failure.get(&(failure_kind, fingerprint)) {
                    let recovery_label = self.events[idx].label().to_string();
                    self.events[failure_idx].add_dependent_label(recovery_label);
                }
            }
        }
    }
}
