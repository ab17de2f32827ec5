// SPDX-License-Identifier: Apache-2.0

//! Property-based coverage for the invariants the concrete scenario tests
//! can't exhaustively probe: JSON round-tripping, label uniqueness, and the
//! pruning/splitting laws `EventDag` promises regardless of input shape.

use netfault_core::dag::EventDag;
use netfault_core::event::{Event, EventMeta};
use netfault_core::label::LabelAllocator;
use netfault_core::time::LogicalTime;
use proptest::collection::vec as pvec;
use proptest::prelude::*;
use std::collections::HashSet;

fn arb_dpid() -> impl Strategy<Value = u64> {
    0u64..1000
}

fn arb_time() -> impl Strategy<Value = LogicalTime> {
    (0i64..100_000, 0i64..1_000_000).prop_map(|(sec, usec)| LogicalTime::new(sec, usec))
}

fn arb_switch_failure() -> impl Strategy<Value = Event> {
    (arb_time(), arb_dpid()).prop_map(|(time, dpid)| Event::SwitchFailure {
        meta: EventMeta::new("unlabeled", time),
        dpid,
    })
}

proptest! {
    #[test]
    fn event_json_round_trips(dpid in arb_dpid(), sec in 0i64..100_000, usec in 0i64..1_000_000) {
        let event = Event::SwitchFailure {
            meta: EventMeta::new("e0", LogicalTime::new(sec, usec)),
            dpid,
        };
        let line = event.to_json_line();
        let back = Event::from_json_line(&line).unwrap();
        prop_assert_eq!(event, back);
    }

    #[test]
    fn label_allocator_never_repeats(n in 1usize..500) {
        let allocator = LabelAllocator::new();
        let mut seen = HashSet::with_capacity(n);
        for _ in 0..n {
            let label = allocator.next();
            prop_assert!(seen.insert(label), "label allocator produced a duplicate");
        }
    }

    /// Every chunk `split_inputs` hands back is non-empty, there are exactly
    /// `k` of them, and concatenating them reconstructs the original order —
    /// regardless of how many events or how many-way the split is, as long
    /// as `1 <= k <= len`.
    #[test]
    fn split_inputs_is_total_and_order_preserving(
        n in 1usize..64,
        k_seed in 1usize..64,
    ) {
        let events: Vec<Event> = (0..n)
            .map(|i| Event::SwitchFailure {
                meta: EventMeta::new(format!("e{i}"), LogicalTime::new(i as i64, 0)),
                dpid: i as u64,
            })
            .collect();
        let dag = EventDag::new(events.clone()).unwrap();
        let k = 1 + (k_seed % n);

        let splits = dag.split_inputs(k).unwrap();
        prop_assert_eq!(splits.len(), k);
        prop_assert!(splits.iter().all(|s| !s.is_empty()));
        let flattened: Vec<Event> = splits.into_iter().flatten().collect();
        prop_assert_eq!(flattened, events);
    }

    /// Pruning a non-recovery input event always removes every event in its
    /// `dependent_labels` transitive closure, including chains of more than
    /// one hop.
    #[test]
    fn pruning_removes_full_dependent_closure(chain_len in 1usize..12) {
        let mut events = Vec::with_capacity(chain_len);
        for i in 0..chain_len {
            events.push(Event::SwitchFailure {
                meta: EventMeta::new(format!("e{i}"), LogicalTime::new(i as i64, 0)),
                dpid: i as u64,
            });
        }
        // Chain dependent_labels: e0 depends on e1, e1 on e2, ...
        for i in 0..chain_len.saturating_sub(1) {
            let next_label = format!("e{}", i + 1);
            events[i].add_dependent_label(next_label);
        }

        let mut dag = EventDag::new(events).unwrap();
        dag.remove(&HashSet::from(["e0".to_string()]));
        prop_assert!(dag.is_empty());
    }

    /// Pruning a label that isn't in the DAG (already removed, or a recovery
    /// kind the caller passed in directly) never panics and is a no-op on
    /// the remaining events.
    #[test]
    fn pruning_unknown_label_is_a_no_op(events in pvec(arb_switch_failure(), 0..5)) {
        let mut labeled = Vec::with_capacity(events.len());
        for (i, mut e) in events.into_iter().enumerate() {
            let label = format!("e{i}");
            match &mut e {
                Event::SwitchFailure { meta, .. } => meta.label = label,
                _ => unreachable!(),
            }
            labeled.push(e);
        }
        let before_len = labeled.len();
        let mut dag = EventDag::new(labeled).unwrap();
        dag.remove(&HashSet::from(["does-not-exist".to_string()]));
        prop_assert_eq!(dag.len(), before_len);
    }
}
