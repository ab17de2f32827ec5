// SPDX-License-Identifier: Apache-2.0

//! The source's labels come from a process-wide monotonic counter hung off
//! a metaclass. Per the design notes, that's hidden global state; here an
//! explicit [`LabelAllocator`] is passed to whichever code is minting new
//! events (the fuzzer), while the JSON loader supplies labels directly from
//! the trace file and never touches this allocator at all.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct LabelAllocator {
    next: AtomicU64,
}

impl LabelAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Returns a fresh, globally-unique-within-this-allocator label.
    pub fn next(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("e{n}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_unique() {
        let alloc = LabelAllocator::new();
        let labels: Vec<_> = (0..100).map(|_| alloc.next()).collect();
        let unique: std::collections::HashSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), labels.len());
    }
}
