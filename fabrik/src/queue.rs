use alloc::collections::BinaryHeap;
use core::cmp::{Ordering, Reverse};

use crate::dependency::Dependency;

struct Queued {
    sequence: usize,
    dependency: Dependency,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dependency
            .cmp_priority(&other.dependency)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

/// Min-priority queue of dependencies.
/// Dependencies with equal priorities are popped in the order they were pushed.
#[derive(Default)]
pub(crate) struct DependencyQueue {
    heap: BinaryHeap<Reverse<Queued>>,
    pushed: usize,
}

impl DependencyQueue {
    #[inline]
    #[must_use]
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, dependency: Dependency) {
        self.heap.push(Reverse(Queued {
            sequence: self.pushed,
            dependency,
        }));
        self.pushed += 1;
    }

    pub(crate) fn pop(&mut self) -> Option<Dependency> {
        self.heap.pop().map(|Reverse(queued)| queued.dependency)
    }

    #[inline]
    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }
}

impl Extend<Dependency> for DependencyQueue {
    fn extend<I: IntoIterator<Item = Dependency>>(&mut self, iter: I) {
        for dependency in iter {
            self.push(dependency);
        }
    }
}
