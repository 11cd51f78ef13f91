/*
 * Sleep/Wake Queue
 *
 * Threads that called `sleep_ticks` wait here until the timer interrupt
 * reaches their wake tick. The queue is kept sorted at all times:
 *
 * - wake tick ascending
 * - for equal wake ticks, priority descending
 * - for fully equal keys, insertion order
 *
 * so the timer interrupt only ever looks at the front. `drain_due` stops at
 * the first sleeper that is not yet due, which bounds the per-tick work to
 * the number of threads actually released.
 *
 * ## Storage
 *
 * The entries live in a fixed-capacity `heapless::Vec` (no allocation on
 * either side) stored in *reverse* release order: the next sleeper to wake
 * is the last element, so releasing it is a `pop`. Iteration through the
 * public API always yields release order.
 *
 * ## Contract
 *
 * A thread appears at most once. Inserting a thread twice, or more than
 * `MAX_SLEEPERS` threads, is a kernel bug and panics.
 */

use heapless::Vec;

use crate::config::MAX_SLEEPERS;
use crate::types::{Priority, ThreadId, Ticks};

/// A sleeping thread and the tick it becomes runnable at
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Sleeper {
    pub tid: ThreadId,
    pub wake_at: Ticks,
    pub priority: Priority,
}

impl Sleeper {
    /// Strict ordering: `self` is released before `other`.
    fn wakes_before(&self, other: &Sleeper) -> bool {
        self.wake_at < other.wake_at
            || (self.wake_at == other.wake_at && self.priority > other.priority)
    }
}

/// Ordered queue of sleeping threads
#[derive(Debug, Default)]
pub struct SleepQueue {
    /// Reverse release order: the next sleeper to wake is last.
    entries: Vec<Sleeper, MAX_SLEEPERS>,
}

impl SleepQueue {
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, tid: ThreadId) -> bool {
        self.entries.iter().any(|s| s.tid == tid)
    }

    /// The next sleeper to be released.
    pub fn peek(&self) -> Option<&Sleeper> {
        self.entries.last()
    }

    /// Wake tick of the next sleeper.
    pub fn next_wake(&self) -> Option<Ticks> {
        self.peek().map(|s| s.wake_at)
    }

    /// Sleepers in release order.
    pub fn iter(&self) -> impl Iterator<Item = &Sleeper> {
        self.entries.iter().rev()
    }

    /// Insert a sleeper, keeping the queue ordered.
    ///
    /// A new sleeper goes after every entry it does not strictly precede, so
    /// fully equal keys are released first-in first-out.
    pub fn insert(&mut self, sleeper: Sleeper) {
        assert!(
            !self.contains(sleeper.tid),
            "sleep queue: thread {} is already sleeping",
            sleeper.tid.0
        );

        let len = self.entries.len();
        let position = self
            .iter()
            .position(|queued| sleeper.wakes_before(queued))
            .unwrap_or(len);

        if self.entries.insert(len - position, sleeper).is_err() {
            panic!(
                "sleep queue overflow: more than {} sleeping threads",
                MAX_SLEEPERS
            );
        }

        debug_assert!(self.is_ordered(), "sleep queue ordering broken");
    }

    /// Remove and return the front sleeper if it is due at `now`.
    pub fn pop_due(&mut self, now: Ticks) -> Option<Sleeper> {
        match self.entries.last() {
            Some(front) if front.wake_at <= now => self.entries.pop(),
            _ => None,
        }
    }

    /// Release every sleeper whose wake tick is `<= now`, front first,
    /// handing each one to `wake`. Returns how many were released.
    ///
    /// Afterwards no remaining entry is due at `now`.
    pub fn drain_due<F>(&mut self, now: Ticks, mut wake: F) -> usize
    where
        F: FnMut(Sleeper),
    {
        let mut released = 0;
        while let Some(sleeper) = self.pop_due(now) {
            wake(sleeper);
            released += 1;
        }
        released
    }

    /// Check the ordering invariant over every adjacent pair.
    pub fn is_ordered(&self) -> bool {
        self.iter()
            .zip(self.iter().skip(1))
            .all(|(a, b)| !b.wakes_before(a))
    }
}
