//! Deterministic single-threaded timer queue for the session controller.
//!
//! Entries fire in non-decreasing `(due, seq)` order over a virtual
//! monotonic clock driven by the host through `advance_clock` + `pop_due`.
//! Chat entries carry the epoch they were issued under so a bulk cancel
//! (peer switch, paywall lock) can drop the whole batch at once.

use std::{cmp::Ordering, collections::BinaryHeap, time::Duration};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Task {
    CompleteConnection,
    ChatMessage { text: String },
    Tick,
    Lock,
}

#[derive(Debug)]
pub(crate) struct Entry {
    pub due: Duration,
    pub seq: u64,
    pub epoch: Option<u64>,
    pub task: Task,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed so the max-heap pops the earliest (due, seq) first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Default)]
pub(crate) struct Scheduler {
    now: Duration,
    next_seq: u64,
    queue: BinaryHeap<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_in(&mut self, delay: Duration, epoch: Option<u64>, task: Task) {
        self.schedule_at(self.now + delay, epoch, task);
    }

    pub fn schedule_at(&mut self, due: Duration, epoch: Option<u64>, task: Task) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry {
            due,
            seq,
            epoch,
            task,
        });
    }

    /// Drops every pending entry issued under `epoch`.
    pub fn cancel_epoch(&mut self, epoch: u64) {
        self.queue.retain(|entry| entry.epoch != Some(epoch));
    }

    pub fn clear_pending(&mut self) {
        self.queue.clear();
    }

    #[cfg(test)]
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    pub fn advance_clock(&mut self, dt: Duration) {
        self.now += dt;
    }

    /// Pops the next entry whose due time has been reached, if any.
    pub fn pop_due(&mut self) -> Option<Entry> {
        if self.queue.peek().is_some_and(|entry| entry.due <= self.now) {
            self.queue.pop()
        } else {
            None
        }
    }
}
