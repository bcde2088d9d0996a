//! Deferred delivery of outgoing messages ("send after N milliseconds").
//!
//! Entries cannot be cancelled once scheduled.

use crate::midi::MidiMessage;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
struct Entry {
    due_ms: f64,
    seq: u64,
    message: MidiMessage,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms.to_bits() == other.due_ms.to_bits() && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// BinaryHeap is a max-heap, reversed here so the earliest entry pops first.
// Equal due times pop in scheduling order.
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due_ms
            .total_cmp(&other.due_ms)
            .then(self.seq.cmp(&other.seq))
            .reverse()
    }
}

#[derive(Debug, Default)]
pub struct DeferredQueue {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, message: MidiMessage, due_ms: f64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            due_ms,
            seq,
            message,
        });
    }

    /// Removes and returns every message due at or before `now_ms`.
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<MidiMessage> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|entry| entry.due_ms <= now_ms) {
            if let Some(entry) = self.heap.pop() {
                due.push(entry.message);
            }
        }
        due
    }

    pub fn drain_all(&mut self) -> Vec<MidiMessage> {
        self.drain_due(f64::INFINITY)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn off(note: u8) -> MidiMessage {
        MidiMessage::NoteOff {
            channel: 0,
            note,
            velocity: 0,
        }
    }

    #[test]
    fn test_drains_in_due_order() {
        let mut queue = DeferredQueue::new();
        queue.schedule(off(62), 300.0);
        queue.schedule(off(60), 100.0);
        queue.schedule(off(61), 200.0);

        assert!(queue.drain_due(50.0).is_empty());
        assert_eq!(queue.drain_due(250.0), vec![off(60), off(61)]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.drain_due(300.0), vec![off(62)]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_equal_due_times_keep_schedule_order() {
        let mut queue = DeferredQueue::new();
        for note in [64, 60, 67] {
            queue.schedule(off(note), 100.0);
        }
        assert_eq!(queue.drain_due(100.0), vec![off(64), off(60), off(67)]);
    }

    #[test]
    fn test_retriggered_note_keeps_both_releases() {
        let mut queue = DeferredQueue::new();
        queue.schedule(off(60), 250.0);
        queue.schedule(off(60), 375.0);
        assert_eq!(queue.drain_all(), vec![off(60), off(60)]);
    }
}
