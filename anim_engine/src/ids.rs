//! Object identity and the per-instance id allocator.
//!
//! Ids are plain integers handed out in strictly increasing order.
//! The allocator remembers where it stood right after construction so
//! that a logical undo can rewind it exactly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Handle of one animated object inside a World.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ObjectId {
    fn from(raw: u32) -> Self {
        ObjectId(raw)
    }
}

/// Monotonic id counter owned by one ActionRecorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u32,
    initial: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 0, initial: 0 }
    }

    /// Hand out the next id. Panics on u32 exhaustion.
    pub fn allocate(&mut self) -> ObjectId {
        let id = self.next;
        self.next = match self.next.checked_add(1) {
            Some(n) => n,
            None => panic!("Overflow: object id space exhausted at {}", id),
        };
        ObjectId(id)
    }

    /// The id the next `allocate()` would return.
    pub fn peek(&self) -> ObjectId {
        ObjectId(self.next)
    }

    /// Record the current position as the post-construction baseline.
    pub fn mark_initial(&mut self) {
        self.initial = self.next;
    }

    /// Rewind to the post-construction baseline.
    pub fn reset(&mut self) {
        self.next = self.initial;
    }

    pub fn initial(&self) -> ObjectId {
        ObjectId(self.initial)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_is_monotonic() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.allocate(), ObjectId(0));
        assert_eq!(ids.allocate(), ObjectId(1));
        assert_eq!(ids.peek(), ObjectId(2));
    }

    #[test]
    fn test_reset_returns_to_marked_baseline() {
        let mut ids = IdAllocator::new();
        for _ in 0..5 {
            ids.allocate();
        }
        ids.mark_initial();
        ids.allocate();
        ids.allocate();
        ids.reset();
        assert_eq!(ids.peek(), ObjectId(5));
        assert_eq!(ids.initial(), ObjectId(5));
    }

    #[test]
    fn test_reset_without_mark_goes_to_zero() {
        let mut ids = IdAllocator::new();
        ids.allocate();
        ids.reset();
        assert_eq!(ids.peek(), ObjectId(0));
    }

    #[test]
    #[should_panic(expected = "Overflow")]
    fn test_allocate_overflow() {
        let mut ids = IdAllocator { next: u32::MAX, initial: 0 };
        ids.allocate();
    }
}
