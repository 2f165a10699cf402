//! Insertion Order Module
//!
//! Tracks the order in which keys were stored, for oldest-first eviction.

use std::collections::VecDeque;

// == Insertion Order ==
/// Tracks keys by the time they were last written.
///
/// Keys are stored in a VecDeque where:
/// - Front = Most recently stored
/// - Back = Oldest stored
///
/// Reads never reorder keys. Only a write (`record`) moves a key to the
/// front, so the back is always the entry with the smallest `stored_at`,
/// with earlier writes winning ties.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    order: VecDeque<String>,
}

impl InsertionOrder {
    // == Constructor ==
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Record ==
    /// Marks a key as just stored (moves it to the front).
    pub fn record(&mut self, key: &str) {
        self.remove(key);
        self.order.push_front(key.to_string());
    }

    // == Remove ==
    /// Stops tracking a key. No-op when absent.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Pop Oldest ==
    /// Returns and forgets the oldest stored key.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_back()
    }

    /// Returns the oldest stored key without removing it.
    #[allow(dead_code)]
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.back()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[allow(dead_code)]
    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}
