//! Waiting queue for unmatched connections
//!
//! Strict FIFO: the longest-waiting connection is always matched first.
//! No priority, no skill matching. A connection appears here only while it
//! has no room; matchmaking and disconnect keep that exclusive.

use std::collections::VecDeque;

use crate::types::ClientId;

/// A queued connection awaiting a partner
#[derive(Debug, Clone)]
pub struct WaitingEntry {
    pub client_id: ClientId,
    pub username: String,
}

/// FIFO of connections seeking a partner
#[derive(Debug, Default)]
pub struct WaitingQueue {
    entries: VecDeque<WaitingEntry>,
}

impl WaitingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a connection to the back of the queue
    pub fn push(&mut self, client_id: ClientId, username: String) {
        self.entries.push_back(WaitingEntry {
            client_id,
            username,
        });
    }

    /// Pop the longest-waiting connection, if any
    pub fn pop_oldest(&mut self) -> Option<WaitingEntry> {
        self.entries.pop_front()
    }

    /// Remove a connection's entry; returns false if it was not queued
    ///
    /// Preserves the arrival order of the remaining entries.
    pub fn remove(&mut self, client_id: ClientId) -> bool {
        if let Some(pos) = self
            .entries
            .iter()
            .position(|e| e.client_id == client_id)
        {
            self.entries.remove(pos);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, client_id: ClientId) -> bool {
        self.entries.iter().any(|e| e.client_id == client_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = WaitingQueue::new();
        let a = ClientId::new();
        let b = ClientId::new();
        let c = ClientId::new();

        queue.push(a, "A".to_string());
        queue.push(b, "B".to_string());
        queue.push(c, "C".to_string());

        assert_eq!(queue.pop_oldest().unwrap().client_id, a);
        assert_eq!(queue.pop_oldest().unwrap().client_id, b);
        assert_eq!(queue.pop_oldest().unwrap().client_id, c);
        assert!(queue.pop_oldest().is_none());
    }

    #[test]
    fn test_remove_preserves_order() {
        let mut queue = WaitingQueue::new();
        let a = ClientId::new();
        let b = ClientId::new();
        let c = ClientId::new();

        queue.push(a, "A".to_string());
        queue.push(b, "B".to_string());
        queue.push(c, "C".to_string());

        assert!(queue.remove(b));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop_oldest().unwrap().client_id, a);
        assert_eq!(queue.pop_oldest().unwrap().client_id, c);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut queue = WaitingQueue::new();
        queue.push(ClientId::new(), "A".to_string());

        assert!(!queue.remove(ClientId::new()));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_contains() {
        let mut queue = WaitingQueue::new();
        let a = ClientId::new();

        assert!(!queue.contains(a));
        queue.push(a, "A".to_string());
        assert!(queue.contains(a));

        queue.remove(a);
        assert!(!queue.contains(a));
    }
}
