use crate::traits::{Scheduler, TickId};
use serde::Serialize;
use std::time::Duration;

/// A tick waiting to be delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickRequest {
    pub id: u64,
    pub delay_ms: u64,
}

impl TickRequest {
    pub fn tick_id(&self) -> TickId {
        TickId(self.id)
    }
}

/// Scheduler that only records requests; the host decides when they fire.
///
/// A browser host forwards each request to a timer, a headless host or a
/// test pops them in order and delivers them immediately.
#[derive(Debug, Default)]
pub struct TickQueue {
    next_id: u64,
    pending: Vec<TickRequest>,
}

impl TickQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Removes and returns the oldest pending request.
    pub fn next_due(&mut self) -> Option<TickRequest> {
        if self.pending.is_empty() {
            None
        } else {
            Some(self.pending.remove(0))
        }
    }

    pub fn pending(&self) -> &[TickRequest] {
        &self.pending
    }
}

impl Scheduler for TickQueue {
    fn schedule(&mut self, delay: Duration) -> TickId {
        self.next_id += 1;
        let request = TickRequest {
            id: self.next_id,
            delay_ms: delay.as_millis() as u64,
        };
        self.pending.push(request);
        request.tick_id()
    }

    fn cancel(&mut self, tick: TickId) {
        self.pending.retain(|request| request.tick_id() != tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_are_delivered_in_order() {
        let mut queue = TickQueue::new();
        let first = queue.schedule(Duration::ZERO);
        let second = queue.schedule(Duration::from_millis(250));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.next_due().map(|r| r.tick_id()), Some(first));
        let next = queue.next_due().expect("second request");
        assert_eq!(next.tick_id(), second);
        assert_eq!(next.delay_ms, 250);
        assert!(queue.next_due().is_none());
    }

    #[test]
    fn cancelled_requests_are_dropped() {
        let mut queue = TickQueue::new();
        let first = queue.schedule(Duration::ZERO);
        let second = queue.schedule(Duration::ZERO);
        queue.cancel(first);
        queue.cancel(TickId(99));

        assert_eq!(queue.pending().len(), 1);
        assert_eq!(queue.pending()[0].tick_id(), second);
    }
}
