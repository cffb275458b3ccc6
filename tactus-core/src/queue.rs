//! Bounded event queues
//!
//! Fixed-capacity circular buffers of [`Event`]s, one per input domain
//! (digital, touch, analog aggregation). A producer running in the
//! scheduler task pushes scan results; the dispatch loop drains them once
//! per frame. Queues never block and never grow: pushing onto a full queue
//! drops the event and reports it with a `bool`, which bounds both latency
//! and memory in the time-critical producer contexts.
//!
//! [`SharedEventQueue`] is the cross-context form: every push and pop runs
//! inside a scoped blocking-mutex critical section that covers exactly the
//! read/compute/commit sequence on the head or tail index.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::event::Event;

/// Capacity of the digital scan queue
pub const DIGITAL_QUEUE_LEN: usize = 16;

/// Capacity of the touch scan queue
pub const TOUCH_QUEUE_LEN: usize = 16;

/// Capacity of the analog aggregation queue
pub const ANALOG_QUEUE_LEN: usize = 8;

/// A fixed-capacity circular buffer of events.
///
/// One slot is always kept free to distinguish full from empty, so a queue
/// of size `N` holds at most `N - 1` live events. Invariants:
/// `head == tail` means empty, `(tail + 1) % N == head` means full.
#[derive(Debug)]
pub struct EventQueue<const N: usize> {
    buf: [Event; N],
    /// Index of the next slot to read from
    head: usize,
    /// Index of the next slot to write to
    tail: usize,
}

impl<const N: usize> EventQueue<N> {
    /// Create a new, empty queue.
    ///
    /// `const` so queues can live in `static` wiring without a runtime
    /// initialiser.
    pub const fn new() -> Self {
        Self {
            buf: [Event::new(0, 0); N],
            head: 0,
            tail: 0,
        }
    }

    /// `true` when no events are pending.
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Number of live events.
    pub fn len(&self) -> usize {
        (self.tail + N - self.head) % N
    }

    /// Maximum number of live events the queue can hold.
    pub const fn capacity(&self) -> usize {
        N - 1
    }

    /// Append an event at the tail.
    ///
    /// Returns `false` and leaves the queue untouched when full. The
    /// producer is never blocked and the event is not retried later.
    pub fn try_push(&mut self, event: Event) -> bool {
        let next = (self.tail + 1) % N;
        if next == self.head {
            return false;
        }
        self.buf[self.tail] = event;
        self.tail = next;
        true
    }

    /// Remove and return the oldest event, if any.
    pub fn try_pop(&mut self) -> Option<Event> {
        if self.head == self.tail {
            return None;
        }
        let event = self.buf[self.head];
        self.head = (self.head + 1) % N;
        Some(event)
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// An [`EventQueue`] shared between the scheduler task and the dispatch
/// loop.
///
/// Generic over the raw mutex so firmware can use
/// `CriticalSectionRawMutex` while host tests use `NoopRawMutex`. The lock
/// is taken unconditionally for both directions; each critical section
/// spans exactly one queue operation and nothing else, so its duration is
/// bounded and constant.
pub struct SharedEventQueue<M: RawMutex, const N: usize> {
    inner: Mutex<M, RefCell<EventQueue<N>>>,
}

impl<M: RawMutex, const N: usize> SharedEventQueue<M, N> {
    /// Create a new, empty shared queue.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(EventQueue::new())),
        }
    }

    /// Push from the producing context. Returns `false` (event dropped)
    /// when the queue is full.
    pub fn push(&self, event: Event) -> bool {
        self.inner.lock(|q| q.borrow_mut().try_push(event))
    }

    /// Pop from the consuming context.
    pub fn pop(&self) -> Option<Event> {
        self.inner.lock(|q| q.borrow_mut().try_pop())
    }

    /// `true` when no events are pending.
    pub fn is_empty(&self) -> bool {
        self.inner.lock(|q| q.borrow().is_empty())
    }

    /// Number of live events.
    pub fn len(&self) -> usize {
        self.inner.lock(|q| q.borrow().len())
    }
}

impl<M: RawMutex, const N: usize> Default for SharedEventQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_new_queue_is_empty() {
        let q: EventQueue<8> = EventQueue::new();
        assert!(q.is_empty());
        assert_eq!(q.len(), 0);
        assert_eq!(q.capacity(), 7);
    }

    #[test]
    fn test_fifo_order() {
        let mut q: EventQueue<8> = EventQueue::new();
        for port in 0..5 {
            assert!(q.try_push(Event::new(port, port as i16 * 10)));
        }
        assert_eq!(q.len(), 5);
        for port in 0..5 {
            assert_eq!(q.try_pop(), Some(Event::new(port, port as i16 * 10)));
        }
        assert_eq!(q.try_pop(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn test_full_push_drops_and_preserves_contents() {
        let mut q: EventQueue<4> = EventQueue::new();
        assert!(q.try_push(Event::new(0, 0)));
        assert!(q.try_push(Event::new(1, 1)));
        assert!(q.try_push(Event::new(2, 2)));
        // Capacity is 3; the fourth push must fail without side effects.
        assert!(!q.try_push(Event::new(3, 3)));
        assert_eq!(q.len(), 3);
        assert_eq!(q.try_pop(), Some(Event::new(0, 0)));
        assert_eq!(q.try_pop(), Some(Event::new(1, 1)));
        assert_eq!(q.try_pop(), Some(Event::new(2, 2)));
        assert_eq!(q.try_pop(), None);
    }

    #[test]
    fn test_wraparound() {
        let mut q: EventQueue<4> = EventQueue::new();
        // Push/pop more events than the backing array holds so the
        // indices wrap several times.
        for i in 0..20i16 {
            assert!(q.try_push(Event::new((i % 8) as u8, i)));
            assert_eq!(q.try_pop(), Some(Event::new((i % 8) as u8, i)));
        }
        assert!(q.is_empty());
    }

    #[test]
    fn test_interleaved_push_pop_keeps_order() {
        let mut q: EventQueue<8> = EventQueue::new();
        assert!(q.try_push(Event::new(1, 100)));
        assert!(q.try_push(Event::new(2, 200)));
        assert_eq!(q.try_pop(), Some(Event::new(1, 100)));
        assert!(q.try_push(Event::new(3, 300)));
        assert_eq!(q.try_pop(), Some(Event::new(2, 200)));
        assert_eq!(q.try_pop(), Some(Event::new(3, 300)));
        assert_eq!(q.try_pop(), None);
    }

    #[test]
    fn test_shared_queue_push_pop() {
        let q: SharedEventQueue<NoopRawMutex, 8> = SharedEventQueue::new();
        assert!(q.push(Event::new(2, 1)));
        assert!(q.push(Event::new(5, 0)));
        assert_eq!(q.len(), 2);
        assert_eq!(q.pop(), Some(Event::new(2, 1)));
        assert_eq!(q.pop(), Some(Event::new(5, 0)));
        assert_eq!(q.pop(), None);
        assert!(q.is_empty());
    }

    #[test]
    fn test_shared_queue_drops_when_full() {
        let q: SharedEventQueue<NoopRawMutex, 4> = SharedEventQueue::new();
        assert!(q.push(Event::new(0, 0)));
        assert!(q.push(Event::new(1, 1)));
        assert!(q.push(Event::new(2, 2)));
        assert!(!q.push(Event::new(3, 3)));
        assert_eq!(q.len(), 3);
    }
}
