//! Key event queue
//!
//! Bounded channel of 32 events written by the quadrature decoder and the switch
//! debouncer, read by the menu loop. Both sides use the non-blocking `try_`
//! operations, so neither ever waits on the other.
//!
//! When every slot holds an unread event the newest event is dropped: a lost key
//! press is harmless, a stalled sampler is not.

use super::KeyEvent;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

/// Number of events the queue holds
pub const QUEUE_CAPACITY: usize = 32;

/// Multi-producer, single-consumer queue of [`KeyEvent`]s
#[derive(Debug)]
pub struct EventQueue {
    tx: Sender<KeyEvent>,
    rx: Receiver<KeyEvent>,
    /// Events dropped because the queue was full
    dropped: AtomicUsize,
}

impl EventQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        let (tx, rx) = bounded(QUEUE_CAPACITY);
        EventQueue {
            tx,
            rx,
            dropped: AtomicUsize::new(0),
        }
    }

    /// Append an event; returns `false` (and drops it) if the queue is full
    pub fn publish(&self, event: KeyEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                trace!(?event, "event queue full, dropping");
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
            // both ends live in `self`
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Take the oldest unread event, if any
    pub fn poll(&self) -> Option<KeyEvent> {
        match self.rx.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Number of unread events (a snapshot; producers may be adding more)
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// True when no events are waiting
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Events dropped since creation because the queue was full
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_empty_poll() {
        let queue = EventQueue::new();
        assert_eq!(queue.poll(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_fifo_order() {
        let queue = EventQueue::new();
        assert!(queue.publish(KeyEvent::Up));
        assert!(queue.publish(KeyEvent::Enter));
        assert!(queue.publish(KeyEvent::Down));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.poll(), Some(KeyEvent::Up));
        assert_eq!(queue.poll(), Some(KeyEvent::Enter));
        assert_eq!(queue.poll(), Some(KeyEvent::Down));
        assert_eq!(queue.poll(), None);
    }

    #[test]
    fn test_33rd_event_dropped() {
        let queue = EventQueue::new();
        let events: Vec<KeyEvent> = (0..33)
            .map(|i| match i % 3 {
                0 => KeyEvent::Up,
                1 => KeyEvent::Down,
                _ => KeyEvent::Enter,
            })
            .collect();
        for (i, &event) in events.iter().enumerate() {
            assert_eq!(queue.publish(event), i < QUEUE_CAPACITY);
        }
        assert_eq!(queue.dropped(), 1);
        for &expected in &events[..QUEUE_CAPACITY] {
            assert_eq!(queue.poll(), Some(expected));
        }
        assert_eq!(queue.poll(), None);
    }

    #[test]
    fn test_wraps_around() {
        let queue = EventQueue::new();
        for _ in 0..5 {
            for _ in 0..20 {
                assert!(queue.publish(KeyEvent::Down));
            }
            for _ in 0..20 {
                assert_eq!(queue.poll(), Some(KeyEvent::Down));
            }
        }
        assert!(queue.is_empty());
    }

    #[test]
    fn test_room_after_poll() {
        let queue = EventQueue::new();
        for _ in 0..QUEUE_CAPACITY {
            queue.publish(KeyEvent::Up);
        }
        assert!(!queue.publish(KeyEvent::Enter));
        assert_eq!(queue.poll(), Some(KeyEvent::Up));
        assert!(queue.publish(KeyEvent::Enter));
    }

    #[test]
    fn test_two_producers() {
        let queue = Arc::new(EventQueue::new());
        let producers: Vec<_> = [KeyEvent::Up, KeyEvent::Enter]
            .into_iter()
            .map(|event| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    let mut sent = 0;
                    while sent < 1000 {
                        if queue.publish(event) {
                            sent += 1;
                        } else {
                            std::thread::yield_now();
                        }
                    }
                })
            })
            .collect();

        let mut counts = [0usize; 2];
        while counts.iter().sum::<usize>() < 2000 {
            match queue.poll() {
                Some(KeyEvent::Up) => counts[0] += 1,
                Some(KeyEvent::Enter) => counts[1] += 1,
                Some(other) => panic!("unexpected {other:?}"),
                None => std::thread::yield_now(),
            }
        }
        for producer in producers {
            producer.join().unwrap();
        }
        assert_eq!(counts, [1000, 1000]);
    }
}
