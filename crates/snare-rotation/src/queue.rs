//! Per-key dedup work queue.
//!
//! The queue is the engine's serialization mechanism: at most one
//! reconciliation is ever in flight per key, without any per-object lock.
//! A key is in one of three states while tracked:
//!
//! - *queued* — sitting in the channel, waiting for a worker
//! - *active* — a worker is reconciling it
//! - *active-dirty* — a change notification arrived mid-reconciliation;
//!   the key re-enqueues immediately when the worker finishes
//!
//! Enqueueing a key that is already queued is a no-op, so the channel
//! holds at most one entry per key and its length is bounded by the
//! tracked population.

use std::collections::HashMap;

use parking_lot::Mutex;
use snare_secrets::SecretName;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyState {
    Queued,
    Active,
    ActiveDirty,
}

/// Dedup work queue over secret names.
#[derive(Debug)]
pub struct WorkQueue {
    tx: mpsc::UnboundedSender<SecretName>,
    keys: Mutex<HashMap<SecretName, KeyState>>,
}

impl WorkQueue {
    /// Creates a queue and the receiver its workers drain.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SecretName>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                keys: Mutex::new(HashMap::new()),
            },
            rx,
        )
    }

    /// Adds a key to the queue.
    ///
    /// Returns false when the key was already pending (the enqueue was
    /// deduplicated) or the queue has shut down. A key that is currently
    /// active is marked dirty and reprocessed as soon as its worker
    /// finishes.
    pub fn enqueue(&self, name: &SecretName) -> bool {
        let mut keys = self.keys.lock();
        match keys.get(name) {
            Some(KeyState::Queued | KeyState::ActiveDirty) => false,
            Some(KeyState::Active) => {
                keys.insert(name.clone(), KeyState::ActiveDirty);
                false
            }
            None => {
                if self.tx.send(name.clone()).is_err() {
                    return false;
                }
                keys.insert(name.clone(), KeyState::Queued);
                true
            }
        }
    }

    /// Marks a key as actively being reconciled.
    ///
    /// Workers call this immediately after receiving the key.
    pub fn begin(&self, name: &SecretName) {
        self.keys.lock().insert(name.clone(), KeyState::Active);
    }

    /// Marks a key's reconciliation as finished.
    ///
    /// Returns true when the key was dirty and has been re-enqueued
    /// immediately; the caller must then skip its own delayed requeue.
    pub fn finish(&self, name: &SecretName) -> bool {
        let mut keys = self.keys.lock();
        match keys.get(name) {
            Some(KeyState::ActiveDirty) => {
                if self.tx.send(name.clone()).is_ok() {
                    keys.insert(name.clone(), KeyState::Queued);
                    true
                } else {
                    keys.remove(name);
                    false
                }
            }
            _ => {
                keys.remove(name);
                false
            }
        }
    }

    /// Number of keys currently tracked (queued or active).
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.lock().len()
    }

    /// True when no keys are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(n: &str) -> SecretName {
        SecretName::new("trap-web", n).expect("valid name")
    }

    #[test]
    fn enqueue_delivers_to_receiver() {
        let (queue, mut rx) = WorkQueue::new();
        assert!(queue.enqueue(&name("a")));
        assert_eq!(rx.try_recv().expect("delivered"), name("a"));
    }

    #[test]
    fn enqueue_dedups_queued_key() {
        let (queue, mut rx) = WorkQueue::new();
        assert!(queue.enqueue(&name("a")));
        assert!(!queue.enqueue(&name("a")));
        assert!(!queue.enqueue(&name("a")));

        assert_eq!(rx.try_recv().expect("one entry"), name("a"));
        assert!(rx.try_recv().is_err(), "channel must hold a single entry");
    }

    #[test]
    fn distinct_keys_are_independent() {
        let (queue, mut rx) = WorkQueue::new();
        assert!(queue.enqueue(&name("a")));
        assert!(queue.enqueue(&name("b")));
        assert_eq!(queue.len(), 2);

        assert_eq!(rx.try_recv().expect("a"), name("a"));
        assert_eq!(rx.try_recv().expect("b"), name("b"));
    }

    #[test]
    fn finish_clean_key_releases_it() {
        let (queue, mut rx) = WorkQueue::new();
        queue.enqueue(&name("a"));
        let received = rx.try_recv().expect("received");
        queue.begin(&received);

        assert!(!queue.finish(&received), "clean finish must not re-enqueue");
        assert!(queue.is_empty());

        // The key can be enqueued again afterwards
        assert!(queue.enqueue(&name("a")));
    }

    #[test]
    fn notify_during_reconcile_marks_dirty_and_requeues() {
        let (queue, mut rx) = WorkQueue::new();
        queue.enqueue(&name("a"));
        let received = rx.try_recv().expect("received");
        queue.begin(&received);

        // A change notification lands while the worker is busy
        assert!(!queue.enqueue(&name("a")));
        assert!(rx.try_recv().is_err(), "dirty key must not double-queue");

        assert!(queue.finish(&received), "dirty finish re-enqueues");
        assert_eq!(rx.try_recv().expect("requeued"), name("a"));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn repeated_notifies_collapse_to_one_requeue() {
        let (queue, mut rx) = WorkQueue::new();
        queue.enqueue(&name("a"));
        let received = rx.try_recv().expect("received");
        queue.begin(&received);

        assert!(!queue.enqueue(&name("a")));
        assert!(!queue.enqueue(&name("a")));
        assert!(!queue.enqueue(&name("a")));

        assert!(queue.finish(&received));
        assert_eq!(rx.try_recv().expect("requeued once"), name("a"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn enqueue_after_receiver_dropped_fails() {
        let (queue, rx) = WorkQueue::new();
        drop(rx);
        assert!(!queue.enqueue(&name("a")));
        assert!(queue.is_empty());
    }
}
