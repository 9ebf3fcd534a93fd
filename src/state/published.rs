use crate::error::Result;
use std::sync::mpsc::{RecvError, RecvTimeoutError, TryRecvError};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::time::{Duration, Instant};

/// A value published as whole immutable snapshots.
///
/// Readers clone the current `Arc<T>` and never see a half-applied update.
/// Writers are serialized; each successful write replaces the snapshot and
/// hands it to every live subscriber.
pub struct Published<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    current: RwLock<Arc<T>>,
    // Held across swap + notify so a subscriber never ends up holding an
    // older snapshot than the current one.
    subscribers: Mutex<Vec<Weak<Slot<T>>>>,
    writer: Mutex<()>,
}

impl<T> Drop for Inner<T> {
    fn drop(&mut self) {
        let subscribers = self
            .subscribers
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner);
        for slot in subscribers.iter().filter_map(Weak::upgrade) {
            slot.close();
        }
    }
}

impl<T> Clone for Published<T> {
    fn clone(&self) -> Self {
        Published {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Published<T> {
    pub fn new(initial: T) -> Published<T> {
        Published {
            inner: Arc::new(Inner {
                current: RwLock::new(Arc::new(initial)),
                subscribers: Mutex::new(Vec::new()),
                writer: Mutex::new(()),
            }),
        }
    }

    /// The current snapshot
    pub fn get(&self) -> Arc<T> {
        let current = self
            .inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    /// Derive the next snapshot from the current one and publish it.
    ///
    /// `f` runs while holding the writer lock, so read-then-write is atomic
    /// with respect to other writers. If `f` fails nothing is published.
    pub fn update<F>(&self, f: F) -> Result<Arc<T>>
    where
        F: FnOnce(&T) -> Result<T>,
    {
        let _writer = self
            .inner
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let current = self.get();
        let next = Arc::new(f(current.as_ref())?);
        self.publish(Arc::clone(&next));
        Ok(next)
    }

    /// Replace the snapshot unconditionally
    pub fn set(&self, value: T) {
        let _writer = self
            .inner
            .writer
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.publish(Arc::new(value));
    }

    /// Receive the current snapshot now and the latest one after each publish.
    ///
    /// A subscriber that falls behind only ever holds the newest snapshot;
    /// the ones published in between are skipped.
    pub fn subscribe(&self) -> Subscription<T> {
        let slot = Arc::new(Slot::new());
        let mut subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        slot.offer(self.get());
        subscribers.push(Arc::downgrade(&slot));
        Subscription { slot }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|slot| slot.strong_count() > 0)
            .count()
    }

    fn publish(&self, snapshot: Arc<T>) {
        let mut subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        {
            let mut current = self
                .inner
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            *current = Arc::clone(&snapshot);
        }
        subscribers.retain(|slot| match slot.upgrade() {
            Some(slot) => {
                slot.offer(Arc::clone(&snapshot));
                true
            }
            None => false,
        });
    }
}

struct Slot<T> {
    state: Mutex<SlotState<T>>,
    ready: Condvar,
}

struct SlotState<T> {
    latest: Option<Arc<T>>,
    closed: bool,
}

impl<T> Slot<T> {
    fn new() -> Slot<T> {
        Slot {
            state: Mutex::new(SlotState {
                latest: None,
                closed: false,
            }),
            ready: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SlotState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Overwrites an unread snapshot
    fn offer(&self, snapshot: Arc<T>) {
        self.lock().latest = Some(snapshot);
        self.ready.notify_all();
    }

    fn close(&self) {
        self.lock().closed = true;
        self.ready.notify_all();
    }
}

/// Receiving end of [`Published::subscribe`].
///
/// Holds at most one unread snapshot. Receiving fails with a disconnected
/// error once every `Published` handle is gone and the last snapshot was read.
pub struct Subscription<T> {
    slot: Arc<Slot<T>>,
}

impl<T> Subscription<T> {
    /// Block until a snapshot newer than the last one received is available
    pub fn recv(&self) -> std::result::Result<Arc<T>, RecvError> {
        let mut state = self.slot.lock();
        loop {
            if let Some(snapshot) = state.latest.take() {
                return Ok(snapshot);
            }
            if state.closed {
                return Err(RecvError);
            }
            state = self
                .slot
                .ready
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    pub fn recv_timeout(
        &self,
        timeout: Duration,
    ) -> std::result::Result<Arc<T>, RecvTimeoutError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.slot.lock();
        loop {
            if let Some(snapshot) = state.latest.take() {
                return Ok(snapshot);
            }
            if state.closed {
                return Err(RecvTimeoutError::Disconnected);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(RecvTimeoutError::Timeout);
            }
            state = self
                .slot
                .ready
                .wait_timeout(state, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    pub fn try_recv(&self) -> std::result::Result<Arc<T>, TryRecvError> {
        let mut state = self.slot.lock();
        match state.latest.take() {
            Some(snapshot) => Ok(snapshot),
            None if state.closed => Err(TryRecvError::Disconnected),
            None => Err(TryRecvError::Empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BlockchainError;
    use std::thread;

    #[test]
    fn test_get_returns_initial() {
        let cell = Published::new(vec![1, 2, 3]);
        assert_eq!(*cell.get(), vec![1, 2, 3]);
    }

    #[test]
    fn test_update_publishes_new_snapshot() {
        let cell = Published::new(vec![1]);
        let before = cell.get();

        cell.update(|v| {
            let mut next = v.clone();
            next.push(2);
            Ok(next)
        })
        .unwrap();

        // Old snapshots are untouched
        assert_eq!(*before, vec![1]);
        assert_eq!(*cell.get(), vec![1, 2]);
    }

    #[test]
    fn test_failed_update_publishes_nothing() {
        let cell = Published::new(0u32);
        let rx = cell.subscribe();
        assert_eq!(*rx.recv().unwrap(), 0);

        let result = cell.update(|_| Err(BlockchainError::ChainIntegrity("nope".to_string())));
        assert!(result.is_err());
        assert_eq!(*cell.get(), 0);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_subscriber_sees_each_snapshot_when_keeping_up() {
        let cell = Published::new(0u32);
        let rx = cell.subscribe();
        assert_eq!(*rx.recv().unwrap(), 0);

        for i in 1..=3 {
            cell.set(i);
            assert_eq!(*rx.recv().unwrap(), i);
        }
    }

    #[test]
    fn test_slow_subscriber_holds_only_latest() {
        let cell = Published::new(vec![0u32]);
        let rx = cell.subscribe();

        for i in 1..=2_000 {
            cell.update(|v| {
                let mut next = v.clone();
                next.push(i);
                Ok(next)
            })
            .unwrap();
        }

        // Every intermediate snapshot was released, only the newest is held
        let latest = rx.recv().unwrap();
        assert_eq!(latest.len(), 2_001);
        assert!(Arc::ptr_eq(&latest, &cell.get()));
        assert_eq!(Arc::strong_count(&latest), 2);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_recv_wakes_on_publish() {
        let cell = Published::new(0u32);
        let rx = cell.subscribe();
        assert_eq!(*rx.recv().unwrap(), 0);

        let writer = cell.clone();
        let handle = thread::spawn(move || writer.set(7));
        assert_eq!(*rx.recv_timeout(Duration::from_secs(5)).unwrap(), 7);
        handle.join().unwrap();
    }

    #[test]
    fn test_recv_timeout_when_idle() {
        let cell = Published::new(0u32);
        let rx = cell.subscribe();
        rx.recv().unwrap();
        assert_eq!(
            rx.recv_timeout(Duration::from_millis(10)),
            Err(RecvTimeoutError::Timeout)
        );
    }

    #[test]
    fn test_disconnected_after_publisher_dropped() {
        let cell = Published::new(0u32);
        let rx = cell.subscribe();
        cell.set(1);
        drop(cell);

        // The unread snapshot is still delivered first
        assert_eq!(*rx.recv().unwrap(), 1);
        assert_eq!(rx.recv(), Err(RecvError));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Disconnected));
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let cell = Published::new(0u32);
        let rx = cell.subscribe();
        let _keep = cell.subscribe();
        assert_eq!(cell.subscriber_count(), 2);

        drop(rx);
        assert_eq!(cell.subscriber_count(), 1);
        cell.set(1);
        assert_eq!(cell.inner.subscribers.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let cell = Published::new(String::from("a"));
        let other = cell.clone();
        other.set(String::from("b"));
        assert_eq!(cell.get().as_str(), "b");
    }
}
