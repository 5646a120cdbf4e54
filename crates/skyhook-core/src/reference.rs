//! A reference pairs one facet receiver with one callback. A forwarding task
//! waits for changes and posts each delivery to the owning screen's queue;
//! the callback itself only ever runs as a queue job, or synchronously inside
//! `create` for the initial value.

use std::any::type_name;
use std::fmt;
use std::sync::{Arc, Condvar, Mutex, PoisonError, Weak};
use std::thread::{self, ThreadId};

use skyhook_sdk::Facet;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::queue::DeliveryQueue;
use crate::sync::lock;

type Callback<T> = Box<dyn FnMut(Option<&T>) + Send + 'static>;

struct Slot<T> {
    value: Option<T>,
    /// Taken out while a delivery runs so the callback is invoked unlocked.
    callback: Option<Callback<T>>,
    released: bool,
    delivering: Option<ThreadId>,
}

struct Shared<T> {
    slot: Mutex<Slot<T>>,
    idle: Condvar,
}

trait ReleaseState: Send + Sync {
    fn is_released(&self) -> bool;
}

impl<T: Send> ReleaseState for Shared<T> {
    fn is_released(&self) -> bool {
        lock(&self.slot).released
    }
}

/// Anything a [`ReferenceSet`](crate::session::ReferenceSet) can own.
pub trait Releasable: Send {
    fn release(&self);
    fn is_released(&self) -> bool;
}

/// Observer handle that outlives its reference and reports whether it was
/// released. Used to check teardown from outside a session.
#[derive(Clone)]
pub struct ReleaseProbe {
    state: Arc<dyn ReleaseState>,
}

impl ReleaseProbe {
    pub fn is_released(&self) -> bool {
        self.state.is_released()
    }
}

impl fmt::Debug for ReleaseProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseProbe")
            .field("released", &self.is_released())
            .finish()
    }
}

/// Live subscription to one facet of an entity.
///
/// Holds the last delivered value. Once released it holds nothing, never
/// calls its callback again and cannot be reactivated. Dropping releases.
pub struct Reference<T: Clone + Send + Sync + 'static> {
    shared: Arc<Shared<T>>,
    cancel: CancellationToken,
}

impl<T: Clone + Send + Sync + 'static> Reference<T> {
    /// Subscribe `on_change` to `facet`.
    ///
    /// The callback runs once before this returns with the current value
    /// (possibly absent), then once per change as a job on `queue`. Call this
    /// from a job on the same queue.
    pub fn create<F>(queue: &DeliveryQueue, facet: Facet<T>, on_change: F) -> Self
    where
        F: FnMut(Option<&T>) + Send + 'static,
    {
        let mut receiver = facet.into_receiver();
        let initial = receiver.borrow_and_update().clone();

        let shared = Arc::new(Shared {
            slot: Mutex::new(Slot {
                value: None,
                callback: Some(Box::new(on_change)),
                released: false,
                delivering: None,
            }),
            idle: Condvar::new(),
        });
        let cancel = CancellationToken::new();

        deliver(&shared, initial);
        tokio::spawn(forward(
            receiver,
            Arc::downgrade(&shared),
            queue.clone(),
            cancel.clone(),
        ));
        debug!(kind = type_name::<T>(), "reference created");

        Self { shared, cancel }
    }

    /// Last delivered value; `None` when absent or released.
    pub fn value(&self) -> Option<T> {
        lock(&self.shared.slot).value.clone()
    }

    pub fn is_released(&self) -> bool {
        lock(&self.shared.slot).released
    }

    pub fn probe(&self) -> ReleaseProbe {
        ReleaseProbe {
            state: Arc::clone(&self.shared) as Arc<dyn ReleaseState>,
        }
    }

    /// Stop deliveries. Idempotent.
    ///
    /// When a delivery is running on another thread this waits for it to
    /// finish, so no callback runs after `release` returns. Calling it from
    /// inside the reference's own callback does not wait.
    pub fn release(&self) {
        self.cancel.cancel();
        let callback = {
            let mut slot = lock(&self.shared.slot);
            let first = !slot.released;
            slot.released = true;
            slot.value = None;
            let me = thread::current().id();
            while slot.delivering.is_some_and(|id| id != me) {
                slot = self
                    .shared
                    .idle
                    .wait(slot)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            if first {
                debug!(kind = type_name::<T>(), "reference released");
            }
            slot.callback.take()
        };
        drop(callback);
    }
}

impl<T: Clone + Send + Sync + 'static> Releasable for Reference<T> {
    fn release(&self) {
        Reference::release(self);
    }

    fn is_released(&self) -> bool {
        Reference::is_released(self)
    }
}

impl<T: Clone + Send + Sync + 'static> Drop for Reference<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: Clone + Send + Sync + fmt::Debug + 'static> fmt::Debug for Reference<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = lock(&self.shared.slot);
        f.debug_struct("Reference")
            .field("kind", &type_name::<T>())
            .field("value", &slot.value)
            .field("released", &slot.released)
            .finish()
    }
}

fn deliver<T: Clone>(shared: &Shared<T>, value: Option<T>) {
    let mut callback = {
        let mut slot = lock(&shared.slot);
        if slot.released {
            return;
        }
        slot.value.clone_from(&value);
        let Some(callback) = slot.callback.take() else {
            return;
        };
        slot.delivering = Some(thread::current().id());
        callback
    };

    callback(value.as_ref());

    let mut slot = lock(&shared.slot);
    slot.delivering = None;
    if !slot.released {
        slot.callback = Some(callback);
    }
    drop(slot);
    shared.idle.notify_all();
}

async fn forward<T: Clone + Send + Sync + 'static>(
    mut receiver: watch::Receiver<Option<T>>,
    shared: Weak<Shared<T>>,
    queue: DeliveryQueue,
    cancel: CancellationToken,
) {
    loop {
        let closed = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            changed = receiver.changed() => changed.is_err(),
        };
        let value = if closed {
            None
        } else {
            receiver.borrow_and_update().clone()
        };

        let Some(target) = shared.upgrade() else { break };
        let posted = queue.run(move || deliver(&target, value));
        if posted.is_err() || closed {
            break;
        }
    }
    trace!(kind = type_name::<T>(), "reference forwarder stopped");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use skyhook_sdk::ComponentStore;
    use skyhook_sdk::model::BatteryInfo;

    use super::*;

    type Seen = Arc<Mutex<Vec<Option<u8>>>>;

    async fn settle(queue: &DeliveryQueue) {
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        queue.flush().await.unwrap();
    }

    fn recorder() -> (Seen, impl FnMut(Option<&BatteryInfo>) + Send + 'static) {
        let seen: Seen = Arc::default();
        let sink = Arc::clone(&seen);
        (seen, move |battery: Option<&BatteryInfo>| {
            sink.lock().unwrap().push(battery.map(|b| b.level));
        })
    }

    #[tokio::test]
    async fn initial_value_is_delivered_before_create_returns() {
        let queue = DeliveryQueue::spawn();
        let store = ComponentStore::new();
        store.publish(BatteryInfo::new(80));
        let (seen, callback) = recorder();

        let reference = Reference::create(&queue, store.facet::<BatteryInfo>(), callback);

        assert_eq!(*seen.lock().unwrap(), vec![Some(80)]);
        assert_eq!(reference.value().map(|b| b.level), Some(80));
    }

    #[tokio::test]
    async fn absent_facet_delivers_absent_and_is_not_an_error() {
        let queue = DeliveryQueue::spawn();
        let store = ComponentStore::new();
        let (seen, callback) = recorder();

        let reference = Reference::create(&queue, store.facet::<BatteryInfo>(), callback);
        queue.flush().await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![None]);
        assert!(reference.value().is_none());
    }

    #[tokio::test]
    async fn changes_are_delivered_in_order() {
        let queue = DeliveryQueue::spawn();
        let store = ComponentStore::new();
        let (seen, callback) = recorder();
        let _reference = Reference::create(&queue, store.facet::<BatteryInfo>(), callback);

        store.publish(BatteryInfo::new(50));
        settle(&queue).await;
        store.remove::<BatteryInfo>();
        settle(&queue).await;

        assert_eq!(*seen.lock().unwrap(), vec![None, Some(50), None]);
    }

    #[tokio::test]
    async fn no_callback_after_release() {
        let queue = DeliveryQueue::spawn();
        let store = ComponentStore::new();
        store.publish(BatteryInfo::new(10));
        let (seen, callback) = recorder();
        let reference = Reference::create(&queue, store.facet::<BatteryInfo>(), callback);

        reference.release();
        store.publish(BatteryInfo::new(20));
        store.publish(BatteryInfo::new(30));
        settle(&queue).await;

        assert_eq!(*seen.lock().unwrap(), vec![Some(10)]);
        assert!(reference.is_released());
        assert!(reference.value().is_none());
    }

    #[tokio::test]
    async fn release_is_idempotent_and_visible_through_probe() {
        let queue = DeliveryQueue::spawn();
        let store = ComponentStore::new();
        let reference = Reference::create(&queue, store.facet::<BatteryInfo>(), |_| {});
        let probe = reference.probe();

        assert!(!probe.is_released());
        reference.release();
        reference.release();
        assert!(probe.is_released());

        drop(reference);
        assert!(probe.is_released());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn delivery_queued_before_release_is_discarded() {
        let queue = DeliveryQueue::spawn();
        let store = ComponentStore::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let reference = Reference::create(&queue, store.facet::<BatteryInfo>(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // Block the queue so the forwarded delivery sits behind this job.
        let (unblock, blocked) = std::sync::mpsc::channel::<()>();
        queue
            .run(move || {
                let _ = blocked.recv();
            })
            .unwrap();
        store.publish(BatteryInfo::new(5));
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        reference.release();
        unblock.send(()).unwrap();
        queue.flush().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn callback_may_release_a_sibling() {
        let queue = DeliveryQueue::spawn();
        let store = ComponentStore::new();
        let sibling = Arc::new(Reference::create(&queue, store.facet::<BatteryInfo>(), |_| {}));
        let target = Arc::clone(&sibling);
        let _trigger = Reference::create(&queue, store.facet::<BatteryInfo>(), move |battery| {
            if battery.is_some_and(|b| b.level == 0) {
                target.release();
            }
        });

        store.publish(BatteryInfo::new(0));
        settle(&queue).await;

        assert!(sibling.is_released());
    }
}
