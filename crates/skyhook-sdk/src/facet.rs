//! Each entity keeps one `watch` slot per component kind. A slot starts out
//! absent and is only ever written by the backend; consumers hold receivers.

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::component::Component;

/// Read side of one component slot.
///
/// `None` means the component is currently unavailable on the entity. The
/// slot closing (entity dropped by the SDK) is observed by consumers as a
/// final absent value.
pub struct Facet<T> {
    receiver: watch::Receiver<Option<T>>,
}

impl<T: Clone> Facet<T> {
    pub fn from_receiver(receiver: watch::Receiver<Option<T>>) -> Self {
        Self { receiver }
    }

    /// Snapshot of the latest published value.
    pub fn current(&self) -> Option<T> {
        self.receiver.borrow().clone()
    }

    pub fn into_receiver(self) -> watch::Receiver<Option<T>> {
        self.receiver
    }
}

impl<T> Clone for Facet<T> {
    fn clone(&self) -> Self {
        Self {
            receiver: self.receiver.clone(),
        }
    }
}

impl<T> fmt::Debug for Facet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facet")
            .field("kind", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

// ── Slot storage ────────────────────────────────────────────────────

trait Slot: Send + Sync {
    fn clear(&self);
    fn as_any(&self) -> &dyn Any;
}

impl<K: Component> Slot for watch::Sender<Option<K>> {
    fn clear(&self) {
        self.send_if_modified(|value| value.take().is_some());
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Per-entity component slots keyed by component type.
///
/// Slots are created lazily, so subscribing to a component the entity never
/// publishes yields a permanently absent facet rather than an error.
#[derive(Default)]
pub struct ComponentStore {
    slots: DashMap<TypeId, Arc<dyn Slot>>,
}

impl ComponentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_sender<K: Component, R>(&self, f: impl FnOnce(&watch::Sender<Option<K>>) -> R) -> R {
        let slot = Arc::clone(
            self.slots
                .entry(TypeId::of::<K>())
                .or_insert_with(|| {
                    let fresh: Arc<dyn Slot> = Arc::new(watch::channel::<Option<K>>(None).0);
                    fresh
                })
                .value(),
        );
        let sender = slot
            .as_any()
            .downcast_ref::<watch::Sender<Option<K>>>()
            .expect("component slots are keyed by their TypeId");
        f(sender)
    }

    /// Subscribe to a component.
    pub fn facet<K: Component>(&self) -> Facet<K> {
        self.with_sender::<K, _>(|sender| Facet::from_receiver(sender.subscribe()))
    }

    pub fn get<K: Component>(&self) -> Option<K> {
        self.with_sender::<K, _>(|sender| sender.borrow().clone())
    }

    /// Make the component available with `value`, replacing any previous one.
    pub fn publish<K: Component>(&self, value: K) {
        self.with_sender::<K, _>(|sender| {
            sender.send_replace(Some(value));
        });
    }

    /// Make the component unavailable.
    pub fn remove<K: Component>(&self) {
        self.with_sender::<K, _>(Slot::clear);
    }

    /// Mutate an available component in place. Returns `false` (and notifies
    /// nobody) when the component is absent.
    pub fn update<K: Component>(&self, f: impl FnOnce(&mut K)) -> bool {
        self.with_sender::<K, _>(|sender| {
            sender.send_if_modified(|slot| match slot.as_mut() {
                Some(value) => {
                    f(value);
                    true
                }
                None => false,
            })
        })
    }

    /// Make every component unavailable.
    pub fn clear_all(&self) {
        for slot in self.slots.iter() {
            slot.value().clear();
        }
    }
}

impl fmt::Debug for ComponentStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentStore")
            .field("slots", &self.slots.len())
            .finish()
    }
}
