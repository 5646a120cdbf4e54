//! Inputs are the latest values delivered by a screen's references. The view
//! is recomputed from all inputs on every change and only published when it
//! differs from the previous one.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::sync::lock;

pub struct ViewModel<I, V> {
    inputs: Mutex<I>,
    view: watch::Sender<V>,
    project: fn(&I) -> V,
}

impl<I, V> ViewModel<I, V>
where
    I: Default + Send,
    V: Clone + PartialEq + Send + Sync,
{
    /// Start from default inputs and their projection.
    pub fn new(project: fn(&I) -> V) -> Arc<Self> {
        let inputs = I::default();
        let (view, _) = watch::channel(project(&inputs));
        Arc::new(Self {
            inputs: Mutex::new(inputs),
            view,
            project,
        })
    }

    /// Mutate inputs and republish the projection if it changed.
    pub fn apply(&self, f: impl FnOnce(&mut I)) {
        let next = {
            let mut inputs = lock(&self.inputs);
            f(&mut inputs);
            (self.project)(&inputs)
        };
        self.view.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }

    /// Back to default inputs.
    pub fn reset(&self) {
        self.apply(|inputs| *inputs = I::default());
    }

    pub fn subscribe(&self) -> watch::Receiver<V> {
        self.view.subscribe()
    }

    pub fn current(&self) -> V {
        self.view.borrow().clone()
    }

    /// Read the inputs, e.g. to decide which command an action maps to.
    pub fn inputs<R>(&self, f: impl FnOnce(&I) -> R) -> R {
        f(&lock(&self.inputs))
    }
}
