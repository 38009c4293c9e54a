//! Explicit change notifications for catalog observers.
//!
//! Listeners are registered with [`ChangeNotifier::subscribe`] and stay
//! active until the returned [`Subscription`] is dropped. Everything runs on
//! the UI thread, so the registry is a plain `Rc<RefCell<_>>`. Listeners must
//! not subscribe or drop subscriptions from inside a notification.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::selection::Selection;

/// What kind of mutation produced a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Records,
    Selection,
    Sort,
    Filter,
    Saved,
}

/// Snapshot delivered to listeners after every catalog mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogChange {
    pub kind: ChangeKind,
    /// Records in the ordered view.
    pub count: usize,
    pub selection: Selection,
}

type Listener = Box<dyn FnMut(&CatalogChange)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

#[derive(Default)]
pub struct ChangeNotifier {
    registry: Rc<RefCell<Registry>>,
}

impl fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&CatalogChange) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Box::new(listener)));
        Subscription {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn publish(&self, change: &CatalogChange) {
        let mut registry = self.registry.borrow_mut();
        for (_, listener) in registry.listeners.iter_mut() {
            listener(change);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.registry.borrow().listeners.len()
    }
}

/// Keeps a listener registered. Dropping it unsubscribes; if the notifier is
/// already gone the drop is a no-op.
#[must_use = "dropping a subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .listeners
                .retain(|(id, _)| *id != self.id);
        }
    }
}
