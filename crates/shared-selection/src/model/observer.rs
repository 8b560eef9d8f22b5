//! Two-phase update notifications.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

/// The data handed to observers around a bulk update.
///
/// During `before_update` the shared collection still holds `old_items`;
/// during `after_update` it holds `new_items`.
#[derive(Debug, Clone, Copy)]
pub struct UpdateSnapshot<'a, E> {
    /// The contents after the update.
    pub new_items: &'a [E],
    /// The contents before the update.
    pub old_items: &'a [E],
    /// The display hint computed for `new_items`.
    pub display_hint: Option<&'a E>,
}

/// Receives the BEFORE and AFTER phases of a shared collection update.
///
/// Every registered observer gets `before_update` before the contents are
/// swapped, and every observer gets `after_update` once the swap is done.
pub trait UpdateObserver<E>: Send + Sync {
    /// Called while the old contents are still in place.
    fn before_update(&self, update: &UpdateSnapshot<'_, E>);

    /// Called once the new contents are in place.
    fn after_update(&self, update: &UpdateSnapshot<'_, E>);
}

/// Registration-ordered list of update observers.
///
/// Registration is idempotent: an observer is identified by its `Arc`
/// allocation, so adding it twice keeps a single entry.
pub struct UpdateObservers<E> {
    observers: RwLock<Vec<Arc<dyn UpdateObserver<E>>>>,
}

impl<E> Default for UpdateObservers<E> {
    fn default() -> Self {
        Self {
            observers: RwLock::new(Vec::new()),
        }
    }
}

impl<E> UpdateObservers<E> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `observer`. Returns `false` if it was already registered.
    pub fn add(&self, observer: Arc<dyn UpdateObserver<E>>) -> bool {
        let mut observers = self.observers.write();
        if observers.iter().any(|o| same_observer(o, &observer)) {
            return false;
        }
        observers.push(observer);
        true
    }

    /// Unregisters `observer`. Returns `false` if it was not registered.
    pub fn remove(&self, observer: &Arc<dyn UpdateObserver<E>>) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|o| !same_observer(o, observer));
        observers.len() != before
    }

    /// Returns the number of registered observers.
    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    /// Returns `true` if nobody is registered.
    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    /// Returns the observers in registration order.
    ///
    /// Phases iterate over a snapshot so observers may register or
    /// unregister while being notified.
    pub fn snapshot(&self) -> Vec<Arc<dyn UpdateObserver<E>>> {
        self.observers.read().clone()
    }
}

impl<E> fmt::Debug for UpdateObservers<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateObservers")
            .field("len", &self.len())
            .finish()
    }
}

// Compares data pointers only; vtable pointers of the same type may differ
// between codegen units.
fn same_observer<E>(a: &Arc<dyn UpdateObserver<E>>, b: &Arc<dyn UpdateObserver<E>>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}
