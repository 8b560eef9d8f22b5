//! Typed notifications between collections and their observers.
//!
//! A [`Signal<Args>`] owns a table of slots (closures). Emitting the signal
//! calls every slot with a reference to the arguments. Collections use one
//! signal per kind of change; trackers use them to report selection changes.
//!
//! # Dispatch
//!
//! Dispatch is always direct: every slot runs on the emitting thread before
//! [`Signal::emit`] returns. The slot list is copied out of the connection
//! table before the first slot runs, so a slot may connect or disconnect
//! slots (on this or any other signal) without deadlocking. Changes made
//! during an emission take effect from the next emission.
//!
//! # Example
//!
//! ```
//! use shared_selection_core::Signal;
//!
//! // Rows first..=last were inserted.
//! let rows_inserted = Signal::<(usize, usize)>::new();
//!
//! let id = rows_inserted.connect(|(first, last)| {
//!     println!("rows {first}..={last} inserted");
//! });
//!
//! rows_inserted.emit((0, 2));
//! rows_inserted.disconnect(id);
//! ```

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;

new_key_type! {
    /// Handle of one slot connected to a [`Signal`].
    ///
    /// Pass it to [`Signal::disconnect`] to remove the slot. Handles of
    /// removed slots are never reused.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A notification with any number of connected slots.
///
/// `Args` is the payload handed to each slot by reference: `()` for a bare
/// notification, a tuple for several values.
pub struct Signal<Args> {
    slots: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Creates a signal without slots.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Connects `slot` and returns its handle.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.slots.lock().insert(Arc::new(slot))
    }

    /// Removes the slot behind `id`. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id).is_some()
    }

    /// Returns the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Calls every connected slot with `args`.
    #[tracing::instrument(skip_all, target = "shared_selection_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        // Snapshot so the table is unlocked while slots run.
        let slots: Vec<Slot<Args>> = self.slots.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, slot_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

impl<Args> fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slots.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder<T: Clone + Send + 'static>(signal: &Signal<T>) -> Arc<Mutex<Vec<T>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let recv = log.clone();
        signal.connect(move |args: &T| recv.lock().push(args.clone()));
        log
    }

    #[test]
    fn test_emit_reaches_slot_in_order() {
        let rows_removed = Signal::<(usize, usize)>::new();
        let log = recorder(&rows_removed);

        rows_removed.emit((0, 0));
        rows_removed.emit((2, 5));

        assert_eq!(*log.lock(), vec![(0, 0), (2, 5)]);
    }

    #[test]
    fn test_disconnected_slot_is_not_called() {
        let selection_changed = Signal::<Option<String>>::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let recv = hits.clone();
        let id = selection_changed.connect(move |_| {
            recv.fetch_add(1, Ordering::SeqCst);
        });

        selection_changed.emit(Some("a".into()));
        assert!(selection_changed.disconnect(id));
        assert!(!selection_changed.disconnect(id));
        selection_changed.emit(None);

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_every_slot_sees_each_emission() {
        let signal = Signal::<()>::new();
        let logs: Vec<_> = (0..3).map(|_| recorder(&signal)).collect();

        signal.emit(());
        signal.emit(());

        for log in logs {
            assert_eq!(log.lock().len(), 2);
        }
        assert_eq!(signal.connection_count(), 3);
        assert_eq!(format!("{signal:?}"), "Signal { slots: 3 }");
    }

    #[test]
    fn test_slot_can_reenter_signal() {
        // A slot that connects and emits on the same signal must not deadlock.
        let signal = Arc::new(Signal::<u32>::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let inner_signal = signal.clone();
        let inner_calls = calls.clone();
        signal.connect(move |&depth| {
            inner_calls.fetch_add(1, Ordering::SeqCst);
            if depth == 0 {
                inner_signal.connect(|_| {});
                inner_signal.emit(1);
            }
        });

        signal.emit(0);

        // Outer call plus one nested call; the slot connected mid-emission
        // only sees emissions that start afterwards.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(signal.connection_count(), 2);
    }

    #[test]
    fn test_slot_can_disconnect_itself() {
        let signal = Arc::new(Signal::<()>::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let own_id = Arc::new(Mutex::new(None));

        let inner_signal = signal.clone();
        let inner_calls = calls.clone();
        let inner_id = own_id.clone();
        let id = signal.connect(move |_| {
            inner_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = inner_id.lock().take() {
                inner_signal.disconnect(id);
            }
        });
        *own_id.lock() = Some(id);

        signal.emit(());
        signal.emit(());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(signal.connection_count(), 0);
    }
}
