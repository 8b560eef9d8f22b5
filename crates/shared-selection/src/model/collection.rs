//! Insertion-ordered collection of unique values.
//!
//! [`OrderedUniqueCollection<E>`] is the storage layer underneath every
//! shared collection. It keeps its items in insertion order, rejects
//! duplicates and reports structural changes through [`CollectionSignals`].
//!
//! Positions are not identities: an item's index is recomputed after every
//! structural change.
//!
//! # Batching
//!
//! A collection can be disabled. While disabled, mutations are silent, and
//! re-enabling emits a single catch-up notification describing the net size
//! change. [`OrderedUniqueCollection::batch`] wraps this in a scope:
//!
//! ```
//! use shared_selection::model::OrderedUniqueCollection;
//!
//! let collection = OrderedUniqueCollection::from_items(vec![1, 2, 3]);
//! collection.signals().rows_inserted.connect(|(first, last)| {
//!     // Fires once, for rows 3..=4, when the batch ends.
//!     assert_eq!((*first, *last), (3, 4));
//! });
//!
//! collection.batch(|c| {
//!     c.clear();
//!     c.add_all([5, 6, 7, 8, 9]);
//! });
//! assert_eq!(collection.to_vec(), vec![5, 6, 7, 8, 9]);
//! ```
//!
//! # Out-of-range indices
//!
//! Index-based accessors and mutators never panic. An out-of-range index is
//! a silent no-op: `get` and `remove_at` return `None`, `insert_at` returns
//! `false`.

use std::fmt;

use indexmap::IndexSet;
use parking_lot::RwLock;
use shared_selection_core::logging::targets;
use shared_selection_core::Signal;

use super::item::Item;
use super::tracker::TrackerId;

/// Who caused a contents-changed notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeSource {
    /// The collection itself, e.g. the catch-up after a same-size batch.
    Collection,
    /// A selection tracker whose selected item changed.
    Tracker(TrackerId),
}

/// Payload of [`CollectionSignals::contents_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentsChange {
    /// Affected rows (inclusive), or `None` when no particular row changed,
    /// as for selection changes.
    pub range: Option<(usize, usize)>,
    /// Origin of the notification.
    pub source: ChangeSource,
}

impl ContentsChange {
    /// A selection change reported by a tracker.
    pub fn selection(tracker: TrackerId) -> Self {
        Self {
            range: None,
            source: ChangeSource::Tracker(tracker),
        }
    }

    /// A change of rows `first..=last` made by the collection.
    pub fn rows(first: usize, last: usize) -> Self {
        Self {
            range: Some((first, last)),
            source: ChangeSource::Collection,
        }
    }
}

/// Structural signals emitted by an [`OrderedUniqueCollection`].
///
/// Row ranges are inclusive and refer to positions after the change for
/// insertions and before the change for removals.
pub struct CollectionSignals {
    /// Emitted after rows have been inserted.
    /// Args: (first row, last row)
    pub rows_inserted: Signal<(usize, usize)>,

    /// Emitted after rows have been removed.
    /// Args: (first row, last row)
    pub rows_removed: Signal<(usize, usize)>,

    /// Emitted when existing rows changed, or when a tracker's selection
    /// changed.
    pub contents_changed: Signal<ContentsChange>,
}

impl Default for CollectionSignals {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectionSignals {
    /// Creates a new set of collection signals.
    pub fn new() -> Self {
        Self {
            rows_inserted: Signal::new(),
            rows_removed: Signal::new(),
            contents_changed: Signal::new(),
        }
    }

    fn emit(&self, change: Change) {
        match change {
            Change::Inserted(first, last) => self.rows_inserted.emit((first, last)),
            Change::Removed(first, last) => self.rows_removed.emit((first, last)),
            Change::Contents(contents) => self.contents_changed.emit(contents),
        }
    }
}

/// A structural change computed under the lock and emitted after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Change {
    Inserted(usize, usize),
    Removed(usize, usize),
    Contents(ContentsChange),
}

struct CollectionState<E> {
    items: IndexSet<E>,
    enabled: bool,
    size_before_disabled: usize,
    mutated_while_disabled: bool,
}

/// An insertion-ordered set of unique values with change notifications.
///
/// All methods take `&self`; the collection uses interior mutability so it
/// can be shared by reference between a shared collection and the trackers
/// that observe it. No lock is held while signals are emitted, so slots may
/// read the collection.
pub struct OrderedUniqueCollection<E> {
    state: RwLock<CollectionState<E>>,
    signals: CollectionSignals,
}

impl<E: Item> Default for OrderedUniqueCollection<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Item> OrderedUniqueCollection<E> {
    /// Creates an empty, enabled collection.
    pub fn new() -> Self {
        Self::from_items(Vec::new())
    }

    /// Creates a collection from `items`, keeping the first occurrence of
    /// each duplicate.
    pub fn from_items(items: impl IntoIterator<Item = E>) -> Self {
        Self {
            state: RwLock::new(CollectionState {
                items: items.into_iter().collect(),
                enabled: true,
                size_before_disabled: 0,
                mutated_while_disabled: false,
            }),
            signals: CollectionSignals::new(),
        }
    }

    /// Returns the structural signals of this collection.
    pub fn signals(&self) -> &CollectionSignals {
        &self.signals
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.state.read().items.len()
    }

    /// Returns `true` if the collection has no items.
    pub fn is_empty(&self) -> bool {
        self.state.read().items.is_empty()
    }

    /// Returns the item at `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<E> {
        self.state.read().items.get_index(index).cloned()
    }

    /// Returns the position of `item`.
    pub fn index_of(&self, item: &E) -> Option<usize> {
        self.state.read().items.get_index_of(item)
    }

    /// Returns `true` if `item` is in the collection.
    pub fn contains(&self, item: &E) -> bool {
        self.state.read().items.contains(item)
    }

    /// Returns the first item.
    pub fn first(&self) -> Option<E> {
        self.state.read().items.first().cloned()
    }

    /// Returns a snapshot of the items in order.
    pub fn to_vec(&self) -> Vec<E> {
        self.state.read().items.iter().cloned().collect()
    }

    /// Runs `f` with read access to the items without copying them.
    ///
    /// `f` must not mutate this collection.
    pub fn with_items<R>(&self, f: impl FnOnce(&IndexSet<E>) -> R) -> R {
        f(&self.state.read().items)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Appends `item`. Returns `false` if it was already present.
    pub fn add(&self, item: E) -> bool {
        self.mutate(|items| {
            let (index, inserted) = items.insert_full(item);
            (inserted, inserted.then_some(Change::Inserted(index, index)))
        })
    }

    /// Appends every item not yet present, emitting one insertion for the
    /// whole appended range. Returns `true` if anything was added.
    pub fn add_all(&self, new_items: impl IntoIterator<Item = E>) -> bool {
        self.mutate(|items| {
            let from = items.len();
            items.extend(new_items);
            let to = items.len();
            let changed = to > from;
            (changed, changed.then(|| Change::Inserted(from, to - 1)))
        })
    }

    /// Inserts `item` at `index`, shifting later items.
    ///
    /// `index == len()` appends. Returns `false` without effect if `index`
    /// is out of range or `item` is already present.
    pub fn insert_at(&self, index: usize, item: E) -> bool {
        self.mutate(|items| {
            if index > items.len() || items.contains(&item) {
                return (false, None);
            }
            items.shift_insert(index, item);
            (true, Some(Change::Inserted(index, index)))
        })
    }

    /// Removes `item`. Returns `false` if it was not present.
    pub fn remove(&self, item: &E) -> bool {
        self.mutate(|items| match items.shift_remove_full(item) {
            Some((index, _)) => (true, Some(Change::Removed(index, index))),
            None => (false, None),
        })
    }

    /// Removes and returns the item at `index`, or `None` if out of range.
    pub fn remove_at(&self, index: usize) -> Option<E> {
        self.mutate(|items| match items.shift_remove_index(index) {
            Some(removed) => (Some(removed), Some(Change::Removed(index, index))),
            None => (None, None),
        })
    }

    /// Removes all items.
    pub fn clear(&self) {
        self.mutate(|items| {
            let count = items.len();
            items.clear();
            ((), (count > 0).then(|| Change::Removed(0, count - 1)))
        })
    }

    /// Emits `contents_changed` unless the collection is disabled.
    pub fn notify_contents_changed(&self, change: ContentsChange) {
        if self.is_enabled() {
            self.signals.contents_changed.emit(change);
        }
    }

    // =========================================================================
    // Enabled state and batching
    // =========================================================================

    /// Returns `true` if mutations currently emit notifications.
    pub fn is_enabled(&self) -> bool {
        self.state.read().enabled
    }

    /// Enables or disables notifications.
    ///
    /// Disabling remembers the current size. Re-enabling emits one catch-up
    /// notification: `rows_inserted` over the grown range, `rows_removed`
    /// over the shrunk range, or `contents_changed` over all rows when the
    /// collection was mutated but kept its size.
    pub fn set_enabled(&self, enabled: bool) {
        let change = {
            let mut state = self.state.write();
            if state.enabled == enabled {
                return;
            }
            state.enabled = enabled;
            if enabled {
                let size = state.items.len();
                let before = state.size_before_disabled;
                let mutated = std::mem::take(&mut state.mutated_while_disabled);
                if size > before {
                    Some(Change::Inserted(before, size - 1))
                } else if size < before {
                    Some(Change::Removed(size, before - 1))
                } else if mutated && size > 0 {
                    Some(Change::Contents(ContentsChange::rows(0, size - 1)))
                } else {
                    None
                }
            } else {
                state.size_before_disabled = state.items.len();
                state.mutated_while_disabled = false;
                None
            }
        };

        if let Some(change) = change {
            tracing::trace!(target: targets::COLLECTION, ?change, "emitting catch-up notification");
            self.signals.emit(change);
        }
    }

    /// Runs `f` with notifications disabled, then restores the previous
    /// enabled state.
    ///
    /// The state is restored on every exit path, including an early return
    /// out of `f` and unwinding. When re-enabling, the single catch-up
    /// notification of [`set_enabled`](Self::set_enabled) is emitted; it is
    /// skipped while unwinding.
    pub fn batch<R>(&self, f: impl FnOnce(&Self) -> R) -> R {
        let _guard = BatchGuard {
            collection: self,
            restore: self.is_enabled(),
        };
        self.set_enabled(false);
        f(self)
    }

    /// Applies a mutation under the write lock and emits its notification
    /// afterwards, unless the collection is disabled.
    fn mutate<R>(&self, f: impl FnOnce(&mut IndexSet<E>) -> (R, Option<Change>)) -> R {
        let (result, change) = {
            let mut state = self.state.write();
            let (result, change) = f(&mut state.items);
            if change.is_some() && !state.enabled {
                state.mutated_while_disabled = true;
                (result, None)
            } else {
                (result, change)
            }
        };

        if let Some(change) = change {
            self.signals.emit(change);
        }
        result
    }
}

impl<E: Item> FromIterator<E> for OrderedUniqueCollection<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::from_items(iter)
    }
}

impl<E: Item> fmt::Debug for OrderedUniqueCollection<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("OrderedUniqueCollection")
            .field("items", &state.items)
            .field("enabled", &state.enabled)
            .finish()
    }
}

/// Restores the enabled flag when a batch scope ends.
struct BatchGuard<'a, E: Item> {
    collection: &'a OrderedUniqueCollection<E>,
    restore: bool,
}

impl<E: Item> Drop for BatchGuard<'_, E> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.collection.state.write().enabled = self.restore;
        } else {
            self.collection.set_enabled(self.restore);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Inserted(usize, usize),
        Removed(usize, usize),
        Contents(ContentsChange),
    }

    fn record<E: Item>(collection: &OrderedUniqueCollection<E>) -> Arc<Mutex<Vec<Event>>> {
        let events = Arc::new(Mutex::new(Vec::new()));

        let recv = events.clone();
        collection
            .signals()
            .rows_inserted
            .connect(move |(first, last)| recv.lock().push(Event::Inserted(*first, *last)));
        let recv = events.clone();
        collection
            .signals()
            .rows_removed
            .connect(move |(first, last)| recv.lock().push(Event::Removed(*first, *last)));
        let recv = events.clone();
        collection
            .signals()
            .contents_changed
            .connect(move |change| recv.lock().push(Event::Contents(*change)));

        events
    }

    #[test]
    fn test_add_keeps_order_and_rejects_duplicates() {
        let collection = OrderedUniqueCollection::new();
        let events = record(&collection);

        assert!(collection.add("b"));
        assert!(collection.add("a"));
        assert!(!collection.add("b"));

        assert_eq!(collection.to_vec(), vec!["b", "a"]);
        assert_eq!(
            *events.lock(),
            vec![Event::Inserted(0, 0), Event::Inserted(1, 1)]
        );
    }

    #[test]
    fn test_from_items_drops_duplicates() {
        let collection: OrderedUniqueCollection<i32> = [3, 1, 3, 2, 1].into_iter().collect();
        assert_eq!(collection.to_vec(), vec![3, 1, 2]);
        assert_eq!(collection.len(), 3);
    }

    #[test]
    fn test_add_all_emits_single_range() {
        let collection = OrderedUniqueCollection::from_items([1]);
        let events = record(&collection);

        assert!(collection.add_all([2, 1, 3]));
        assert!(!collection.add_all([1, 2]));

        assert_eq!(collection.to_vec(), vec![1, 2, 3]);
        assert_eq!(*events.lock(), vec![Event::Inserted(1, 2)]);
    }

    #[test]
    fn test_remove_reports_old_position() {
        let collection = OrderedUniqueCollection::from_items(["a", "b", "c"]);
        let events = record(&collection);

        assert!(collection.remove(&"b"));
        assert!(!collection.remove(&"b"));

        assert_eq!(collection.to_vec(), vec!["a", "c"]);
        assert_eq!(collection.index_of(&"c"), Some(1));
        assert_eq!(*events.lock(), vec![Event::Removed(1, 1)]);
    }

    #[test]
    fn test_insert_at() {
        let collection = OrderedUniqueCollection::from_items(["a", "c"]);
        let events = record(&collection);

        assert!(collection.insert_at(1, "b"));
        assert!(collection.insert_at(3, "d"));
        assert!(!collection.insert_at(0, "c"));

        assert_eq!(collection.to_vec(), vec!["a", "b", "c", "d"]);
        assert_eq!(
            *events.lock(),
            vec![Event::Inserted(1, 1), Event::Inserted(3, 3)]
        );
    }

    #[test]
    fn test_out_of_range_is_silent_noop() {
        let collection = OrderedUniqueCollection::from_items(["a", "b"]);
        let events = record(&collection);

        assert_eq!(collection.get(2), None);
        assert_eq!(collection.get(usize::MAX), None);
        assert_eq!(collection.remove_at(2), None);
        assert!(!collection.insert_at(3, "z"));

        assert_eq!(collection.to_vec(), vec!["a", "b"]);
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_remove_at() {
        let collection = OrderedUniqueCollection::from_items(["a", "b", "c"]);
        let events = record(&collection);

        assert_eq!(collection.remove_at(0), Some("a"));
        assert_eq!(collection.get(0), Some("b"));
        assert_eq!(*events.lock(), vec![Event::Removed(0, 0)]);
    }

    #[test]
    fn test_clear() {
        let collection = OrderedUniqueCollection::from_items([1, 2, 3]);
        let events = record(&collection);

        collection.clear();
        collection.clear();

        assert!(collection.is_empty());
        assert_eq!(*events.lock(), vec![Event::Removed(0, 2)]);
    }

    #[test]
    fn test_disabled_mutations_are_silent() {
        let collection = OrderedUniqueCollection::from_items([1, 2]);
        let events = record(&collection);

        collection.set_enabled(false);
        collection.add(3);
        collection.remove(&1);
        collection.notify_contents_changed(ContentsChange::rows(0, 0));
        assert!(events.lock().is_empty());
        assert!(!collection.is_enabled());
    }

    #[test]
    fn test_reenable_emits_growth() {
        let collection = OrderedUniqueCollection::from_items([1, 2, 3]);
        let events = record(&collection);

        collection.batch(|c| {
            c.clear();
            c.add_all([4, 5, 6, 7, 8]);
        });

        assert!(collection.is_enabled());
        assert_eq!(*events.lock(), vec![Event::Inserted(3, 4)]);
    }

    #[test]
    fn test_reenable_emits_shrink() {
        let collection = OrderedUniqueCollection::from_items([1, 2, 3, 4]);
        let events = record(&collection);

        collection.batch(|c| {
            c.clear();
            c.add(9);
        });

        assert_eq!(*events.lock(), vec![Event::Removed(1, 3)]);
    }

    #[test]
    fn test_reenable_same_size_emits_contents_changed() {
        let collection = OrderedUniqueCollection::from_items([1, 2]);
        let events = record(&collection);

        collection.batch(|c| {
            c.clear();
            c.add_all([3, 4]);
        });

        assert_eq!(
            *events.lock(),
            vec![Event::Contents(ContentsChange::rows(0, 1))]
        );
    }

    #[test]
    fn test_reenable_without_mutation_is_quiet() {
        let collection = OrderedUniqueCollection::from_items([1, 2]);
        let events = record(&collection);

        collection.batch(|_| {});
        collection.set_enabled(true);

        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_batch_restores_on_early_return() {
        let collection = OrderedUniqueCollection::from_items([1, 2]);
        let events = record(&collection);

        let result: Result<(), &str> = collection.batch(|c| {
            c.add(3);
            if c.len() == 3 {
                return Err("stop");
            }
            c.add(4);
            Ok(())
        });

        assert_eq!(result, Err("stop"));
        assert!(collection.is_enabled());
        assert_eq!(collection.to_vec(), vec![1, 2, 3]);
        assert_eq!(*events.lock(), vec![Event::Inserted(2, 2)]);
    }

    #[test]
    fn test_batch_keeps_disabled_collection_disabled() {
        let collection = OrderedUniqueCollection::from_items([1]);
        let events = record(&collection);

        collection.set_enabled(false);
        collection.batch(|c| {
            c.add(2);
        });
        assert!(!collection.is_enabled());
        assert!(events.lock().is_empty());

        collection.set_enabled(true);
        assert_eq!(*events.lock(), vec![Event::Inserted(1, 1)]);
    }

    #[test]
    fn test_nested_batch_emits_once() {
        let collection = OrderedUniqueCollection::from_items([1]);
        let events = record(&collection);

        collection.batch(|outer| {
            outer.add(2);
            outer.batch(|inner| {
                inner.add(3);
            });
            outer.add(4);
        });

        assert_eq!(*events.lock(), vec![Event::Inserted(1, 3)]);
    }

    #[test]
    fn test_batch_restores_after_panic() {
        let collection = Arc::new(OrderedUniqueCollection::from_items([1]));
        let events = record(&collection);

        let inner = collection.clone();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            inner.batch(|c| {
                c.add(2);
                panic!("mutation failed");
            })
        }));

        assert!(outcome.is_err());
        assert!(collection.is_enabled());
        assert!(events.lock().is_empty());
    }

    #[test]
    fn test_slot_may_read_collection() {
        let collection = Arc::new(OrderedUniqueCollection::from_items(["a"]));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let reader = Arc::downgrade(&collection);
        let recv = seen.clone();
        collection.signals().rows_inserted.connect(move |_| {
            if let Some(collection) = reader.upgrade() {
                recv.lock().push(collection.to_vec());
            }
        });

        collection.add("b");
        assert_eq!(*seen.lock(), vec![vec!["a", "b"]]);
    }
}
