//! Shared collection with a two-phase bulk update.
//!
//! [`SharedCollection<E>`] wraps an [`OrderedUniqueCollection`] that is
//! displayed by several consumers at once. Besides the usual structural
//! mutations it offers [`update`](SharedCollection::update), which replaces
//! the whole contents and lets every registered [`UpdateObserver`] see both
//! the old and the new contents.
//!
//! # Update protocol
//!
//! 1. every observer receives `before_update`, in registration order
//! 2. the contents are swapped inside a [`batch`](OrderedUniqueCollection::batch),
//!    so structural listeners see a single catch-up notification
//! 3. every observer receives `after_update`, in registration order
//!
//! `update` is not reentrant. Calling it from inside an observer is
//! unsupported.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use indexmap::IndexSet;
use shared_selection_core::logging::{span_names, targets};
use shared_selection_core::{PerfSpan, Property};

use super::collection::{CollectionSignals, ContentsChange, OrderedUniqueCollection};
use super::hint::compute_display_hint;
use super::item::Item;
use super::observer::{UpdateObserver, UpdateObservers, UpdateSnapshot};

/// An ordered, duplicate-free collection shared by several selection
/// trackers.
pub struct SharedCollection<E: Item> {
    items: OrderedUniqueCollection<E>,
    observers: UpdateObservers<E>,
    display_hint: Property<Option<E>>,
    auto_display_hint: AtomicBool,
}

impl<E: Item> SharedCollection<E> {
    /// Creates a shared collection holding `items` with automatic display
    /// hints. Duplicates keep their first occurrence.
    pub fn new(items: impl IntoIterator<Item = E>) -> Arc<Self> {
        Self::builder().items(items).build()
    }

    /// Returns a builder for configuring a new shared collection.
    pub fn builder() -> SharedCollectionBuilder<E> {
        SharedCollectionBuilder::new()
    }

    /// Returns the structural signals of the underlying collection.
    pub fn signals(&self) -> &CollectionSignals {
        self.items.signals()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Returns the number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the collection has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the item at `index`, or `None` if out of range.
    pub fn get(&self, index: usize) -> Option<E> {
        self.items.get(index)
    }

    /// Returns the position of `item`.
    pub fn index_of(&self, item: &E) -> Option<usize> {
        self.items.index_of(item)
    }

    /// Returns `true` if `item` is in the collection.
    pub fn contains(&self, item: &E) -> bool {
        self.items.contains(item)
    }

    /// Returns the first item.
    pub fn first(&self) -> Option<E> {
        self.items.first()
    }

    /// Returns a snapshot of the items in order.
    pub fn to_vec(&self) -> Vec<E> {
        self.items.to_vec()
    }

    // =========================================================================
    // Structural mutations
    // =========================================================================

    /// Appends `item`. Returns `false` if it was already present.
    pub fn add(&self, item: E) -> bool {
        let added = self.items.add(item);
        self.refresh_display_hint(added);
        added
    }

    /// Appends every item not yet present.
    pub fn add_all(&self, items: impl IntoIterator<Item = E>) -> bool {
        let added = self.items.add_all(items);
        self.refresh_display_hint(added);
        added
    }

    /// Inserts `item` at `index`. See [`OrderedUniqueCollection::insert_at`].
    pub fn insert_at(&self, index: usize, item: E) -> bool {
        let inserted = self.items.insert_at(index, item);
        self.refresh_display_hint(inserted);
        inserted
    }

    /// Removes `item`. Returns `false` if it was not present.
    pub fn remove(&self, item: &E) -> bool {
        let removed = self.items.remove(item);
        self.refresh_display_hint(removed);
        removed
    }

    /// Removes and returns the item at `index`, or `None` if out of range.
    pub fn remove_at(&self, index: usize) -> Option<E> {
        let removed = self.items.remove_at(index);
        self.refresh_display_hint(removed.is_some());
        removed
    }

    /// Removes all items.
    pub fn clear(&self) {
        let had_items = !self.items.is_empty();
        self.items.clear();
        self.refresh_display_hint(had_items);
    }

    /// Enables or disables structural notifications.
    /// See [`OrderedUniqueCollection::set_enabled`].
    pub fn set_enabled(&self, enabled: bool) {
        self.items.set_enabled(enabled);
    }

    /// Returns `true` if mutations currently emit notifications.
    pub fn is_enabled(&self) -> bool {
        self.items.is_enabled()
    }

    /// Emits `contents_changed` on the underlying collection.
    pub fn notify_contents_changed(&self, change: ContentsChange) {
        self.items.notify_contents_changed(change);
    }

    // =========================================================================
    // Update observers
    // =========================================================================

    /// Registers an update observer. Returns `false` if it was already
    /// registered.
    pub fn add_observer(&self, observer: Arc<dyn UpdateObserver<E>>) -> bool {
        self.observers.add(observer)
    }

    /// Unregisters an update observer. Returns `false` if it was not
    /// registered.
    pub fn remove_observer(&self, observer: &Arc<dyn UpdateObserver<E>>) -> bool {
        self.observers.remove(observer)
    }

    /// Returns the number of registered update observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    // =========================================================================
    // Display hint
    // =========================================================================

    /// Returns the current display hint.
    pub fn display_hint(&self) -> Option<E> {
        self.display_hint.get()
    }

    /// Sets the display hint.
    ///
    /// With automatic hints enabled the value is replaced again on the next
    /// structural change.
    pub fn set_display_hint(&self, hint: Option<E>) {
        self.display_hint.set(hint);
    }

    /// Returns `true` if the display hint is recomputed on every change.
    pub fn auto_display_hint(&self) -> bool {
        self.auto_display_hint.load(Ordering::SeqCst)
    }

    /// Enables or disables automatic display hints. Enabling recomputes the
    /// hint immediately.
    pub fn set_auto_display_hint(&self, enabled: bool) {
        self.auto_display_hint.store(enabled, Ordering::SeqCst);
        self.refresh_display_hint(enabled);
    }

    fn refresh_display_hint(&self, changed: bool) {
        if changed && self.auto_display_hint() {
            self.display_hint.set(compute_display_hint(&self.items.to_vec()));
        }
    }

    // =========================================================================
    // Bulk update
    // =========================================================================

    /// Replaces the contents with `new_items`.
    ///
    /// Returns `false` without any effect when nobody observes the
    /// collection or when `new_items` holds exactly the current items (in
    /// any order). An empty `new_items` clears the collection without
    /// notifying observers; trackers react to the removal instead.
    /// Otherwise duplicates in `new_items` are dropped, keeping their first
    /// occurrence, and the two-phase protocol described in the module
    /// documentation runs.
    #[tracing::instrument(skip_all, target = "shared_selection::update", level = "trace", fields(len = new_items.len()))]
    pub fn update(&self, new_items: Vec<E>) -> bool {
        let _span = PerfSpan::new(span_names::UPDATE);

        if self.observers.is_empty() {
            tracing::trace!(target: targets::UPDATE, "no observers, skipping update");
            return false;
        }
        if self.holds_exactly(&new_items) {
            tracing::trace!(target: targets::UPDATE, "contents unchanged, skipping update");
            return false;
        }
        if new_items.is_empty() {
            tracing::debug!(target: targets::UPDATE, "update with no items, clearing");
            self.clear();
            return true;
        }

        let new_items: Vec<E> = new_items
            .into_iter()
            .collect::<IndexSet<E>>()
            .into_iter()
            .collect();
        let old_items = self.items.to_vec();
        let hint = if self.auto_display_hint() {
            compute_display_hint(&new_items)
        } else {
            self.display_hint()
        };

        let snapshot = UpdateSnapshot {
            new_items: &new_items,
            old_items: &old_items,
            display_hint: hint.as_ref(),
        };

        let observers = self.observers.snapshot();
        tracing::debug!(
            target: targets::UPDATE,
            observers = observers.len(),
            old_len = old_items.len(),
            new_len = new_items.len(),
            "updating shared collection"
        );
        for observer in &observers {
            observer.before_update(&snapshot);
        }

        self.items.batch(|items| {
            items.clear();
            items.add_all(new_items.iter().cloned());
        });
        self.display_hint.set(hint.clone());

        for observer in self.observers.snapshot() {
            observer.after_update(&snapshot);
        }
        true
    }

    /// Multiset comparison against the current contents.
    fn holds_exactly(&self, new_items: &[E]) -> bool {
        self.items.with_items(|current| {
            if current.len() != new_items.len() {
                return false;
            }
            let incoming: IndexSet<&E> = new_items.iter().collect();
            incoming.len() == new_items.len() && incoming.iter().all(|item| current.contains(*item))
        })
    }
}

impl<E: Item> fmt::Debug for SharedCollection<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedCollection")
            .field("items", &self.items)
            .field("observers", &self.observers)
            .field("display_hint", &self.display_hint)
            .finish()
    }
}

/// Builder for [`SharedCollection`].
pub struct SharedCollectionBuilder<E: Item> {
    items: Vec<E>,
    auto_display_hint: bool,
    display_hint: Option<E>,
}

impl<E: Item> Default for SharedCollectionBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Item> SharedCollectionBuilder<E> {
    /// Creates a builder for an empty collection with automatic display
    /// hints.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            auto_display_hint: true,
            display_hint: None,
        }
    }

    /// Sets the initial items.
    pub fn items(mut self, items: impl IntoIterator<Item = E>) -> Self {
        self.items = items.into_iter().collect();
        self
    }

    /// Sets whether the display hint is recomputed on every change.
    pub fn auto_display_hint(mut self, enabled: bool) -> Self {
        self.auto_display_hint = enabled;
        self
    }

    /// Sets a fixed display hint. Only used when automatic hints are off.
    pub fn display_hint(mut self, hint: E) -> Self {
        self.display_hint = Some(hint);
        self
    }

    /// Builds the shared collection.
    pub fn build(self) -> Arc<SharedCollection<E>> {
        let items = OrderedUniqueCollection::from_items(self.items);
        let hint = if self.auto_display_hint {
            compute_display_hint(&items.to_vec())
        } else {
            self.display_hint
        };

        Arc::new(SharedCollection {
            items,
            observers: UpdateObservers::new(),
            display_hint: Property::new(hint),
            auto_display_hint: AtomicBool::new(self.auto_display_hint),
        })
    }
}
