//! Selection tracker bound to a shared collection.
//!
//! A [`SelectionTracker`] holds zero or one selected item of a
//! [`SharedCollection`]. When the collection is replaced wholesale through
//! [`SharedCollection::update`], the tracker receives the old and new
//! contents and re-resolves its selection with the rules of
//! [`heuristics::resolve`](super::heuristics::resolve).
//!
//! # Lifecycle
//!
//! A tracker registers with its collection when created and stays
//! registered until [`SelectionTracker::dispose`] is called. Dropping the
//! last handle does not unregister it; the collection keeps it alive.
//!
//! # Example
//!
//! ```
//! use shared_selection::model::{SelectionPolicy, SelectionTracker, SharedCollection};
//!
//! let sizes = SharedCollection::new(vec!["S", "M", "L"]);
//! let tracker = SelectionTracker::new(
//!     sizes.clone(),
//!     None,
//!     SelectionPolicy::default().with_allow_empty_selection(false),
//! );
//!
//! // Empty selection is not allowed, so the first item is selected.
//! assert_eq!(tracker.selected(), Some("S"));
//!
//! tracker.selection_changed.connect(|(new, old)| {
//!     println!("selection moved from {old:?} to {new:?}");
//! });
//! tracker.select(Some("L"));
//! assert_eq!(tracker.selected_index(), Some(2));
//!
//! tracker.dispose();
//! assert_eq!(sizes.observer_count(), 0);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use shared_selection_core::logging::{span_names, targets};
use shared_selection_core::{ConnectionId, PerfSpan, Property, Signal};

use super::collection::{ChangeSource, ContentsChange};
use super::heuristics;
use super::item::Item;
use super::observer::{UpdateObserver, UpdateSnapshot};
use super::policy::{SelectionPolicy, TrackerPolicy};
use super::shared::SharedCollection;

/// Counter for generating unique tracker IDs.
static TRACKER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a selection tracker.
///
/// Reported as the source of the `contents_changed` notifications a tracker
/// fires on its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrackerId(u64);

impl TrackerId {
    fn next() -> Self {
        Self(TRACKER_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw ID value.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TrackerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tracker#{}", self.0)
    }
}

struct TrackerState<E> {
    selected: Option<E>,
    policy: TrackerPolicy,
    /// Between BEFORE and AFTER of an update; structural events are ignored.
    updating: bool,
    /// Position of the selection when the current update began.
    old_index: Option<usize>,
    selection_updated: bool,
}

/// Tracks a single selected item of a [`SharedCollection`].
///
/// Created through [`SelectionTracker::new`] or
/// [`SelectionTracker::with_policy`], which return an `Arc` because the
/// collection holds a reference to every registered tracker.
pub struct SelectionTracker<E: Item> {
    id: TrackerId,
    collection: Arc<SharedCollection<E>>,
    state: Mutex<TrackerState<E>>,
    display_hint: Property<Option<E>>,
    connections: Mutex<Vec<(ConnectionKind, ConnectionId)>>,
    disposed: AtomicBool,
    this: Weak<Self>,

    /// Emitted when the selected item changes.
    /// Args: (new selection, previous selection)
    pub selection_changed: Signal<(Option<E>, Option<E>)>,

    /// Emitted when an update delivers a different display hint.
    pub display_hint_changed: Signal<Option<E>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionKind {
    RowsInserted,
    RowsRemoved,
    ContentsChanged,
}

impl<E: Item> SelectionTracker<E> {
    /// Creates a tracker with the given selection options and no mutation
    /// options, and registers it with `collection`.
    pub fn new(
        collection: Arc<SharedCollection<E>>,
        initial: Option<E>,
        policy: SelectionPolicy,
    ) -> Arc<Self> {
        Self::with_policy(collection, initial, policy.into())
    }

    /// Creates a tracker with a complete policy and registers it with
    /// `collection`.
    ///
    /// `initial` is selected if the collection contains it. Otherwise the
    /// selection starts empty, or at the first item when empty selection is
    /// not allowed. No notification is emitted for the initial selection.
    pub fn with_policy(
        collection: Arc<SharedCollection<E>>,
        initial: Option<E>,
        policy: TrackerPolicy,
    ) -> Arc<Self> {
        let selected = match initial {
            Some(item) if collection.contains(&item) => Some(item),
            _ if !policy.selection.allow_empty_selection => collection.first(),
            _ => None,
        };

        let tracker = Arc::new_cyclic(|this| Self {
            id: TrackerId::next(),
            display_hint: Property::new(collection.display_hint()),
            collection,
            state: Mutex::new(TrackerState {
                selected,
                policy,
                updating: false,
                old_index: None,
                selection_updated: false,
            }),
            connections: Mutex::new(Vec::new()),
            disposed: AtomicBool::new(false),
            this: this.clone(),
            selection_changed: Signal::new(),
            display_hint_changed: Signal::new(),
        });

        tracker.connect_structural_signals();
        tracker.collection.add_observer(tracker.clone());

        tracing::debug!(
            target: targets::TRACKER,
            tracker = %tracker.id,
            selected = ?tracker.selected(),
            "tracker registered"
        );
        tracker
    }

    fn connect_structural_signals(&self) {
        let signals = self.collection.signals();

        let this = self.this.clone();
        let inserted = signals.rows_inserted.connect(move |_| {
            if let Some(tracker) = this.upgrade() {
                tracker.revalidate();
            }
        });

        let this = self.this.clone();
        let removed = signals.rows_removed.connect(move |_| {
            if let Some(tracker) = this.upgrade() {
                tracker.revalidate();
            }
        });

        // A same-size catch-up after a batch may hide removals.
        let this = self.this.clone();
        let changed = signals.contents_changed.connect(move |change| {
            if change.source != ChangeSource::Collection {
                return;
            }
            if let Some(tracker) = this.upgrade() {
                tracker.revalidate();
            }
        });

        self.connections.lock().extend([
            (ConnectionKind::RowsInserted, inserted),
            (ConnectionKind::RowsRemoved, removed),
            (ConnectionKind::ContentsChanged, changed),
        ]);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Returns this tracker's ID.
    pub fn id(&self) -> TrackerId {
        self.id
    }

    /// Returns the collection this tracker is bound to.
    pub fn collection(&self) -> &Arc<SharedCollection<E>> {
        &self.collection
    }

    /// Returns the selected item.
    pub fn selected(&self) -> Option<E> {
        self.state.lock().selected.clone()
    }

    /// Returns the position of the selected item in the collection.
    pub fn selected_index(&self) -> Option<usize> {
        let selected = self.selected()?;
        self.collection.index_of(&selected)
    }

    /// Returns the display hint delivered by the most recent update, or the
    /// collection's hint at construction.
    pub fn display_hint(&self) -> Option<E> {
        self.display_hint.get()
    }

    /// Returns `true` once after each update this tracker took part in.
    pub fn take_selection_updated(&self) -> bool {
        std::mem::take(&mut self.state.lock().selection_updated)
    }

    /// Returns `true` if [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::SeqCst)
    }

    // =========================================================================
    // Policy
    // =========================================================================

    /// Returns the current policy.
    pub fn policy(&self) -> TrackerPolicy {
        self.state.lock().policy
    }

    /// Replaces the policy.
    ///
    /// If the new policy forbids an empty selection and nothing is
    /// selected, the first item is selected right away.
    pub fn set_policy(&self, policy: TrackerPolicy) {
        let revalidate = {
            let mut state = self.state.lock();
            state.policy = policy;
            state.selected.is_none() && !policy.selection.allow_empty_selection
        };
        if revalidate {
            self.select(None);
        }
    }

    /// Returns whether the selection may be empty.
    pub fn allow_empty_selection(&self) -> bool {
        self.policy().selection.allow_empty_selection
    }

    /// Sets whether the selection may be empty.
    pub fn set_allow_empty_selection(&self, allow: bool) {
        let policy = self.policy();
        self.set_policy(policy.with_selection(policy.selection.with_allow_empty_selection(allow)));
    }

    /// Returns whether the selection follows its value across updates.
    pub fn match_by_value(&self) -> bool {
        self.policy().selection.match_by_value
    }

    /// Sets whether the selection follows its value across updates.
    pub fn set_match_by_value(&self, enabled: bool) {
        let policy = self.policy();
        self.set_policy(policy.with_selection(policy.selection.with_match_by_value(enabled)));
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Selects `item`.
    ///
    /// `None` clears the selection, unless empty selection is disallowed and
    /// the collection has items, in which case the first item is selected.
    /// An item that is not in the collection is ignored.
    ///
    /// Returns `true` if the selection changed. A change emits
    /// [`selection_changed`](Self::selection_changed) and a
    /// `contents_changed` on the collection with this tracker as source.
    pub fn select(&self, item: Option<E>) -> bool {
        let target = match item {
            Some(item) if self.collection.contains(&item) => Some(item),
            Some(item) => {
                tracing::trace!(target: targets::TRACKER, tracker = %self.id, ?item, "ignoring item not in collection");
                return false;
            }
            None if !self.allow_empty_selection() => self.collection.first(),
            None => None,
        };
        self.store_selection(target)
    }

    /// Clears the selection regardless of the empty-selection policy.
    fn force_deselect(&self) -> bool {
        self.store_selection(None)
    }

    fn store_selection(&self, target: Option<E>) -> bool {
        let previous = {
            let mut state = self.state.lock();
            if state.selected == target {
                return false;
            }
            std::mem::replace(&mut state.selected, target.clone())
        };

        tracing::trace!(
            target: targets::TRACKER,
            tracker = %self.id,
            new = ?target,
            old = ?previous,
            "selection changed"
        );
        self.selection_changed.emit((target, previous));
        self.collection
            .notify_contents_changed(ContentsChange::selection(self.id));
        true
    }

    // =========================================================================
    // Structural events
    // =========================================================================

    fn is_updating(&self) -> bool {
        self.state.lock().updating
    }

    /// Clears a selection that left the collection and applies the
    /// empty-selection policy. Runs after structural changes made outside
    /// of an update.
    fn revalidate(&self) {
        if self.is_updating() {
            return;
        }
        match self.selected() {
            Some(selected) if self.collection.contains(&selected) => {}
            Some(selected) => {
                tracing::debug!(target: targets::TRACKER, tracker = %self.id, ?selected, "selected item removed");
                self.select(None);
            }
            None => {
                self.select(None);
            }
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Unregisters this tracker from its collection.
    ///
    /// After disposal the tracker no longer reacts to updates or structural
    /// changes. Calling this more than once has no effect.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::SeqCst) {
            tracing::debug!(target: targets::TRACKER, tracker = %self.id, "tracker already disposed");
            return;
        }

        let signals = self.collection.signals();
        for (kind, id) in self.connections.lock().drain(..) {
            match kind {
                ConnectionKind::RowsInserted => signals.rows_inserted.disconnect(id),
                ConnectionKind::RowsRemoved => signals.rows_removed.disconnect(id),
                ConnectionKind::ContentsChanged => signals.contents_changed.disconnect(id),
            };
        }

        if let Some(this) = self.this.upgrade() {
            let observer: Arc<dyn UpdateObserver<E>> = this;
            self.collection.remove_observer(&observer);
        }
        tracing::debug!(target: targets::TRACKER, tracker = %self.id, "tracker disposed");
    }
}

impl<E: Item> UpdateObserver<E> for SelectionTracker<E> {
    fn before_update(&self, update: &UpdateSnapshot<'_, E>) {
        let mut state = self.state.lock();
        state.updating = true;
        state.old_index = state
            .selected
            .as_ref()
            .and_then(|selected| update.old_items.iter().position(|item| item == selected));
    }

    #[tracing::instrument(skip_all, target = "shared_selection::tracker", level = "trace", fields(tracker = %self.id))]
    fn after_update(&self, update: &UpdateSnapshot<'_, E>) {
        let _span = PerfSpan::new(span_names::RESOLVE);

        let (selected, old_idx, policy) = {
            let mut state = self.state.lock();
            state.updating = false;
            state.selection_updated = true;
            let selected = state.selected.clone();
            let old_idx = state.old_index.take().or_else(|| {
                selected
                    .as_ref()
                    .and_then(|s| update.old_items.iter().position(|item| item == s))
            });
            (selected, old_idx, state.policy)
        };

        let hint = update.display_hint.cloned();
        if self.display_hint.set(hint.clone()) {
            self.display_hint_changed.emit(hint);
        }

        let Some(selected) = selected else {
            // Nothing to follow; only the empty-selection policy applies.
            self.select(None);
            return;
        };

        let new_idx = update.new_items.iter().position(|item| *item == selected);
        if old_idx == new_idx {
            return;
        }

        let resolution = heuristics::resolve(&policy, update.old_items, update.new_items, old_idx, new_idx);
        tracing::debug!(
            target: targets::TRACKER,
            tracker = %self.id,
            rule = ?resolution.rule,
            ?old_idx,
            ?new_idx,
            candidate = ?resolution.candidate,
            "resolved selection after update"
        );

        if resolution.force_deselect {
            self.force_deselect();
        }
        self.select(resolution.candidate);
    }
}

impl<E: Item> fmt::Debug for SelectionTracker<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SelectionTracker")
            .field("id", &self.id)
            .field("selected", &state.selected)
            .field("policy", &state.policy)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
