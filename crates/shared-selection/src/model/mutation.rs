//! Selection tracker with mutation policies.

use std::ops::Deref;
use std::sync::Arc;

use super::item::Item;
use super::policy::{MutationPolicy, SelectionPolicy, TrackerPolicy};
use super::shared::SharedCollection;
use super::tracker::SelectionTracker;

/// A [`SelectionTracker`] that also honours a [`MutationPolicy`].
///
/// Dereferences to the wrapped tracker, so every tracker operation is
/// available directly.
///
/// # Example
///
/// ```
/// use shared_selection::model::{MutationPolicy, MutationTracker, SelectionPolicy, SharedCollection};
///
/// let ids = SharedCollection::new(vec![10, 20, 30]);
/// let tracker = MutationTracker::new(
///     ids.clone(),
///     Some(20),
///     SelectionPolicy::default(),
///     MutationPolicy::default().with_allow_one_mutation(true),
/// );
///
/// // 20 is edited in place to 25; the selection stays on that row.
/// ids.update(vec![10, 25, 30]);
/// assert_eq!(tracker.selected(), Some(25));
/// ```
#[derive(Debug, Clone)]
pub struct MutationTracker<E: Item> {
    tracker: Arc<SelectionTracker<E>>,
}

impl<E: Item> MutationTracker<E> {
    /// Creates a tracker and registers it with `collection`.
    pub fn new(
        collection: Arc<SharedCollection<E>>,
        initial: Option<E>,
        selection: SelectionPolicy,
        mutation: MutationPolicy,
    ) -> Self {
        let policy = TrackerPolicy::default()
            .with_selection(selection)
            .with_mutation(mutation);
        Self {
            tracker: SelectionTracker::with_policy(collection, initial, policy),
        }
    }

    /// Returns the shared handle of the wrapped tracker.
    pub fn tracker(&self) -> &Arc<SelectionTracker<E>> {
        &self.tracker
    }

    /// Returns the mutation options.
    pub fn mutation_policy(&self) -> MutationPolicy {
        self.tracker.policy().mutation
    }

    /// Replaces the mutation options.
    pub fn set_mutation_policy(&self, mutation: MutationPolicy) {
        self.tracker
            .set_policy(self.tracker.policy().with_mutation(mutation));
    }

    /// Returns whether a single in-place edit keeps the selection's index.
    pub fn allow_one_mutation(&self) -> bool {
        self.mutation_policy().allow_one_mutation
    }

    /// Sets whether a single in-place edit keeps the selection's index.
    pub fn set_allow_one_mutation(&self, allow: bool) {
        self.set_mutation_policy(self.mutation_policy().with_allow_one_mutation(allow));
    }

    /// Returns whether value matches are preceded by a forced deselect.
    pub fn force_deselection_on_index_change(&self) -> bool {
        self.mutation_policy().force_deselection_on_index_change
    }

    /// Sets whether value matches are preceded by a forced deselect.
    pub fn set_force_deselection_on_index_change(&self, force: bool) {
        self.set_mutation_policy(
            self.mutation_policy()
                .with_force_deselection_on_index_change(force),
        );
    }
}

impl<E: Item> Deref for MutationTracker<E> {
    type Target = SelectionTracker<E>;

    fn deref(&self) -> &Self::Target {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_setters_keep_selection_policy() {
        let collection = SharedCollection::new(vec![1, 2]);
        let tracker = MutationTracker::new(
            collection,
            None,
            SelectionPolicy::default().with_match_by_value(true),
            MutationPolicy::default(),
        );

        tracker.set_allow_one_mutation(true);
        tracker.set_force_deselection_on_index_change(true);

        assert!(tracker.allow_one_mutation());
        assert!(tracker.force_deselection_on_index_change());
        assert!(tracker.match_by_value());
    }

    #[test]
    fn test_single_mutation_keeps_row() {
        let collection = SharedCollection::new(vec![10, 20, 30]);
        let tracker = MutationTracker::new(
            collection.clone(),
            Some(20),
            SelectionPolicy::default(),
            MutationPolicy::default().with_allow_one_mutation(true),
        );

        collection.update(vec![10, 21, 30]);
        assert_eq!(tracker.selected(), Some(21));

        // Two edits at once are not a single mutation.
        collection.update(vec![11, 22, 30]);
        assert_eq!(tracker.selected(), None);
    }

    #[test]
    fn test_forced_deselection_emits_twice() {
        let collection = SharedCollection::new(vec!["a", "b", "c"]);
        let tracker = MutationTracker::new(
            collection.clone(),
            Some("b"),
            SelectionPolicy::default().with_match_by_value(true),
            MutationPolicy::default().with_force_deselection_on_index_change(true),
        );

        let changes = Arc::new(Mutex::new(Vec::new()));
        let recv = changes.clone();
        tracker
            .selection_changed
            .connect(move |change| recv.lock().push(*change));

        assert!(collection.update(vec!["b", "c", "a", "d"]));

        assert_eq!(tracker.selected(), Some("b"));
        assert_eq!(
            *changes.lock(),
            vec![(None, Some("b")), (Some("b"), None)]
        );
    }

    #[test]
    fn test_clone_shares_tracker() {
        let collection = SharedCollection::new(vec![1]);
        let tracker = MutationTracker::new(
            collection.clone(),
            Some(1),
            SelectionPolicy::default(),
            MutationPolicy::default(),
        );
        let other = tracker.clone();
        assert_eq!(other.id(), tracker.id());

        other.dispose();
        assert!(tracker.is_disposed());
        assert_eq!(collection.observer_count(), 0);
    }
}
