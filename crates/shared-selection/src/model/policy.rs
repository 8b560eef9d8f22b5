//! Selection tracker configuration.
//!
//! Policies are small immutable values. Trackers never mutate a policy in
//! place; every setter replaces the whole value, so a policy read from a
//! tracker is always a consistent snapshot.
//!
//! Policies can be loaded from a settings file:
//!
//! ```
//! use shared_selection::model::TrackerPolicy;
//!
//! let policy: TrackerPolicy = toml::from_str(
//!     r#"
//!     [selection]
//!     match_by_value = true
//!
//!     [mutation]
//!     allow_one_mutation = true
//!     "#,
//! )
//! .unwrap();
//!
//! assert!(policy.selection.allow_empty_selection);
//! assert!(policy.selection.match_by_value);
//! assert!(policy.mutation.allow_one_mutation);
//! ```

use serde::{Deserialize, Serialize};

/// Options shared by every selection tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionPolicy {
    /// Whether the tracker may have no selection while its collection is
    /// non-empty. When `false`, the first item is selected instead.
    pub allow_empty_selection: bool,
    /// Whether a tracker follows its selected item to a new position after
    /// an update.
    pub match_by_value: bool,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self {
            allow_empty_selection: true,
            match_by_value: false,
        }
    }
}

impl SelectionPolicy {
    /// Set whether the selection may be empty.
    pub fn with_allow_empty_selection(mut self, allow: bool) -> Self {
        self.allow_empty_selection = allow;
        self
    }

    /// Set whether the selection follows its value across updates.
    pub fn with_match_by_value(mut self, enabled: bool) -> Self {
        self.match_by_value = enabled;
        self
    }
}

/// Extra resolution options of a [`MutationTracker`](super::MutationTracker).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationPolicy {
    /// Treat an update that changes exactly one position as an in-place
    /// edit: the selection stays at its old index.
    pub allow_one_mutation: bool,
    /// When the selection is matched by value, clear it before selecting
    /// the matched item so listeners see the position change.
    pub force_deselection_on_index_change: bool,
}

impl MutationPolicy {
    /// Set whether a single in-place edit keeps the selection's index.
    pub fn with_allow_one_mutation(mut self, allow: bool) -> Self {
        self.allow_one_mutation = allow;
        self
    }

    /// Set whether value matches are preceded by a forced deselect.
    pub fn with_force_deselection_on_index_change(mut self, force: bool) -> Self {
        self.force_deselection_on_index_change = force;
        self
    }
}

/// Complete configuration of a tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerPolicy {
    /// Base selection options.
    pub selection: SelectionPolicy,
    /// Mutation options; all disabled for a plain tracker.
    pub mutation: MutationPolicy,
}

impl TrackerPolicy {
    /// Replace the selection options.
    pub fn with_selection(mut self, selection: SelectionPolicy) -> Self {
        self.selection = selection;
        self
    }

    /// Replace the mutation options.
    pub fn with_mutation(mut self, mutation: MutationPolicy) -> Self {
        self.mutation = mutation;
        self
    }
}

impl From<SelectionPolicy> for TrackerPolicy {
    fn from(selection: SelectionPolicy) -> Self {
        Self {
            selection,
            mutation: MutationPolicy::default(),
        }
    }
}
