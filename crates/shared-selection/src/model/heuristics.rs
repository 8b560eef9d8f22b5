//! Identity-preservation rules for bulk updates.
//!
//! A shared collection update only carries the old and the new contents.
//! These functions decide which item of the new contents a tracker should
//! select so that it keeps pointing at "the same" item. They are pure and
//! never touch a tracker.

use super::item::{is_text_like, Item};
use super::policy::TrackerPolicy;

/// The rule that produced a [`Resolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Exactly one position changed; the selection keeps its old index.
    SingleMutation,
    /// The selected value still exists at a (possibly) new index.
    ValueMatch,
    /// Everything except the selected position is unchanged, so the
    /// selected item was renamed.
    Rename,
    /// No rule applied.
    Unresolved,
}

/// The outcome of [`resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<E> {
    /// The item to select, or `None` to fall back to the tracker's
    /// empty-selection policy.
    pub candidate: Option<E>,
    /// Whether the tracker must clear its selection before selecting the
    /// candidate.
    pub force_deselect: bool,
    /// The rule that decided.
    pub rule: Rule,
}

impl<E> Resolution<E> {
    fn unresolved() -> Self {
        Self {
            candidate: None,
            force_deselect: false,
            rule: Rule::Unresolved,
        }
    }
}

/// Returns `true` if `old` and `new` have the same length and differ in
/// exactly one position.
pub fn has_single_mutation<E: PartialEq>(old: &[E], new: &[E]) -> bool {
    if old.len() != new.len() {
        return false;
    }
    let mut mismatches = old.iter().zip(new).filter(|(a, b)| a != b);
    mismatches.next().is_some() && mismatches.next().is_none()
}

/// Returns `true` if only the item at `old_idx` may have been renamed.
///
/// Holds when both snapshots have the same length, the items are text-like
/// and every position other than `old_idx` is equal. Replacing the selected
/// item with an unrelated value is indistinguishable from a rename and is
/// accepted as one.
pub fn only_selected_item_is_renamed<E: Item>(old: &[E], new: &[E], old_idx: usize) -> bool {
    old.len() == new.len()
        && old_idx < new.len()
        && is_text_like(new)
        && old
            .iter()
            .zip(new)
            .enumerate()
            .all(|(i, (a, b))| i == old_idx || a == b)
}

/// Picks the item a tracker should select after an update.
///
/// `old_idx` and `new_idx` are the positions of the selected item in `old`
/// and `new`. Rules are tried in this order:
///
/// 1. [`Rule::SingleMutation`], if enabled, exactly one position changed
///    and `old_idx` is valid
/// 2. [`Rule::ValueMatch`], if enabled and `new_idx` is valid; requests a
///    forced deselect when configured
/// 3. [`Rule::Rename`], if [`only_selected_item_is_renamed`] holds
/// 4. [`Rule::Unresolved`]
pub fn resolve<E: Item>(
    policy: &TrackerPolicy,
    old: &[E],
    new: &[E],
    old_idx: Option<usize>,
    new_idx: Option<usize>,
) -> Resolution<E> {
    let at = |idx: Option<usize>| idx.and_then(|i| new.get(i)).cloned();

    if policy.mutation.allow_one_mutation && has_single_mutation(old, new) {
        if let Some(candidate) = at(old_idx) {
            return Resolution {
                candidate: Some(candidate),
                force_deselect: false,
                rule: Rule::SingleMutation,
            };
        }
    }

    if policy.selection.match_by_value {
        if let Some(candidate) = at(new_idx) {
            return Resolution {
                candidate: Some(candidate),
                force_deselect: policy.mutation.force_deselection_on_index_change,
                rule: Rule::ValueMatch,
            };
        }
    }

    if let Some(idx) = old_idx {
        if only_selected_item_is_renamed(old, new, idx) {
            return Resolution {
                candidate: at(old_idx),
                force_deselect: false,
                rule: Rule::Rename,
            };
        }
    }

    Resolution::unresolved()
}
