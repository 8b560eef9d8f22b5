//! Change-detecting values.
//!
//! A [`Property<T>`] holds one value behind a lock. Writing through
//! [`Property::set`] reports whether the stored value differs from the new
//! one, so owners emit their change signal only for real changes:
//!
//! ```
//! use shared_selection_core::{Property, Signal};
//!
//! let hint = Property::new(None::<String>);
//! let hint_changed = Signal::<Option<String>>::new();
//!
//! for next in [Some("Kilometres".to_string()), Some("Kilometres".to_string())] {
//!     if hint.set(next.clone()) {
//!         hint_changed.emit(next);
//!     }
//! }
//! assert_eq!(hint.get().as_deref(), Some("Kilometres"));
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A value that reports whether writes change it.
///
/// No lock is held when a method returns.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Creates a property holding `value`.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Returns a clone of the stored value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Stores `value`. Returns `false`, leaving the property untouched, when
    /// it equals the current value.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current == value {
            return false;
        }
        *current = value;
        true
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Property").field(&*self.value.read()).finish()
    }
}
