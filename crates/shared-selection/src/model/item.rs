//! Element trait for shared collections.

use std::borrow::Cow;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Trait for values stored in a shared collection.
///
/// Equality, not identity, decides whether two snapshots contain "the same"
/// item. Hashing is required because collections index their elements.
///
/// Text-like types override [`as_text`](Item::as_text). A collection whose
/// items expose text supports the rename heuristic and the widest-string
/// display hint; other item types never do.
///
/// # Example
///
/// ```
/// use shared_selection::model::Item;
///
/// #[derive(Clone, Debug, PartialEq, Eq, Hash)]
/// struct Channel {
///     name: String,
/// }
///
/// impl Item for Channel {
///     fn as_text(&self) -> Option<&str> {
///         Some(&self.name)
///     }
/// }
/// ```
pub trait Item: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {
    /// Returns the displayable text of this item, if it has one.
    fn as_text(&self) -> Option<&str> {
        None
    }
}

impl Item for String {
    fn as_text(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl Item for &'static str {
    fn as_text(&self) -> Option<&str> {
        Some(*self)
    }
}

impl Item for Arc<str> {
    fn as_text(&self) -> Option<&str> {
        Some(&**self)
    }
}

impl Item for Box<str> {
    fn as_text(&self) -> Option<&str> {
        Some(&**self)
    }
}

impl Item for Cow<'static, str> {
    fn as_text(&self) -> Option<&str> {
        Some(self.as_ref())
    }
}

macro_rules! impl_opaque_item {
    ($($ty:ty),* $(,)?) => {
        $(impl Item for $ty {})*
    };
}

impl_opaque_item!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char);

/// Returns `true` if the items of `items` are text-like.
///
/// Only the first element is inspected: a collection is homogeneous, so its
/// first element decides for all of them. An empty slice is never text-like.
pub(crate) fn is_text_like<E: Item>(items: &[E]) -> bool {
    items.first().and_then(Item::as_text).is_some()
}
