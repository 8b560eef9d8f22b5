//! Display hint ("prototype") computation.
//!
//! A display hint is the item a view can use to size itself, for example
//! the longest choice of a combo box.

use unicode_segmentation::UnicodeSegmentation;

use super::item::Item;

/// Computes the display hint of `items`.
///
/// - no items: `None`
/// - one item: that item
/// - text-like items: the widest one, measured in grapheme clusters; the
///   earliest wins on ties
/// - anything else: `None`
pub fn compute_display_hint<E: Item>(items: &[E]) -> Option<E> {
    match items {
        [] => None,
        [only] => Some(only.clone()),
        _ => {
            let mut widest: Option<(&E, usize)> = None;
            for item in items {
                let width = display_width(item.as_text()?);
                if widest.is_none_or(|(_, best)| width > best) {
                    widest = Some((item, width));
                }
            }
            widest.map(|(item, _)| item.clone())
        }
    }
}

/// Width of `text` in user-perceived characters.
pub fn display_width(text: &str) -> usize {
    text.graphemes(true).count()
}
