//! Shared ordered collections with selection trackers.
//!
//! A [`SharedCollection`](model::SharedCollection) holds an ordered,
//! duplicate-free list of values that several consumers display at once,
//! for example the choices of every combo box in one table column. Each
//! consumer owns a [`SelectionTracker`](model::SelectionTracker) that keeps
//! pointing at "the same" item when the whole list is replaced through
//! [`update`](model::SharedCollection::update), even though the update only
//! provides the old and new contents.
//!
//! # Example
//!
//! ```
//! use shared_selection::model::{SelectionPolicy, SelectionTracker, SharedCollection};
//!
//! let colors = SharedCollection::new(vec![
//!     "red".to_string(),
//!     "green".to_string(),
//!     "blue".to_string(),
//! ]);
//!
//! let tracker = SelectionTracker::new(
//!     colors.clone(),
//!     Some("green".to_string()),
//!     SelectionPolicy::default().with_match_by_value(true),
//! );
//!
//! // "green" moves to the front; the tracker follows it. A pure reordering
//! // of the same items would be ignored, so a new color is added too.
//! assert!(colors.update(vec![
//!     "green".to_string(),
//!     "blue".to_string(),
//!     "red".to_string(),
//!     "cyan".to_string(),
//! ]));
//! assert_eq!(tracker.selected().as_deref(), Some("green"));
//!
//! tracker.dispose();
//! ```

pub mod error;
pub mod model;
pub mod prelude;
pub mod row;

pub use error::{Result, RowError};
pub use shared_selection_core::*;
